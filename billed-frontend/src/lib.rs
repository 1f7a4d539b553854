//! billed-frontend: controller layer of the Billed expense-reporting front-end.
pub mod config;
pub mod controllers;
pub mod dom;
pub mod error;
pub mod models;
pub mod observability;
pub mod routes;
pub mod session;
pub mod store;
pub mod utils;

pub use controllers::{BillRow, Bills, Logout, NewBill, PageContext};
pub use error::AppError;
pub use routes::{Navigate, Route};
