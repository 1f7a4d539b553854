pub mod bill;
pub mod user;

pub use bill::{Bill, BillStatus, CreatedBill};
pub use user::{SessionUser, UserType};
