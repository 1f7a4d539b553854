pub mod bills;
pub mod logout;
pub mod new_bill;

use std::sync::Arc;

use crate::dom::Document;
use crate::routes::Navigate;
use crate::session::Session;
use crate::store::Store;

pub use bills::{BillRow, Bills};
pub use logout::Logout;
pub use new_bill::{NewBill, UploadState};

/// Collaborators shared by every page controller.
#[derive(Clone)]
pub struct PageContext {
    pub document: Arc<Document>,
    pub on_navigate: Navigate,
    pub store: Option<Arc<dyn Store>>,
    pub session: Session,
}
