//! Contract of the REST store client.
//!
//! The transport lives outside this crate; controllers only see these traits.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::dom::SelectedFile;
use crate::models::{Bill, CreatedBill};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Store unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

/// Multipart body of a receipt upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptForm {
    pub file: SelectedFile,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestHeaders {
    /// Leave the content type to the transport so it can set the multipart boundary.
    pub no_content_type: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateBillPayload {
    pub data: ReceiptForm,
    pub headers: RequestHeaders,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBillPayload {
    /// JSON-serialized [`Bill`].
    pub data: String,
    /// Key of the bill to update; empty when no receipt was uploaded first.
    pub selector: Option<String>,
}

/// Collection-scoped operations on bills.
#[async_trait]
pub trait BillsApi: Send + Sync {
    /// Uploads a receipt and reserves a bill for it.
    async fn create(&self, payload: CreateBillPayload) -> Result<CreatedBill, StoreError>;

    async fn update(&self, payload: UpdateBillPayload) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<Bill>, StoreError>;
}

pub trait Store: Send + Sync {
    fn bills(&self) -> Arc<dyn BillsApi>;
}
