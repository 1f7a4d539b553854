//! Bills list page.

use std::sync::{Arc, Weak};

use crate::controllers::{Logout, PageContext};
use crate::dom::{Document, Event, EventKind, NodeId, Pending};
use crate::error::AppError;
use crate::models::Bill;
use crate::routes::{Navigate, Route};
use crate::store::Store;
use crate::utils::{format_date, format_status};

pub const NEW_BILL_BUTTON: &str = "btn-new-bill";
pub const ICON_EYE: &str = "icon-eye";
pub const RECEIPT_MODAL: &str = "modaleFile";
pub const MODAL_BODY_CLASS: &str = "modal-body";
pub const BILL_URL_ATTRIBUTE: &str = "data-bill-url";

/// A bill ready for display: the stored record plus its formatted labels.
#[derive(Debug, Clone, PartialEq)]
pub struct BillRow {
    pub bill: Bill,
    pub date: String,
    pub status: String,
}

/// Owned by its page listeners, like [`NewBill`](crate::NewBill).
pub struct Bills {
    document: Weak<Document>,
    on_navigate: Navigate,
    store: Option<Arc<dyn Store>>,
}

impl Bills {
    pub fn mount(context: PageContext) -> Arc<Self> {
        let PageContext {
            document,
            on_navigate,
            store,
            session,
        } = context;

        let bills = Arc::new(Self {
            document: Arc::downgrade(&document),
            on_navigate: on_navigate.clone(),
            store,
        });

        if let Some(button) = document.query(NEW_BILL_BUTTON) {
            let controller = Arc::clone(&bills);
            document.add_event_listener(
                button,
                EventKind::Click,
                Arc::new(move |_: &mut Event| -> Pending {
                    controller.handle_click_new_bill();
                    None
                }),
            );
        }

        for icon in document.query_all(ICON_EYE) {
            let controller = Arc::clone(&bills);
            document.add_event_listener(
                icon,
                EventKind::Click,
                Arc::new(move |event: &mut Event| -> Pending {
                    controller.handle_click_icon_eye(event.target);
                    None
                }),
            );
        }

        Logout::mount(&document, session, on_navigate);

        bills
    }

    pub fn handle_click_new_bill(&self) {
        (self.on_navigate)(Route::NewBill);
    }

    /// Shows the receipt referenced by `icon` in the receipt modal.
    ///
    /// The image goes into the modal's `modal-body` element, or into the
    /// modal itself when it has no body.
    pub fn handle_click_icon_eye(&self, icon: NodeId) {
        let Some(document) = self.document.upgrade() else {
            tracing::debug!("Receipt requested after the page was closed");
            return;
        };
        let Some(modal) = document.query(RECEIPT_MODAL) else {
            let err = AppError::missing_element(RECEIPT_MODAL);
            tracing::error!(error = %err, "Cannot show receipt");
            return;
        };

        let bill_url = document
            .attribute(icon, BILL_URL_ATTRIBUTE)
            .unwrap_or_default();
        let img_width = document
            .attribute(modal, "width")
            .and_then(|width| width.parse::<f64>().ok())
            .map(|width| (width * 0.5).floor() as i64)
            .unwrap_or(0);

        let body = document
            .query_class_in(modal, MODAL_BODY_CLASS)
            .unwrap_or(modal);
        document.set_inner_html(
            body,
            format!(
                "<div style='text-align: center;' class=\"bill-proof-container\"><img width={} src={} alt=\"Bill\" /></div>",
                img_width, bill_url
            ),
        );
        document.set_attribute(modal, "class", "modal fade show");
        document.set_attribute(modal, "aria-hidden", "false");
    }

    /// Fetches the bills and prepares them for display, most recent first.
    ///
    /// Never fails: a rejected fetch yields an empty list, and a record whose
    /// date cannot be formatted keeps its raw date.
    pub async fn get_bills(&self) -> Vec<BillRow> {
        let Some(store) = self.store.clone() else {
            return Vec::new();
        };

        let mut bills = match store.bills().list().await {
            Ok(bills) => bills,
            Err(e) => {
                let err = AppError::from(e);
                tracing::error!(error = %err, "Failed to fetch bills");
                return Vec::new();
            }
        };

        // Dates are YYYY-MM-DD, so the string order is the chronological order.
        bills.sort_by(|a, b| b.date.cmp(&a.date));

        bills
            .into_iter()
            .map(|bill| {
                let date = match format_date(&bill.date) {
                    Ok(date) => date,
                    Err(e) => {
                        let err = AppError::from(e);
                        tracing::error!(error = %err, record = ?bill, "Failed to format bill date");
                        bill.date.clone()
                    }
                };
                BillRow {
                    date,
                    status: format_status(bill.status).to_string(),
                    bill,
                }
            })
            .collect()
    }
}
