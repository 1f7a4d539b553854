//! New bill page: receipt upload and bill submission.
//!
//! Selecting a receipt uploads it right away and reserves a bill key in the
//! store. Submitting the form fills that bill in. The two calls are
//! independent; an uploaded receipt stays even if the submission fails.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::NewBillSettings;
use crate::controllers::{Logout, PageContext};
use crate::dom::{Alert, Document, Event, EventKind, NodeId, Pending, SelectedFile};
use crate::error::AppError;
use crate::models::{Bill, BillStatus};
use crate::routes::{Navigate, Route};
use crate::session::Session;
use crate::store::{CreateBillPayload, ReceiptForm, RequestHeaders, Store, UpdateBillPayload};
use crate::utils::parse_int;

pub const FORM: &str = "form-new-bill";
pub const FILE_INPUT: &str = "file";
pub const EXPENSE_TYPE: &str = "expense-type";
pub const EXPENSE_NAME: &str = "expense-name";
pub const AMOUNT: &str = "amount";
pub const DATE: &str = "datepicker";
pub const VAT: &str = "vat";
pub const PCT: &str = "pct";
pub const COMMENTARY: &str = "commentary";

/// Result of the last successful receipt upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadState {
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub bill_id: Option<String>,
}

/// Listeners registered on the page own the controller; it only holds the
/// page weakly, so dropping the document releases both.
pub struct NewBill {
    document: Weak<Document>,
    on_navigate: Navigate,
    store: Option<Arc<dyn Store>>,
    session: Session,
    alert: Alert,
    settings: NewBillSettings,
    file_input: NodeId,
    upload: Mutex<UploadState>,
}

impl NewBill {
    /// Builds the controller and binds it to the form and file input.
    pub fn mount(
        context: PageContext,
        alert: Alert,
        settings: NewBillSettings,
    ) -> Result<Arc<Self>, AppError> {
        let PageContext {
            document,
            on_navigate,
            store,
            session,
        } = context;

        let form = document
            .query(FORM)
            .ok_or_else(|| AppError::missing_element(FORM))?;
        let file_input = document
            .query(FILE_INPUT)
            .ok_or_else(|| AppError::missing_element(FILE_INPUT))?;

        let new_bill = Arc::new(Self {
            document: Arc::downgrade(&document),
            on_navigate: on_navigate.clone(),
            store,
            session: session.clone(),
            alert,
            settings,
            file_input,
            upload: Mutex::new(UploadState::default()),
        });

        let controller = Arc::clone(&new_bill);
        document.add_event_listener(
            form,
            EventKind::Submit,
            Arc::new(move |event: &mut Event| -> Pending { controller.handle_submit(event) }),
        );

        let controller = Arc::clone(&new_bill);
        document.add_event_listener(
            file_input,
            EventKind::Change,
            Arc::new(move |event: &mut Event| -> Pending {
                controller.handle_change_file(event)
            }),
        );

        Logout::mount(&document, session, on_navigate);

        Ok(new_bill)
    }

    fn upload_state(&self) -> MutexGuard<'_, UploadState> {
        self.upload.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn upload_result(&self) -> UploadState {
        self.upload_state().clone()
    }

    pub fn file_url(&self) -> Option<String> {
        self.upload_state().file_url.clone()
    }

    pub fn file_name(&self) -> Option<String> {
        self.upload_state().file_name.clone()
    }

    pub fn bill_id(&self) -> Option<String> {
        self.upload_state().bill_id.clone()
    }

    /// Validates the first selected file and uploads it.
    ///
    /// A disallowed extension clears the input and alerts; the file never
    /// reaches the store.
    pub fn handle_change_file(self: &Arc<Self>, event: &mut Event) -> Pending {
        event.prevent_default();

        let Some(document) = self.document.upgrade() else {
            tracing::debug!("File input changed after the page was closed");
            return None;
        };
        let Some(file) = document.files(self.file_input).into_iter().next() else {
            tracing::debug!("File input changed without a selected file");
            return None;
        };

        if !self.settings.accepts(&file.name) {
            document.set_value(self.file_input, "");
            (self.alert)(&self.settings.invalid_file_message);
            let err = AppError::Validation(format!("unsupported receipt format: {}", file.name));
            tracing::warn!(file_name = %file.name, error = %err, "Receipt rejected");
            return None;
        }

        match self.start_upload(file) {
            Ok(pending) => Some(pending),
            Err(e) => {
                tracing::error!(error = %e, "Receipt upload not started");
                None
            }
        }
    }

    fn start_upload(self: &Arc<Self>, file: SelectedFile) -> Result<JoinHandle<()>, AppError> {
        let email = self.session.email()?;
        let store = self.store.clone().ok_or(AppError::NoStore)?;
        let runtime = Handle::try_current()?;

        let file_name = file.name.clone();
        let payload = CreateBillPayload {
            data: ReceiptForm { file, email },
            headers: RequestHeaders {
                no_content_type: true,
            },
        };

        let controller = Arc::clone(self);
        Ok(runtime.spawn(async move {
            match store.bills().create(payload).await {
                Ok(created) => {
                    tracing::info!(
                        file_url = %created.file_url,
                        bill_id = %created.key,
                        file_name = %file_name,
                        "Receipt uploaded"
                    );
                    let mut state = controller.upload_state();
                    state.bill_id = Some(created.key);
                    state.file_url = Some(created.file_url);
                    state.file_name = Some(file_name);
                }
                Err(e) => {
                    let err = AppError::from(e);
                    tracing::error!(file_name = %file_name, error = %err, "Receipt upload failed");
                }
            }
        }))
    }

    /// Assembles the bill from the form and persists it.
    ///
    /// Navigation to the bills list happens before the update settles, and
    /// also when the form could not be read.
    pub fn handle_submit(self: &Arc<Self>, event: &mut Event) -> Pending {
        event.prevent_default();

        let bill = self.read_bill(event.target);
        (self.on_navigate)(Route::Bills);

        match bill {
            Ok(bill) => self.update_bill(bill),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read new bill form");
                None
            }
        }
    }

    fn read_bill(&self, form: NodeId) -> Result<Bill, AppError> {
        let email = self.session.email()?;
        let document = self
            .document
            .upgrade()
            .ok_or_else(|| AppError::missing_element(FORM))?;
        let field = |test_id: &str| -> Result<String, AppError> {
            document
                .query_in(form, test_id)
                .and_then(|node| document.value(node))
                .ok_or_else(|| AppError::missing_element(test_id))
        };

        let pct = parse_int(&field(PCT)?)
            .filter(|pct| *pct != 0)
            .unwrap_or(self.settings.default_pct);
        let upload = self.upload_result();

        Ok(Bill {
            id: None,
            email,
            expense_type: field(EXPENSE_TYPE)?,
            name: field(EXPENSE_NAME)?,
            amount: parse_int(&field(AMOUNT)?),
            date: field(DATE)?,
            vat: field(VAT)?,
            pct,
            commentary: field(COMMENTARY)?,
            file_url: upload.file_url,
            file_name: upload.file_name,
            status: BillStatus::Pending,
            comment_admin: None,
        })
    }

    /// Sends `bill` to the store under the uploaded receipt's key.
    ///
    /// Without a store this does nothing. A successful update navigates to
    /// the bills list again; a failed one is only logged.
    pub fn update_bill(self: &Arc<Self>, bill: Bill) -> Pending {
        let store = self.store.clone()?;

        let payload = match serde_json::to_string(&bill) {
            Ok(data) => UpdateBillPayload {
                data,
                selector: self.bill_id(),
            },
            Err(e) => {
                let err = AppError::from(e);
                tracing::error!(error = %err, "Failed to serialize bill");
                return None;
            }
        };

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                let err = AppError::from(e);
                tracing::error!(error = %err, "Bill update not started");
                return None;
            }
        };

        let on_navigate = self.on_navigate.clone();
        Some(runtime.spawn(async move {
            let selector = payload.selector.clone().unwrap_or_default();
            match store.bills().update(payload).await {
                Ok(()) => {
                    tracing::info!(bill_id = %selector, "Bill updated");
                    on_navigate(Route::Bills);
                }
                Err(e) => {
                    let err = AppError::from(e);
                    tracing::error!(bill_id = %selector, error = %err, "Bill update failed");
                }
            }
        }))
    }
}
