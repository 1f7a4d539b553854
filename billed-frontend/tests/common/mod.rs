//! Test helpers for billed-frontend controller tests.
//!
//! Provides a recording mock store, page fixtures and log capture.

#![allow(dead_code)]

use async_trait::async_trait;
use billed_frontend::controllers::{bills, logout, new_bill, PageContext};
use billed_frontend::dom::{Alert, Document, Element, NodeId};
use billed_frontend::models::{Bill, BillStatus, CreatedBill, SessionUser};
use billed_frontend::routes::{Navigate, Route};
use billed_frontend::session::{MemoryStorage, Session};
use billed_frontend::store::{
    BillsApi, CreateBillPayload, Store, StoreError, UpdateBillPayload,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const TEST_EMAIL: &str = "a@a";
pub const UPLOADED_FILE_URL: &str = "https://localhost:3456/images/test.jpg";
pub const UPLOADED_KEY: &str = "1234";
pub const INVALID_FILE_MESSAGE: &str = "Seuls les formats jpg, jpeg et png sont pris en compte.";

/// Bills collection that records every call and answers from its setup.
pub struct MockBills {
    create_calls: Mutex<Vec<CreateBillPayload>>,
    update_calls: Mutex<Vec<UpdateBillPayload>>,
    list_calls: AtomicUsize,
    listed: Vec<Bill>,
    create_failure: Option<(u16, String)>,
    update_failure: Option<(u16, String)>,
    list_failure: Option<(u16, String)>,
    update_gate: Option<Arc<Notify>>,
}

impl Default for MockBills {
    fn default() -> Self {
        Self {
            create_calls: Mutex::new(Vec::new()),
            update_calls: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            listed: fixture_bills(),
            create_failure: None,
            update_failure: None,
            list_failure: None,
            update_gate: None,
        }
    }
}

impl MockBills {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bills(mut self, bills: Vec<Bill>) -> Self {
        self.listed = bills;
        self
    }

    pub fn failing_create(mut self, status: u16, message: &str) -> Self {
        self.create_failure = Some((status, message.to_string()));
        self
    }

    pub fn failing_update(mut self, status: u16, message: &str) -> Self {
        self.update_failure = Some((status, message.to_string()));
        self
    }

    pub fn failing_list(mut self, status: u16, message: &str) -> Self {
        self.list_failure = Some((status, message.to_string()));
        self
    }

    /// Holds every update until `gate` is notified.
    pub fn gated_update(mut self, gate: Arc<Notify>) -> Self {
        self.update_gate = Some(gate);
        self
    }

    pub fn create_calls(&self) -> Vec<CreateBillPayload> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn update_calls(&self) -> Vec<UpdateBillPayload> {
        self.update_calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

fn rejected(failure: &Option<(u16, String)>) -> Option<StoreError> {
    failure.as_ref().map(|(status, message)| StoreError::Rejected {
        status: *status,
        message: message.clone(),
    })
}

#[async_trait]
impl BillsApi for MockBills {
    async fn create(&self, payload: CreateBillPayload) -> Result<CreatedBill, StoreError> {
        self.create_calls.lock().unwrap().push(payload);
        match rejected(&self.create_failure) {
            Some(err) => Err(err),
            None => Ok(CreatedBill {
                file_url: UPLOADED_FILE_URL.to_string(),
                key: UPLOADED_KEY.to_string(),
            }),
        }
    }

    async fn update(&self, payload: UpdateBillPayload) -> Result<(), StoreError> {
        self.update_calls.lock().unwrap().push(payload);
        if let Some(gate) = &self.update_gate {
            gate.notified().await;
        }
        match rejected(&self.update_failure) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match rejected(&self.list_failure) {
            Some(err) => Err(err),
            None => Ok(self.listed.clone()),
        }
    }
}

pub struct MockStore {
    pub bills: Arc<MockBills>,
}

impl MockStore {
    pub fn new(bills: MockBills) -> Arc<Self> {
        Arc::new(Self {
            bills: Arc::new(bills),
        })
    }
}

impl Store for MockStore {
    fn bills(&self) -> Arc<dyn BillsApi> {
        self.bills.clone()
    }
}

/// Records every route the controllers navigate to.
#[derive(Clone, Default)]
pub struct Navigation(Arc<Mutex<Vec<Route>>>);

impl Navigation {
    pub fn callback(&self) -> Navigate {
        let routes = self.0.clone();
        Arc::new(move |route: Route| routes.lock().unwrap().push(route))
    }

    pub fn routes(&self) -> Vec<Route> {
        self.0.lock().unwrap().clone()
    }
}

/// Records every alert message.
#[derive(Clone, Default)]
pub struct Alerts(Arc<Mutex<Vec<String>>>);

impl Alerts {
    pub fn callback(&self) -> Alert {
        let messages = self.0.clone();
        Arc::new(move |message: &str| messages.lock().unwrap().push(message.to_string()))
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Captures formatted log output for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// Keep the guard alive for as long as logs should be captured.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

pub fn signed_in_session(email: &str) -> (Arc<MemoryStorage>, Session) {
    let storage = Arc::new(MemoryStorage::new());
    let session = Session::new(storage.clone());
    session
        .sign_in(&SessionUser::employee(email))
        .expect("Failed to sign in test user");
    (storage, session)
}

pub fn page_context(
    document: Arc<Document>,
    navigation: &Navigation,
    store: Option<Arc<MockStore>>,
    session: Session,
) -> PageContext {
    PageContext {
        document,
        on_navigate: navigation.callback(),
        store: store.map(|store| store as Arc<dyn Store>),
        session,
    }
}

/// Node ids of a rendered new bill page.
pub struct NewBillPage {
    pub document: Arc<Document>,
    pub form: NodeId,
    pub file_input: NodeId,
    pub disconnect: NodeId,
}

impl NewBillPage {
    pub fn render() -> Self {
        let document = Arc::new(Document::new());
        let disconnect =
            document.append(Element::new("div").with_test_id(logout::DISCONNECT_BUTTON));
        let form = document.append(Element::new("form").with_test_id(new_bill::FORM));
        document.append_child(
            form,
            Element::new("select")
                .with_test_id(new_bill::EXPENSE_TYPE)
                .with_value("Transports"),
        );
        for test_id in [
            new_bill::EXPENSE_NAME,
            new_bill::AMOUNT,
            new_bill::DATE,
            new_bill::VAT,
            new_bill::PCT,
        ] {
            document.append_child(form, Element::new("input").with_test_id(test_id));
        }
        document.append_child(
            form,
            Element::new("textarea").with_test_id(new_bill::COMMENTARY),
        );
        let file_input =
            document.append_child(form, Element::new("input").with_test_id(new_bill::FILE_INPUT));

        Self {
            document,
            form,
            file_input,
            disconnect,
        }
    }

    pub fn fill(&self, test_id: &str, value: &str) {
        let node = self
            .document
            .query_in(self.form, test_id)
            .unwrap_or_else(|| panic!("No field {} in form", test_id));
        self.document.set_value(node, value);
    }
}

/// Node ids of a rendered bills page, one eye icon per bill.
pub struct BillsPage {
    pub document: Arc<Document>,
    pub new_bill_button: NodeId,
    pub icons: Vec<NodeId>,
    pub modal: NodeId,
    pub modal_body: NodeId,
    pub modal_width: u32,
}

impl BillsPage {
    pub fn render(listed: &[Bill]) -> Self {
        let document = Arc::new(Document::new());
        document.append(Element::new("div").with_test_id(logout::DISCONNECT_BUTTON));
        let new_bill_button =
            document.append(Element::new("button").with_test_id(bills::NEW_BILL_BUTTON));
        let icons = listed
            .iter()
            .map(|bill| {
                document.append(
                    Element::new("div")
                        .with_test_id(bills::ICON_EYE)
                        .with_attribute(
                            bills::BILL_URL_ATTRIBUTE,
                            bill.file_url.clone().unwrap_or_default(),
                        ),
                )
            })
            .collect();
        let modal_width = 600;
        let modal = document.append(
            Element::new("div")
                .with_test_id(bills::RECEIPT_MODAL)
                .with_attribute("width", modal_width.to_string()),
        );
        let dialog = document.append_child(
            modal,
            Element::new("div").with_attribute("class", "modal-dialog"),
        );
        let modal_body = document.append_child(
            dialog,
            Element::new("div").with_attribute("class", bills::MODAL_BODY_CLASS),
        );

        Self {
            document,
            new_bill_button,
            icons,
            modal,
            modal_body,
            modal_width,
        }
    }
}

pub fn bill(id: &str, date: &str, status: BillStatus) -> Bill {
    Bill {
        id: Some(id.to_string()),
        email: TEST_EMAIL.to_string(),
        expense_type: "Hôtel et logement".to_string(),
        name: format!("bill {}", id),
        amount: Some(400),
        date: date.to_string(),
        vat: "80".to_string(),
        pct: 20,
        commentary: "séminaire billed".to_string(),
        file_url: Some(format!("https://test.storage.tld/v0/b/{}.jpg", id)),
        file_name: Some(format!("{}.jpg", id)),
        status,
        comment_admin: None,
    }
}

pub fn fixture_bills() -> Vec<Bill> {
    vec![
        bill("47qAXb6fIm2zOKkLzMro", "2004-04-04", BillStatus::Pending),
        bill("BeKy5Mo4jkmdfPGYpTxZ", "2001-01-01", BillStatus::Refused),
        bill("UIUZtnPQvnbFnB0ozvJh", "2003-03-03", BillStatus::Accepted),
        bill("qcCK3SzECmaZAGRrHjaC", "2002-02-02", BillStatus::Refused),
    ]
}
