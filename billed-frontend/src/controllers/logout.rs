use std::sync::Arc;

use crate::dom::{Document, Event, EventKind, Pending};
use crate::routes::{Navigate, Route};
use crate::session::Session;

pub const DISCONNECT_BUTTON: &str = "layout-disconnect";

pub struct Logout {
    session: Session,
    on_navigate: Navigate,
}

impl Logout {
    /// Binds the disconnect button when the layout renders one.
    pub fn mount(document: &Document, session: Session, on_navigate: Navigate) -> Arc<Self> {
        let logout = Arc::new(Self {
            session,
            on_navigate,
        });

        if let Some(button) = document.query(DISCONNECT_BUTTON) {
            let handler = Arc::clone(&logout);
            document.add_event_listener(
                button,
                EventKind::Click,
                Arc::new(move |_: &mut Event| -> Pending {
                    handler.handle_click();
                    None
                }),
            );
        }

        logout
    }

    pub fn handle_click(&self) {
        self.session.sign_out();
        tracing::info!("User signed out");
        (self.on_navigate)(Route::Login);
    }
}
