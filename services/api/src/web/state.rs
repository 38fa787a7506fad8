//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use checkin_core::ports::PortalService;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub portal: Arc<dyn PortalService>,
    /// Serializes portal calls. The portal session is a single cookie store,
    /// so two requests must never drive it at the same time.
    session_lock: Mutex<()>,
}

impl AppState {
    pub fn new(portal: Arc<dyn PortalService>) -> Self {
        Self {
            portal,
            session_lock: Mutex::new(()),
        }
    }

    /// Waits for exclusive use of the portal session.
    pub async fn lock_session(&self) -> MutexGuard<'_, ()> {
        self.session_lock.lock().await
    }
}
