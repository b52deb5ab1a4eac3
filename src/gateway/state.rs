use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use crate::user_auth::AuthService;

/// Gateway shared state
pub struct AppState {
    /// Register/login orchestrator (owns the signing secret)
    pub auth: Arc<AuthService>,
    /// Last time the health probe actually pinged the store (ms since epoch)
    pub(crate) last_health_check_ms: AtomicU64,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self {
            auth,
            last_health_check_ms: AtomicU64::new(0),
        }
    }
}
