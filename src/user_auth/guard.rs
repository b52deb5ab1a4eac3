//! Process-local serialization of account creation.
//!
//! Holds a single async mutex across "check username unused -> hash -> insert"
//! so two registrations seen by this process cannot both pass the existence
//! check. Other instances are not covered; the `users.username` unique
//! constraint still decides.

use tokio::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct RegistrationGuard {
    lock: Mutex<()>,
}

impl RegistrationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access; released when the returned guard drops.
    pub async fn enter(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}
