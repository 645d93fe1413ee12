//! Session state for the DSM client
//!
//! A session is the authenticated context granted by the DSM after
//! login: the session id plus the request-signing token that must
//! accompany every authenticated call. The store holds at most one
//! session behind an async mutex; holding the lock across a login keeps
//! session writes mutually exclusive with the reads other callers use
//! to sign their requests.

use tokio::sync::{Mutex, MutexGuard};

/// Login credentials for the DSM account
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

/// An authenticated session granted by the DSM
#[derive(Debug, Clone)]
pub struct Session {
    /// Session identifier (`data.sid` from the login response)
    pub sid: String,
    /// Request-signing token (`data.synotoken` from the login response)
    pub token: String,
}

/// Holder for the client's single session
///
/// `None` means unauthenticated; the next request must log in first.
/// The intermediate "authenticating" state exists only while a caller
/// holds the lock and is performing the login call.
#[derive(Debug, Default)]
pub struct SessionStore {
    slot: Mutex<Option<Session>>,
}

impl SessionStore {
    /// Create an empty (unauthenticated) store
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive access to the session slot
    ///
    /// The guard is held across login so no other caller can read a
    /// half-established session or sign a request with a token that is
    /// being replaced.
    pub async fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.slot.lock().await
    }

    /// Snapshot of the current session, if authenticated
    pub async fn current(&self) -> Option<Session> {
        self.slot.lock().await.clone()
    }

    /// Drop the current session, forcing the next request to re-login
    ///
    /// Returns whether a session was actually present.
    pub async fn invalidate(&self) -> bool {
        self.slot.lock().await.take().is_some()
    }
}
