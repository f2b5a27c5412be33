//! Session persistence.
//!
//! The sign-in token outlives the process: it is written through a
//! [`SessionStore`] and read back at start-up. A stored session past its
//! expiry is treated as absent.

pub mod file;

pub use file::FileSessionStore;

use std::sync::{Arc, Mutex, PoisonError};

use catalog_admin_core::Session;
use thiserror::Error;

/// Errors raised by a session store.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record could not be understood.
    #[error("malformed session record: {0}")]
    Malformed(String),
}

/// Durable place for the current session.
pub trait SessionStore {
    /// Read the stored session. Missing and expired sessions are `None`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the backing storage cannot be read.
    fn load(&self) -> Result<Option<Session>, SessionStoreError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the backing storage cannot be written.
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Forget the stored session. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the backing storage cannot be written.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// In-process store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(session))),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.as_ref().filter(|session| !session.is_expired()).cloned())
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
