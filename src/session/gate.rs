//! Session gate
//!
//! Decides whether a view may be entered based on the stored session record.
//! The gate never navigates: it hands back a [`GateOutcome`] or a
//! [`Navigation`] and leaves the redirect to the caller.
//!
//! Missing, malformed and expired sessions are all treated the same way. The
//! last two are removed from storage on sight.

use crate::clock::Clock;
use crate::navigation::{Navigation, Route};
use crate::session::types::Session;
use crate::storage::{KeyValueStore, SESSION_KEY};
use std::sync::Arc;

/// Result of gating a protected view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Session is valid; carries the session email
    Allowed(String),
    /// No usable session; the caller should follow this
    Redirect(Navigation),
}

/// What was found under the session key
#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredSession {
    Absent,
    Invalid,
    Valid(Session),
}

/// Reads and clears the stored session
#[derive(Clone)]
pub struct SessionGate {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl SessionGate {
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Gate a protected view
    pub fn require_session(&self) -> GateOutcome {
        match self.inspect() {
            StoredSession::Valid(session) => {
                tracing::debug!(email = %session.email, "session accepted");
                GateOutcome::Allowed(session.email)
            }
            StoredSession::Absent => GateOutcome::Redirect(Navigation::Redirect(Route::Login)),
            StoredSession::Invalid => {
                self.clear();
                GateOutcome::Redirect(Navigation::Redirect(Route::Login))
            }
        }
    }

    /// Reverse gate for the login page: a valid session skips straight to the
    /// dashboard. Stale records are cleared either way.
    pub fn redirect_if_authenticated(&self) -> Option<Navigation> {
        match self.inspect() {
            StoredSession::Valid(_) => Some(Navigation::Redirect(Route::Dashboard)),
            StoredSession::Absent => None,
            StoredSession::Invalid => {
                self.clear();
                None
            }
        }
    }

    /// Current valid session, if any. Does not modify storage.
    pub fn current(&self) -> Option<Session> {
        match self.inspect() {
            StoredSession::Valid(session) => Some(session),
            _ => None,
        }
    }

    /// Remove the session record
    pub fn end_session(&self) {
        self.clear();
    }

    fn inspect(&self) -> StoredSession {
        let raw = match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StoredSession::Absent,
            Err(e) => {
                tracing::warn!("Failed to read session: {}", e);
                return StoredSession::Absent;
            }
        };

        let Some(session) = Session::parse(&raw) else {
            tracing::warn!("Discarding malformed session record");
            return StoredSession::Invalid;
        };

        if !session.is_valid_at(self.clock.now_millis()) {
            tracing::info!(email = %session.email, "Session expired");
            return StoredSession::Invalid;
        }

        StoredSession::Valid(session)
    }

    fn clear(&self) {
        if let Err(e) = self.storage.remove(SESSION_KEY) {
            tracing::warn!("Failed to clear session: {}", e);
        }
    }
}
