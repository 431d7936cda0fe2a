//! Storage layer
//!
//! - **backend**: the [`KeyValueStore`] abstraction plus memory and file backends
//! - **error**: Error types
//!
//! Two logical stores are used by the application, mirroring browser storage:
//!
//! ```text
//! session store (per tab)   ticketapp_session, ticketapp_account
//! local store (durable)     ticketapp_tickets_<email>
//! ```

pub mod backend;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use error::{StorageError, StorageResult};

/// Key holding the current session record
pub const SESSION_KEY: &str = "ticketapp_session";

/// Key holding the account created at signup
pub const ACCOUNT_KEY: &str = "ticketapp_account";

/// Prefix of per-user ticket list keys
pub const TICKETS_KEY_PREFIX: &str = "ticketapp_tickets_";

/// Key holding the ticket list owned by `email`
pub fn tickets_key(email: &str) -> String {
    format!("{}{}", TICKETS_KEY_PREFIX, email)
}
