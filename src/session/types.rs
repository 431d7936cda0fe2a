//! Session and account records
//!
//! Both records are stored as JSON in the session store. Field names are
//! camelCase to match the stored format.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A logged-in identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    /// Opaque token, never interpreted
    pub token: String,
    /// Unix timestamp in milliseconds
    pub expires_at: i64,
}

impl Session {
    /// Create a session for `email` that expires `ttl_ms` after `now`
    pub fn issue(email: impl Into<String>, now: i64, ttl_ms: i64) -> Self {
        Self {
            email: email.into(),
            token: uuid::Uuid::new_v4().simple().to_string(),
            expires_at: now + ttl_ms,
        }
    }

    /// Parse a stored record. Anything unparseable or without an email is
    /// treated as no session at all.
    pub fn parse(raw: &str) -> Option<Self> {
        let session: Session = serde_json::from_str(raw).ok()?;
        if session.email.trim().is_empty() {
            return None;
        }
        Some(session)
    }

    /// A session is valid only while its expiry is strictly in the future
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.expires_at > now
    }
}

/// Account registered at signup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    /// Hex SHA-256 of the password
    pub password_digest: String,
    pub created_at: i64,
}

impl Account {
    pub fn new(email: impl Into<String>, full_name: impl Into<String>, password: &str, now: i64) -> Self {
        Self {
            email: email.into(),
            full_name: full_name.into(),
            password_digest: password_digest(password),
            created_at: now,
        }
    }

    /// Check a login attempt against this account
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password_digest == password_digest(password)
    }
}

/// Hex-encoded SHA-256 of a password
pub fn password_digest(password: &str) -> String {
    Sha256::digest(password.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
