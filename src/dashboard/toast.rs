//! Toast notifications
//!
//! A toast carries its own dismissal deadline, so showing or hiding it is a
//! comparison against the current time rather than a timer.

use serde::Serialize;

/// Toast style
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// Transient message shown after an action
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    /// Unix milliseconds after which the toast is gone
    pub dismiss_at: i64,
}

impl Toast {
    pub fn success(message: impl Into<String>, now: i64, duration_ms: u64) -> Self {
        Self::new(ToastKind::Success, message, now, duration_ms)
    }

    pub fn error(message: impl Into<String>, now: i64, duration_ms: u64) -> Self {
        Self::new(ToastKind::Error, message, now, duration_ms)
    }

    fn new(kind: ToastKind, message: impl Into<String>, now: i64, duration_ms: u64) -> Self {
        Self {
            kind,
            message: message.into(),
            dismiss_at: now.saturating_add(duration_ms as i64),
        }
    }

    pub fn is_visible_at(&self, now: i64) -> bool {
        now < self.dismiss_at
    }
}
