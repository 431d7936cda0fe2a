//! Core ticket types
//!
//! - `Ticket`: a unit of trackable work
//! - `TicketStatus`: the fixed lifecycle enumeration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a ticket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
}

impl TicketStatus {
    /// Get all statuses for iteration
    pub fn all() -> &'static [TicketStatus] {
        &[
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Closed,
        ]
    }

    /// Stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Closed => "closed",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown ticket status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for TicketStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketStatus::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// A support ticket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique within the owner's list
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TicketStatus,
    /// Unix timestamp in milliseconds
    pub created_at: i64,
}

impl Ticket {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        status: TicketStatus,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status,
            created_at,
        }
    }

    /// Builder method: set description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Case-insensitive match against title and description.
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(needle))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_strings() {
        for status in TicketStatus::all() {
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), *status);
        }
        assert!("resolved".parse::<TicketStatus>().is_err());
        assert!("Open".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_ticket_stored_format() {
        let ticket = Ticket::new("t1", "Site down", TicketStatus::InProgress, 5)
            .description("Main site unreachable");
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["createdAt"], 5);
        assert_eq!(json["description"], "Main site unreachable");

        let bare = Ticket::new("t2", "No description", TicketStatus::Open, 5);
        let json = serde_json::to_value(&bare).unwrap();
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_ticket_parses_without_description() {
        let ticket: Ticket =
            serde_json::from_str(r#"{"id":"t9","title":"abc","status":"closed","createdAt":1}"#)
                .unwrap();
        assert_eq!(ticket.description, None);
        assert_eq!(ticket.status, TicketStatus::Closed);
    }

    #[test]
    fn test_matches_lowercase() {
        let ticket = Ticket::new("t1", "Printer Jam", TicketStatus::Open, 0).description("Floor 3");
        assert!(ticket.matches_lowercase("printer"));
        assert!(ticket.matches_lowercase("floor 3"));
        assert!(!ticket.matches_lowercase("scanner"));
    }
}
