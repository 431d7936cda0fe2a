//! Ticket form validation
//!
//! [`TicketForm::validate`] checks every field on every call and returns one
//! message per failing field. An empty [`FormErrors`] means the form may be
//! saved.

use crate::tickets::types::TicketStatus;
use std::collections::BTreeMap;

/// Minimum trimmed title length
pub const TITLE_MIN_CHARS: usize = 3;

/// Maximum description length
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Validated form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Title,
    Status,
    Description,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Status => "status",
            FormField::Description => "description",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Field name to error message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<FormField, String>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(&mut self, field: FormField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Contents of the create/edit form
///
/// `status` holds the raw submitted value so an out-of-range choice can be
/// reported instead of rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketForm {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl Default for TicketForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TicketStatus::Open.as_str().to_string(),
        }
    }
}

impl TicketForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>, status: TicketStatus) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: status.as_str().to_string(),
        }
    }

    /// Check all fields
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();

        if self.title.trim().chars().count() < TITLE_MIN_CHARS {
            errors.insert(FormField::Title, "Title is required (3+ characters).");
        }
        if self.parsed_status().is_none() {
            errors.insert(FormField::Status, "Invalid status.");
        }
        if self.description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.insert(FormField::Description, "Description max 2000 chars.");
        }

        errors
    }

    /// Status if it is one of the known values
    pub fn parsed_status(&self) -> Option<TicketStatus> {
        self.status.parse().ok()
    }

    pub(crate) fn trimmed_title(&self) -> String {
        self.title.trim().to_string()
    }

    /// Trimmed description; blank becomes `None`
    pub(crate) fn trimmed_description(&self) -> Option<String> {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, description: &str, status: &str) -> TicketForm {
        TicketForm {
            title: title.to_string(),
            description: description.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_title_length() {
        let errors = form("ab", "", "open").validate();
        assert_eq!(errors.get(FormField::Title), Some("Title is required (3+ characters)."));

        assert!(form("abc", "", "open").validate().is_empty());
        assert!(form("   ab   ", "", "open").validate().get(FormField::Title).is_some());
        assert!(form("", "", "open").validate().get(FormField::Title).is_some());
    }

    #[test]
    fn test_description_limit() {
        let exact = "x".repeat(DESCRIPTION_MAX_CHARS);
        assert!(form("abc", &exact, "open").validate().is_empty());

        let over = "x".repeat(DESCRIPTION_MAX_CHARS + 1);
        let errors = form("abc", &over, "open").validate();
        assert_eq!(errors.get(FormField::Description), Some("Description max 2000 chars."));
    }

    #[test]
    fn test_description_counts_chars_not_bytes() {
        let accented = "é".repeat(DESCRIPTION_MAX_CHARS);
        assert!(form("abc", &accented, "open").validate().is_empty());
    }

    #[test]
    fn test_invalid_status() {
        let errors = form("abc", "", "resolved").validate();
        assert_eq!(errors.get(FormField::Status), Some("Invalid status."));
        assert!(form("abc", "", "in_progress").validate().is_empty());
    }

    #[test]
    fn test_all_fields_checked_together() {
        let errors = form("a", &"x".repeat(2001), "bogus").validate();
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.to_string(),
            "title: Title is required (3+ characters).; status: Invalid status.; \
             description: Description max 2000 chars."
        );
    }

    #[test]
    fn test_trimmed_values() {
        let f = form("  Printer jam ", "   ", "open");
        assert_eq!(f.trimmed_title(), "Printer jam");
        assert_eq!(f.trimmed_description(), None);
    }
}
