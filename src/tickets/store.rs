//! Per-user ticket store
//!
//! Holds the ordered ticket list for one session email and keeps it in sync
//! with the `ticketapp_tickets_<email>` key.
//!
//! ```text
//! load:    key missing → seed demo list → persist
//!          key present → parse (bad data → empty list)
//! mutate:  validate → build next list → persist → swap in memory
//! ```
//!
//! Ordering: new tickets go first, updates keep their position and deletes
//! keep the relative order of what remains.

use crate::clock::{Clock, DAY_MS};
use crate::storage::{tickets_key, KeyValueStore, StorageError};
use crate::tickets::types::{Ticket, TicketStatus};
use crate::tickets::validation::{FormErrors, TicketForm};
use std::sync::Arc;
use thiserror::Error;

/// Prompt shown before a ticket is deleted
pub const DELETE_PROMPT: &str = "Delete this ticket?";

/// Errors from ticket operations
#[derive(Error, Debug)]
pub enum TicketError {
    /// Form failed validation; nothing was saved
    #[error("Validation error: {0}")]
    Validation(FormErrors),

    /// No ticket with this id in the list
    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for ticket operations
pub type TicketResult<T> = Result<T, TicketError>;

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Removed and persisted
    Deleted(Ticket),
    /// User declined; nothing changed
    Declined,
}

/// Fixed demo list written the first time an email has no tickets
pub fn demo_tickets(now: i64) -> Vec<Ticket> {
    vec![
        Ticket::new("t1", "Site down", TicketStatus::Open, now - 2 * DAY_MS)
            .description("Main site unreachable"),
        Ticket::new("t2", "Checkout bug", TicketStatus::InProgress, now - 4 * DAY_MS)
            .description("Payments failing for some cards"),
        Ticket::new(
            "t3",
            "Feature request: dark mode",
            TicketStatus::Closed,
            now - 10 * DAY_MS,
        )
        .description("UI request"),
    ]
}

/// Ticket list owned by one email
pub struct TicketStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    email: String,
    key: String,
    tickets: Vec<Ticket>,
}

impl TicketStore {
    /// Load the list for `email`, seeding the demo list if none exists
    pub fn load(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        email: impl Into<String>,
    ) -> TicketResult<Self> {
        let email = email.into();
        let key = tickets_key(&email);

        let tickets = match storage.get(&key)? {
            None => {
                let demo = demo_tickets(clock.now_millis());
                storage.set(&key, &serde_json::to_string(&demo).map_err(StorageError::from)?)?;
                tracing::info!(email = %email, "Seeded demo tickets");
                demo
            }
            Some(raw) => parse_ticket_list(&raw),
        };

        tracing::debug!(email = %email, count = tickets.len(), "Loaded tickets");

        Ok(Self {
            storage,
            clock,
            email,
            key,
            tickets,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    /// Tickets whose title or description contains `query`, ignoring case.
    /// A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Ticket> {
        let needle = query.trim().to_lowercase();
        self.tickets
            .iter()
            .filter(|t| needle.is_empty() || t.matches_lowercase(&needle))
            .collect()
    }

    /// Tickets with the given status, in list order
    pub fn filter_status(&self, status: TicketStatus) -> Vec<&Ticket> {
        self.tickets.iter().filter(|t| t.status == status).collect()
    }

    /// Overwrite the stored list with `next`. The in-memory list only
    /// changes once the write succeeded.
    pub fn persist(&mut self, next: Vec<Ticket>) -> TicketResult<()> {
        let json = serde_json::to_string(&next).map_err(StorageError::from)?;
        self.storage.set(&self.key, &json)?;
        self.tickets = next;
        Ok(())
    }

    /// Validate and prepend a new ticket
    pub fn create(&mut self, form: &TicketForm) -> TicketResult<Ticket> {
        let status = validated_status(form)?;
        let now = self.clock.now_millis();

        let ticket = Ticket {
            id: self.fresh_id(now),
            title: form.trimmed_title(),
            description: form.trimmed_description(),
            status,
            created_at: now,
        };

        let mut next = Vec::with_capacity(self.tickets.len() + 1);
        next.push(ticket.clone());
        next.extend(self.tickets.iter().cloned());
        self.persist(next)?;

        tracing::info!(id = %ticket.id, status = %ticket.status, "Ticket created");
        Ok(ticket)
    }

    /// Validate and replace the mutable fields of ticket `id`
    pub fn update(&mut self, id: &str, form: &TicketForm) -> TicketResult<Ticket> {
        let status = validated_status(form)?;
        let index = self
            .tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        let mut next = self.tickets.clone();
        let ticket = &mut next[index];
        ticket.title = form.trimmed_title();
        ticket.description = form.trimmed_description();
        ticket.status = status;
        let updated = ticket.clone();

        self.persist(next)?;

        tracing::info!(id = %updated.id, status = %updated.status, "Ticket updated");
        Ok(updated)
    }

    /// Remove ticket `id` once `confirm` agrees
    pub fn delete(&mut self, id: &str, confirm: &dyn Confirm) -> TicketResult<DeleteOutcome> {
        if self.get(id).is_none() {
            return Err(TicketError::NotFound(id.to_string()));
        }

        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(id, "Delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let mut removed = None;
        let mut next = Vec::with_capacity(self.tickets.len());
        for ticket in &self.tickets {
            if ticket.id == id {
                removed = Some(ticket.clone());
            } else {
                next.push(ticket.clone());
            }
        }
        self.persist(next)?;

        let removed = removed.ok_or_else(|| TicketError::NotFound(id.to_string()))?;
        tracing::info!(id = %removed.id, "Ticket deleted");
        Ok(DeleteOutcome::Deleted(removed))
    }

    /// `t<createdAt>`, suffixed if another ticket already took that id
    fn fresh_id(&self, now: i64) -> String {
        let base = format!("t{}", now);
        if self.get(&base).is_none() {
            return base;
        }
        (1..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or(base)
    }
}

fn validated_status(form: &TicketForm) -> TicketResult<TicketStatus> {
    let errors = form.validate();
    match form.parsed_status() {
        Some(status) if errors.is_empty() => Ok(status),
        _ => Err(TicketError::Validation(errors)),
    }
}

/// Parse a stored list. Non-arrays yield an empty list; entries that do not
/// parse as tickets are skipped.
fn parse_ticket_list(raw: &str) -> Vec<Ticket> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!("Stored ticket list is not an array, using empty list: {}", e);
            return Vec::new();
        }
    };

    let total = values.len();
    let tickets: Vec<Ticket> = values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();

    if tickets.len() != total {
        tracing::warn!("Skipped {} malformed ticket entries", total - tickets.len());
    }

    tickets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::testing::FailingStore;
    use crate::storage::MemoryStore;

    const NOW: i64 = 1_700_000_000_000;
    const EMAIL: &str = "user@x.com";

    fn create_test_store() -> (TicketStore, Arc<MemoryStore>, Arc<ManualClock>) {
        let storage = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(NOW));
        let store = TicketStore::load(storage.clone(), clock.clone(), EMAIL).unwrap();
        (store, storage, clock)
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    fn stored(storage: &MemoryStore) -> Vec<Ticket> {
        serde_json::from_str(&storage.get(&tickets_key(EMAIL)).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn test_seeds_demo_list() {
        let (store, storage, _clock) = create_test_store();

        let statuses: Vec<TicketStatus> = store.tickets().iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            vec![TicketStatus::Open, TicketStatus::InProgress, TicketStatus::Closed]
        );

        let ages: Vec<i64> = store
            .tickets()
            .iter()
            .map(|t| (NOW - t.created_at) / DAY_MS)
            .collect();
        assert_eq!(ages, vec![2, 4, 10]);

        assert_eq!(stored(&storage), store.tickets());
    }

    #[test]
    fn test_existing_list_is_not_reseeded() {
        let storage = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(NOW));
        storage.set(&tickets_key(EMAIL), "[]").unwrap();

        let store = TicketStore::load(storage.clone(), clock, EMAIL).unwrap();
        assert!(store.is_empty());
        assert_eq!(storage.get(&tickets_key(EMAIL)).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_malformed_list_loads_empty() {
        let storage = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(NOW));

        for raw in ["{not json", "{\"id\":\"t1\"}", "42"] {
            storage.set(&tickets_key(EMAIL), raw).unwrap();
            let store = TicketStore::load(storage.clone(), clock.clone(), EMAIL).unwrap();
            assert!(store.is_empty(), "expected empty list for {raw}");
        }
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let storage = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(NOW));
        storage
            .set(
                &tickets_key(EMAIL),
                r#"[{"id":"a","title":"Good one","status":"open","createdAt":1},
                    {"id":"b","title":"Bad status","status":"resolved","createdAt":1}]"#,
            )
            .unwrap();

        let store = TicketStore::load(storage, clock, EMAIL).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.tickets()[0].id, "a");
    }

    #[test]
    fn test_lists_are_scoped_by_email() {
        let (mut store, storage, clock) = create_test_store();
        store
            .create(&TicketForm::new("Mine only", "", TicketStatus::Open))
            .unwrap();

        let other = TicketStore::load(storage, clock, "other@x.com").unwrap();
        assert_eq!(other.len(), 3);
        assert!(other.tickets().iter().all(|t| t.title != "Mine only"));
    }

    #[test]
    fn test_create_prepends_and_persists() {
        let (mut store, storage, _clock) = create_test_store();
        let before = store.len();

        let ticket = store
            .create(&TicketForm::new("  Printer jam  ", "  Floor 3 ", TicketStatus::Open))
            .unwrap();

        assert_eq!(store.len(), before + 1);
        assert_eq!(store.tickets()[0], ticket);
        assert_eq!(ticket.title, "Printer jam");
        assert_eq!(ticket.description.as_deref(), Some("Floor 3"));
        assert_eq!(ticket.created_at, NOW);
        assert_eq!(stored(&storage), store.tickets());
    }

    #[test]
    fn test_create_rejects_invalid_form() {
        let (mut store, storage, _clock) = create_test_store();
        let before = stored(&storage);

        let form = TicketForm {
            title: "ab".to_string(),
            description: String::new(),
            status: "open".to_string(),
        };
        let err = store.create(&form).unwrap_err();
        assert!(matches!(err, TicketError::Validation(ref e) if e.len() == 1));

        assert_eq!(store.len(), 3);
        assert_eq!(stored(&storage), before);
    }

    #[test]
    fn test_ids_stay_unique_within_same_millisecond() {
        let (mut store, _storage, _clock) = create_test_store();
        let a = store
            .create(&TicketForm::new("First", "", TicketStatus::Open))
            .unwrap();
        let b = store
            .create(&TicketForm::new("Second", "", TicketStatus::Open))
            .unwrap();
        let c = store
            .create(&TicketForm::new("Third", "", TicketStatus::Open))
            .unwrap();

        assert_eq!(a.id, format!("t{}", NOW));
        assert_eq!(b.id, format!("t{}-1", NOW));
        assert_eq!(c.id, format!("t{}-2", NOW));
    }

    #[test]
    fn test_update_preserves_identity_and_position() {
        let (mut store, storage, clock) = create_test_store();
        let original = store.tickets()[1].clone();
        clock.advance(DAY_MS);

        let updated = store
            .update(
                &original.id,
                &TicketForm::new("Checkout fixed", "", TicketStatus::Closed),
            )
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.title, "Checkout fixed");
        assert_eq!(updated.description, None);
        assert_eq!(updated.status, TicketStatus::Closed);
        assert_eq!(store.tickets()[1], updated);
        assert_eq!(stored(&storage), store.tickets());
    }

    #[test]
    fn test_update_unknown_id() {
        let (mut store, _storage, _clock) = create_test_store();
        let result = store.update("missing", &TicketForm::new("Whatever", "", TicketStatus::Open));
        assert!(matches!(result, Err(TicketError::NotFound(_))));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let (mut store, storage, _clock) = create_test_store();
        let before = store.tickets().to_vec();

        assert_eq!(store.delete("t2", &no).unwrap(), DeleteOutcome::Declined);
        assert_eq!(store.tickets(), before.as_slice());

        let outcome = store.delete("t2", &yes).unwrap();
        assert!(matches!(outcome, DeleteOutcome::Deleted(ref t) if t.id == "t2"));

        let ids: Vec<&str> = store.tickets().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t3"]);
        assert_eq!(stored(&storage), store.tickets());
    }

    #[test]
    fn test_delete_prompt_text() {
        let (mut store, _storage, _clock) = create_test_store();
        let seen = std::cell::RefCell::new(String::new());
        let prompt = |p: &str| {
            *seen.borrow_mut() = p.to_string();
            false
        };
        store.delete("t1", &prompt).unwrap();
        assert_eq!(*seen.borrow(), DELETE_PROMPT);
    }

    #[test]
    fn test_delete_unknown_id_skips_prompt() {
        let (mut store, _storage, _clock) = create_test_store();
        let asked = std::cell::Cell::new(false);
        let prompt = |_: &str| {
            asked.set(true);
            true
        };
        assert!(matches!(
            store.delete("missing", &prompt),
            Err(TicketError::NotFound(_))
        ));
        assert!(!asked.get());
    }

    #[test]
    fn test_create_then_delete_restores_list() {
        let (mut store, storage, _clock) = create_test_store();
        let before = store.tickets().to_vec();

        let ticket = store
            .create(&TicketForm::new("Printer jam", "", TicketStatus::Open))
            .unwrap();
        store.delete(&ticket.id, &yes).unwrap();

        assert_eq!(store.tickets(), before.as_slice());
        assert_eq!(stored(&storage), before);
    }

    #[test]
    fn test_failed_writes_leave_list_unchanged() {
        let storage = Arc::new(FailingStore::new());
        let clock = Arc::new(ManualClock::new(NOW));
        let mut store = TicketStore::load(storage.clone(), clock, EMAIL).unwrap();
        let before = store.tickets().to_vec();
        storage.fail_writes();

        let created = store.create(&TicketForm::new("Printer jam", "", TicketStatus::Open));
        assert!(matches!(created, Err(TicketError::Storage(_))));
        assert_eq!(store.tickets(), before.as_slice());

        let updated = store.update("t1", &TicketForm::new("Renamed", "", TicketStatus::Closed));
        assert!(matches!(updated, Err(TicketError::Storage(_))));
        assert_eq!(store.tickets(), before.as_slice());

        let deleted = store.delete("t1", &yes);
        assert!(matches!(deleted, Err(TicketError::Storage(_))));
        assert_eq!(store.tickets(), before.as_slice());

        let persisted: Vec<Ticket> =
            serde_json::from_str(&storage.get(&tickets_key(EMAIL)).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, before);
    }

    #[test]
    fn test_search_and_filter() {
        let (store, _storage, _clock) = create_test_store();

        let hits: Vec<&str> = store.search("PAYMENTS").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(hits, vec!["t2"]);
        assert_eq!(store.search("  ").len(), 3);
        assert!(store.search("nothing like this").is_empty());

        let closed = store.filter_status(TicketStatus::Closed);
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].id, "t3");

        // Search narrowed by status, as the list command combines them
        let mut hits = store.search("");
        hits.retain(|t| closed.iter().any(|c| c.id == t.id));
        assert_eq!(hits, closed);
    }
}
