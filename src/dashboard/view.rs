//! Dashboard view-model
//!
//! Ties the session gate, the ticket store and the derived statistics
//! together, and owns the transient UI state: the create/edit form, its
//! inline errors and the current toast.

use crate::clock::Clock;
use crate::dashboard::stats::{daily_histogram, DayBucket, TicketStats, HISTOGRAM_DAYS};
use crate::dashboard::toast::Toast;
use crate::navigation::{nav_items, NavItem, Navigation, Route};
use crate::session::{GateOutcome, SessionGate};
use crate::storage::KeyValueStore;
use crate::tickets::{
    Confirm, DeleteOutcome, FormErrors, Ticket, TicketError, TicketForm, TicketResult, TicketStore,
};
use chrono::TimeZone;
use std::sync::Arc;

/// Dashboard settings
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// How long the created/updated toast stays up (default: 2500ms)
    pub save_toast_ms: u64,
    /// How long the deleted toast stays up (default: 2000ms)
    pub delete_toast_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            save_toast_ms: 2500,
            delete_toast_ms: 2000,
        }
    }
}

/// Result of entering the dashboard
pub enum DashboardEntry {
    /// No valid session
    Redirect(Navigation),
    Ready(Box<Dashboard>),
}

/// The create/edit modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormModal {
    /// Id of the ticket being edited; `None` when creating
    pub editing: Option<String>,
    pub form: TicketForm,
    pub errors: FormErrors,
}

/// Result of submitting the modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(Ticket),
    Updated(Ticket),
    /// Validation failed; the modal stays open with these errors
    Invalid(FormErrors),
    /// No modal was open
    NothingToSave,
}

pub struct Dashboard {
    gate: SessionGate,
    store: TicketStore,
    clock: Arc<dyn Clock>,
    config: DashboardConfig,
    modal: Option<FormModal>,
    toast: Option<Toast>,
}

impl Dashboard {
    /// Gate on the session, then load (or seed) the user's tickets
    pub fn open(
        session_storage: Arc<dyn KeyValueStore>,
        local_storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: DashboardConfig,
    ) -> TicketResult<DashboardEntry> {
        let gate = SessionGate::new(session_storage, clock.clone());

        let email = match gate.require_session() {
            GateOutcome::Allowed(email) => email,
            GateOutcome::Redirect(nav) => {
                tracing::info!("No valid session, redirecting to {}", nav.target());
                return Ok(DashboardEntry::Redirect(nav));
            }
        };

        let store = TicketStore::load(local_storage, clock.clone(), email)?;

        Ok(DashboardEntry::Ready(Box::new(Self {
            gate,
            store,
            clock,
            config,
            modal: None,
            toast: None,
        })))
    }

    pub fn email(&self) -> &str {
        self.store.email()
    }

    pub fn store(&self) -> &TicketStore {
        &self.store
    }

    pub fn tickets(&self) -> &[Ticket] {
        self.store.tickets()
    }

    pub fn stats(&self) -> TicketStats {
        TicketStats::from_tickets(self.store.tickets())
    }

    /// Seven-day activity histogram ending today in `tz`, by the dashboard clock
    pub fn histogram<Tz: TimeZone>(&self, tz: &Tz) -> Vec<DayBucket> {
        match tz.timestamp_millis_opt(self.clock.now_millis()).single() {
            Some(now) => daily_histogram(self.store.tickets(), &now, HISTOGRAM_DAYS),
            None => {
                tracing::warn!("Clock is outside the representable date range");
                Vec::new()
            }
        }
    }

    pub fn nav_items(&self) -> &'static [NavItem] {
        nav_items()
    }

    pub fn modal(&self) -> Option<&FormModal> {
        self.modal.as_ref()
    }

    /// Open an empty form for a new ticket
    pub fn open_create(&mut self) {
        self.modal = Some(FormModal {
            editing: None,
            form: TicketForm::default(),
            errors: FormErrors::default(),
        });
    }

    /// Open the form prefilled with ticket `id`
    pub fn open_edit(&mut self, id: &str) -> TicketResult<()> {
        let ticket = self
            .store
            .get(id)
            .ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        self.modal = Some(FormModal {
            editing: Some(ticket.id.clone()),
            form: TicketForm::new(
                ticket.title.clone(),
                ticket.description.clone().unwrap_or_default(),
                ticket.status,
            ),
            errors: FormErrors::default(),
        });
        Ok(())
    }

    /// Form fields of the open modal, for editing
    pub fn form_mut(&mut self) -> Option<&mut TicketForm> {
        self.modal.as_mut().map(|m| &mut m.form)
    }

    pub fn close_form(&mut self) {
        self.modal = None;
    }

    /// Submit the open modal. Invalid input keeps the modal open with inline
    /// errors; a storage failure keeps it open and shows an error toast.
    pub fn save(&mut self) -> TicketResult<SaveOutcome> {
        let Some(modal) = self.modal.as_mut() else {
            return Ok(SaveOutcome::NothingToSave);
        };

        let errors = modal.form.validate();
        if !errors.is_empty() {
            modal.errors = errors.clone();
            return Ok(SaveOutcome::Invalid(errors));
        }

        let result = match modal.editing.clone() {
            Some(id) => self.store.update(&id, &modal.form).map(SaveOutcome::Updated),
            None => self.store.create(&modal.form).map(SaveOutcome::Created),
        };

        let now = self.clock.now_millis();
        match result {
            Ok(outcome) => {
                let message = match outcome {
                    SaveOutcome::Updated(_) => "Ticket updated.",
                    _ => "Ticket created.",
                };
                self.toast = Some(Toast::success(message, now, self.config.save_toast_ms));
                self.modal = None;
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("Failed to save ticket: {}", e);
                self.toast = Some(Toast::error("Failed to save ticket.", now, self.config.save_toast_ms));
                Err(e)
            }
        }
    }

    /// Delete ticket `id` after confirmation
    pub fn delete(&mut self, id: &str, confirm: &dyn Confirm) -> TicketResult<DeleteOutcome> {
        let outcome = self.store.delete(id, confirm)?;
        if let DeleteOutcome::Deleted(_) = outcome {
            self.toast = Some(Toast::success(
                "Ticket deleted.",
                self.clock.now_millis(),
                self.config.delete_toast_ms,
            ));
        }
        Ok(outcome)
    }

    /// Current toast, if it has not been dismissed yet
    pub fn toast(&self) -> Option<&Toast> {
        let now = self.clock.now_millis();
        self.toast.as_ref().filter(|t| t.is_visible_at(now))
    }

    /// End the session and leave for the login page
    pub fn logout(self) -> Navigation {
        tracing::info!(email = %self.store.email(), "Logging out");
        self.gate.end_session();
        Navigation::Redirect(Route::Login)
    }
}
