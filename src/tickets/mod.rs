//! Tickets
//!
//! - **types**: `Ticket` and `TicketStatus`
//! - **validation**: `TicketForm` and its field checks
//! - **store**: `TicketStore`, per-email CRUD over a `KeyValueStore`

pub mod store;
pub mod types;
pub mod validation;

pub use store::{
    demo_tickets, Confirm, DeleteOutcome, TicketError, TicketResult, TicketStore, DELETE_PROMPT,
};
pub use types::{ParseStatusError, Ticket, TicketStatus};
pub use validation::{FormErrors, FormField, TicketForm, DESCRIPTION_MAX_CHARS, TITLE_MIN_CHARS};
