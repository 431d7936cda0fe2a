//! # TicketApp
//!
//! Ticket tracking core for a single simulated user: session gating, a
//! cancellable signup/login flow, per-user ticket storage and dashboard
//! statistics.
//!
//! ## Modules
//!
//! - [`storage`]: `KeyValueStore` abstraction with memory and file backends
//! - [`session`]: session records, the session gate and the auth flow
//! - [`tickets`]: ticket types, form validation and the ticket store
//! - [`dashboard`]: derived statistics and the dashboard view-model
//! - [`navigation`]: routes and navigation intents
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ticketapp::clock::SystemClock;
//! use ticketapp::dashboard::{Dashboard, DashboardConfig, DashboardEntry};
//! use ticketapp::storage::MemoryStore;
//!
//! let session = Arc::new(MemoryStore::new());
//! let local = Arc::new(MemoryStore::new());
//!
//! match Dashboard::open(session, local, Arc::new(SystemClock), DashboardConfig::default()).unwrap() {
//!     DashboardEntry::Redirect(nav) => println!("go to {}", nav.target()),
//!     DashboardEntry::Ready(dashboard) => println!("{}", dashboard.stats()),
//! }
//! ```

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod navigation;
pub mod session;
pub mod storage;
pub mod tickets;

// Re-export top-level types for convenience
pub use clock::{Clock, ManualClock, SystemClock};

pub use config::{Config, ConfigError, LoggingConfig};

pub use dashboard::{
    daily_histogram, Dashboard, DashboardConfig, DashboardEntry, DayBucket, SaveOutcome,
    TicketStats, Toast,
};

pub use navigation::{NavItem, Navigation, Route};

pub use session::{AuthConfig, AuthError, AuthService, GateOutcome, Session, SessionGate};

pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult};

pub use tickets::{
    Confirm, DeleteOutcome, FormErrors, Ticket, TicketError, TicketForm, TicketStatus, TicketStore,
};
