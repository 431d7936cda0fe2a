//! Dashboard
//!
//! - **stats**: status counts and the seven-day histogram
//! - **toast**: transient notifications with a dismissal deadline
//! - **view**: the `Dashboard` view-model
//!
//! # Flow
//!
//! ```text
//! SessionGate ──redirect──▶ /login
//!     │ email
//!     ▼
//! TicketStore (load or seed) ──▶ stats + histogram
//!     ▲                              │
//!     └── create / update / delete ◀─┘
//! ```

pub mod stats;
pub mod toast;
pub mod view;

pub use stats::{daily_histogram, DayBucket, TicketStats, HISTOGRAM_DAYS};
pub use toast::{Toast, ToastKind};
pub use view::{Dashboard, DashboardConfig, DashboardEntry, FormModal, SaveOutcome};
