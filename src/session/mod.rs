//! Sessions and the simulated auth flow
//!
//! - **types**: `Session` and `Account` records
//! - **gate**: `SessionGate`, entry checks for protected and login views
//! - **auth**: `AuthService`, cancellable signup/login with simulated latency

pub mod auth;
pub mod gate;
pub mod types;

pub use auth::{AuthConfig, AuthError, AuthResult, AuthService, LoginSuccess, SignupRequest};
pub use gate::{GateOutcome, SessionGate};
pub use types::{password_digest, Account, Session};
