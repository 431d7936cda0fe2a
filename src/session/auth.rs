//! Simulated signup and login
//!
//! Both flows wait a fixed delay to imitate a network round trip. The wait
//! races a [`CancellationToken`], so callers can abort an attempt and tests
//! can drive it with tokio's paused clock.
//!
//! Signup stores an [`Account`] in the session store; login checks it and
//! issues a [`Session`]. Neither flow navigates: both return the
//! [`Navigation`] the caller should follow.

use crate::clock::{Clock, DAY_MS};
use crate::navigation::{Navigation, Route};
use crate::session::types::{Account, Session};
use crate::storage::{KeyValueStore, StorageError, ACCOUNT_KEY, SESSION_KEY};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from the auth flows
#[derive(Error, Debug)]
pub enum AuthError {
    /// A required field was empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Signup password and confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Unknown email or wrong password; deliberately indistinguishable
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// The attempt was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth flow settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Simulated latency of a login attempt (default: 1s)
    pub login_delay: Duration,
    /// Simulated latency of a signup (default: 1.5s)
    pub signup_delay: Duration,
    /// Lifetime of an issued session in milliseconds (default: 7 days)
    pub session_ttl_ms: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_delay: Duration::from_millis(1000),
            signup_delay: Duration::from_millis(1500),
            session_ttl_ms: 7 * DAY_MS,
        }
    }
}

/// Signup form contents
#[derive(Debug, Clone, Default)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub session: Session,
    pub navigation: Navigation,
}

/// Runs signup and login against the session store
#[derive(Clone)]
pub struct AuthService {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: AuthConfig) -> Self {
        Self {
            storage,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Register an account. On success the caller is sent to the login page;
    /// no session is created.
    pub async fn signup(
        &self,
        request: SignupRequest,
        cancel: CancellationToken,
    ) -> AuthResult<Navigation> {
        let email = request.email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingField("Email"));
        }
        if request.password.is_empty() {
            return Err(AuthError::MissingField("Password"));
        }
        if request.password != request.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        simulate_latency(self.config.signup_delay, &cancel).await?;

        let account = Account::new(
            email,
            request.full_name.trim(),
            &request.password,
            self.clock.now_millis(),
        );
        let json = serde_json::to_string(&account).map_err(StorageError::from)?;
        self.storage.set(ACCOUNT_KEY, &json)?;

        tracing::info!(email = %account.email, "Account created");
        Ok(Navigation::Redirect(Route::Login))
    }

    /// Check credentials against the registered account and open a session
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        cancel: CancellationToken,
    ) -> AuthResult<LoginSuccess> {
        let email = email.trim();

        simulate_latency(self.config.login_delay, &cancel).await?;

        let account = self.registered_account();
        let valid = account
            .as_ref()
            .map(|a| a.matches(email, password))
            .unwrap_or(false);

        if !valid {
            tracing::info!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session::issue(email, self.clock.now_millis(), self.config.session_ttl_ms);
        let json = serde_json::to_string(&session).map_err(StorageError::from)?;
        self.storage.set(SESSION_KEY, &json)?;

        tracing::info!(email = %session.email, expires_at = session.expires_at, "Login successful");
        Ok(LoginSuccess {
            session,
            navigation: Navigation::Redirect(Route::Dashboard),
        })
    }

    /// Account stored at signup. Unreadable records count as none.
    pub fn registered_account(&self) -> Option<Account> {
        let raw = match self.storage.get(ACCOUNT_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read account: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Account>(&raw) {
            Ok(account) if !account.email.is_empty() => Some(account),
            _ => {
                tracing::warn!("Ignoring malformed account record");
                None
            }
        }
    }
}

async fn simulate_latency(delay: Duration, cancel: &CancellationToken) -> AuthResult<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("Auth request cancelled");
            Err(AuthError::Cancelled)
        }
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
