//! Explicit sessions.
//!
//! The legacy front-ends kept role/authentication state in ambient session
//! variables with no expiry. Here a session is a value handed through
//! request handling: it expires deterministically and logout drops it.

use chrono::{DateTime, Duration, Utc};

use crate::error::{AuthError, Result};
use crate::role::Role;

/// Default session lifetime.
pub const DEFAULT_TTL_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn start(username: impl Into<String>, role: Role, ttl: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            username: username.into(),
            role,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    pub fn with_default_ttl(username: impl Into<String>, role: Role) -> Self {
        Self::start(username, role, Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Gate an operation on a live session.
    pub fn require_active(&self) -> Result<()> {
        if self.is_expired() {
            Err(AuthError::SessionExpired)
        } else {
            Ok(())
        }
    }

    /// Logout: consume the session. Callers cannot use it afterwards.
    pub fn logout(self) {
        tracing::info!(username = %self.username, "logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_active() {
        let session = Session::with_default_ttl("admin", Role::Admin);
        assert!(!session.is_expired());
        assert!(session.require_active().is_ok());
    }

    #[test]
    fn session_expires_deterministically() {
        let session = Session::start("Guest", Role::Guest, Duration::minutes(30));
        let just_before = session.expires_at - Duration::seconds(1);
        let exactly = session.expires_at;

        assert!(!session.is_expired_at(just_before));
        assert!(session.is_expired_at(exactly));
    }

    #[test]
    fn zero_ttl_session_is_immediately_expired() {
        let session = Session::start("Guest", Role::Guest, Duration::zero());
        assert!(session.is_expired());
        assert!(matches!(
            session.require_active(),
            Err(AuthError::SessionExpired)
        ));
    }
}
