//! Credentials, roles, and sessions for Intake Desk.
//!
//! The credential file is the legacy `users.json` shape: username to
//! `{ password: sha256-hex, role }`. Defaults are seeded once per profile;
//! there is no lockout, rate limiting, or rotation.

pub mod credentials;
pub mod error;
pub mod role;
pub mod session;

pub use credentials::{CredentialStore, hash_password};
pub use error::{AuthError, Result};
pub use role::Role;
pub use session::{DEFAULT_TTL_MINUTES, Session};
