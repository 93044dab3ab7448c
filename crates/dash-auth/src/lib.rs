//! # dash-auth
//!
//! Credential lifecycle for the dash admin client.
//!
//! - [`store`]: alias-aware token storage over keyring, file or memory backends
//! - [`inspector`]: unverified access-token decoding for expiry scheduling
//! - [`coordinator`]: single-flight refresh-token redemption
//! - [`events`]: session renewed/ended notifications
//!
//! [`Session`] bundles them into the one object every client pipeline shares.

pub mod coordinator;
pub mod error;
pub mod events;
pub mod inspector;
pub mod session;
pub mod store;

pub use coordinator::{RefreshCoordinator, RefreshOutcome, Renewer};
pub use error::AuthError;
pub use events::{SessionEvent, SessionEvents};
pub use inspector::{DEFAULT_REFRESH_THRESHOLD_SECS, DecodedAccessClaims};
pub use session::{Session, SessionOptions};
pub use store::{CredentialStore, KeyValueBackend};
