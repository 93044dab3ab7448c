//! # dash-client
//!
//! Authenticated GraphQL pipelines for the dash admin API.
//!
//! Each request flows through the Proactive Attachment stage
//! ([`attach::AttachStage`]), one [`transport::Transport`] round-trip and the
//! Reactive Recovery stage ([`recover::RecoveryStage`]). [`Clients`] composes
//! the main and system endpoint pipelines over a single shared
//! [`dash_auth::Session`].

pub mod attach;
pub mod auth_api;
pub mod clients;
pub mod error;
pub mod pipeline;
pub mod recover;
pub mod renew;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use auth_api::AuthApi;
pub use clients::{Clients, open_store};
pub use error::{ClientError, TransportError};
pub use pipeline::{ClientPipeline, Endpoint};
pub use renew::GraphqlRenewer;
pub use transport::{HttpTransport, Transport};
