//! # dash-core
//!
//! Types shared by every dash crate:
//! - [`TokenPair`], the unit in which credentials are stored and replaced
//! - [`SessionIdentity`], the subject decoded from an access token
//! - GraphQL request/response envelopes exchanged with both endpoints

pub mod graphql;
pub mod identity;
pub mod token;

pub use graphql::{GraphqlError, GraphqlRequest, GraphqlResponse};
pub use identity::SessionIdentity;
pub use token::TokenPair;
