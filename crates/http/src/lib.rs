//! Shelf HTTP module providing the typed client for the marketplace backend
//!
//! Public endpoints go through [`PublicShelfClient`]; anything that needs the
//! signed-in user's credentials goes through [`AuthenticatedShelfClient`],
//! which attaches the stored access token and silently refreshes it once on
//! a 401.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod types;

pub use client::{AuthenticatedShelfClient, ClientError, PublicShelfClient, TypedClientBuilder};
