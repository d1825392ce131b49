//! Shelf marketplace HTTP client

pub mod auth;
pub mod error;
pub mod pipeline;
pub mod typed;

pub use error::ClientError;
pub use typed::{AuthenticatedShelfClient, PublicShelfClient, TypedClientBuilder};
