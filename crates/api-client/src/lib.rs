//! Client for the generation backend HTTP API.
//!
//! Everything here is an opaque JSON request/response pair; the backend
//! owns all generation logic. The [`GenerationApi`] trait is the seam the
//! session layer talks through, with [`HttpGenerationClient`] as the
//! production implementation.

use thiserror::Error;

mod client;
pub use client::*;
mod config;
pub use config::*;
mod types;
pub use types::*;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: the request never produced a usable
    /// response. Distinct from a backend-reported `{success: false}`.
    #[error("connection error: {0}")]
    Connection(String),
    /// The backend answered but the payload did not parse.
    #[error("invalid response payload: {0}")]
    InvalidPayload(String),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Connection(err.to_string())
    }
}
