//! HTTP client for the andiamo backend.
//!
//! Every endpoint lives under `/api` on the configured base URL. Requests
//! carry the session token as a bearer credential when one is set.

mod client;
mod error;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
