//! Shared types for the café server
//!
//! Domain models, the unified error type and API response envelope, and
//! small utilities used by both the server and its tests.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResponse, AppResult};
