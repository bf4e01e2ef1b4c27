//! REST API client module for the TaskFlow backend.
//!
//! This module provides the `ApiClient` for authenticated, timed, cached
//! HTTP calls: task CRUD plus the login/register/session/sign-out
//! endpoints. Failures are classified into the `ApiError` taxonomy and
//! mirrored to the injected notification surface.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ApiError, NetworkError};
