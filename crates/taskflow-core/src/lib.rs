//! Client core for the TaskFlow task manager.
//!
//! Two collaborating pieces: an [`ApiClient`] that performs authenticated,
//! timed, cached HTTP calls against the backend, and an [`AuthState`]
//! machine that owns the signed-in/signed-out lifecycle. Hosts inject a
//! [`Notifier`] (toast surface) and a [`Navigator`] (redirect surface) and
//! render whatever those report.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod notify;
pub mod retry;

pub use api::{ApiClient, ApiError, NetworkError};
pub use auth::{AuthState, AuthStatus, TokenStore};
pub use cache::ResponseCache;
pub use config::Config;
pub use notify::{LogNotifier, Navigator, Notifier, NullNavigator, Route};
