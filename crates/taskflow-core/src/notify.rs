//! User-facing side effects: notifications (the toast surface) and
//! navigation (the redirect surface).
//!
//! The library never renders anything itself; hosts inject these seams and
//! decide how a "toast" or a route change materializes. The defaults route
//! notifications to the log and drop navigation on the floor, which is what
//! headless callers and most tests want.

use tracing::{error, info};

/// Sink for user-visible status messages.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default notifier: messages go to the log instead of a UI surface.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(message, "notification");
    }

    fn error(&self, message: &str) {
        error!(message, "notification");
    }
}

/// Destinations the client core can steer the host toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Login surface, forced on authentication rejection.
    Login,
    /// The task board, entered after login/signup.
    Tasks,
    /// Public landing surface, entered after logout.
    Landing,
}

/// Redirect sink. Implementations must tolerate being called from any task.
pub trait Navigator: Send + Sync {
    fn go(&self, route: Route);
}

/// Navigator for hosts without a routing surface.
#[derive(Debug, Default)]
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn go(&self, _route: Route) {}
}
