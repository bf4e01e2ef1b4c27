//! Shared test doubles for the integration suites.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use taskflow_core::notify::{Navigator, Notifier, Route};
use taskflow_core::{ApiClient, TokenStore};

/// Captured notification, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toast {
    Success(String),
    Error(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|t| match t {
                Toast::Success(m) => Some(m),
                Toast::Error(_) => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|t| match t {
                Toast::Error(m) => Some(m),
                Toast::Success(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.toasts.lock().unwrap().push(Toast::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.toasts.lock().unwrap().push(Toast::Error(message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn go(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

/// A client wired to recording sinks and an in-memory token store.
pub struct Harness {
    pub api: ApiClient,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn harness(base_url: &str) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let api = ApiClient::new(base_url, TokenStore::in_memory())
        .expect("client construction")
        .with_notifier(notifier.clone())
        .with_navigator(navigator.clone());

    Harness {
        api,
        notifier,
        navigator,
    }
}

/// Server-shaped task JSON.
pub fn task_json(id: i64, user_id: &str, title: &str, completed: bool) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "title": title,
        "description": null,
        "completed": completed,
        "created_at": "2025-03-01T09:30:00Z",
        "updated_at": "2025-03-01T09:30:00Z"
    })
}
