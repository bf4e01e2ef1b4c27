use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task as reported by the server.
///
/// The client transports tasks; it never derives state from them beyond
/// display. Timestamps are server-assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for task creation.
#[derive(Debug, Clone, Serialize)]
pub struct TaskCreate {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update body; omitted fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_from_server_json() {
        let json = r#"{
            "id": 4,
            "user_id": "5f0c4b2e",
            "title": "Water the plants",
            "description": null,
            "completed": false,
            "created_at": "2025-03-01T09:30:00Z",
            "updated_at": "2025-03-02T10:00:00Z"
        }"#;

        let task: Task = serde_json::from_str(json).expect("valid task JSON");
        assert_eq!(task.id, 4);
        assert_eq!(task.user_id, "5f0c4b2e");
        assert_eq!(task.description, None);
        assert!(!task.completed);
    }

    #[test]
    fn test_update_body_omits_unset_fields() {
        let update = TaskUpdate {
            completed: Some(true),
            ..Default::default()
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, serde_json::json!({"completed": true}));
    }

    #[test]
    fn test_create_body_without_description() {
        let create = TaskCreate {
            title: "Buy milk".to_string(),
            description: None,
        };
        let body = serde_json::to_value(&create).unwrap();
        assert_eq!(body, serde_json::json!({"title": "Buy milk"}));
    }
}
