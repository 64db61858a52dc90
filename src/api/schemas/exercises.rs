use crate::domain::exercise::{AppendedEntry, LogLine, UserLog};
use crate::services::exercise_service::AppendRequest;
use serde::{Deserialize, Serialize};

/// A body field that may arrive as form text or as a JSON scalar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddExercise {
    pub user_id: Option<FieldValue>,
    pub description: Option<FieldValue>,
    pub duration: Option<FieldValue>,
    pub date: Option<FieldValue>,
}

impl From<AddExercise> for AppendRequest {
    fn from(payload: AddExercise) -> Self {
        Self {
            user_id: payload.user_id.map(FieldValue::into_text),
            description: payload.description.map(FieldValue::into_text),
            duration: payload.duration.map(FieldValue::into_text),
            date: payload.date.map(FieldValue::into_text),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogParams {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExerciseAdded {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub description: String,
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl From<AppendedEntry> for ExerciseAdded {
    fn from(entry: AppendedEntry) -> Self {
        Self {
            id: entry.user_id,
            username: entry.username,
            description: entry.description,
            duration: entry.duration,
            date: entry.date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExerciseLog {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub count: usize,
    pub log: Vec<LogItem>,
}

#[derive(Debug, Serialize)]
pub struct LogItem {
    pub description: String,
    pub duration: i64,
    pub date: String,
}

impl From<UserLog> for ExerciseLog {
    fn from(log: UserLog) -> Self {
        Self {
            id: log.user_id,
            username: log.username,
            count: log.count,
            log: log.log.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<LogLine> for LogItem {
    fn from(line: LogLine) -> Self {
        Self { description: line.description, duration: line.duration, date: line.date }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_scalars_become_text() {
        let payload: AddExercise = serde_json::from_value(json!({
            "userId": "abc123",
            "description": "run",
            "duration": 30,
            "date": null
        }))
        .unwrap();
        let request = AppendRequest::from(payload);

        assert_eq!(request.user_id.as_deref(), Some("abc123"));
        assert_eq!(request.duration.as_deref(), Some("30"));
        assert_eq!(request.date, None);
    }

    #[test]
    fn test_fractional_duration_keeps_its_fraction() {
        let payload: AddExercise = serde_json::from_value(json!({"duration": 12.5})).unwrap();
        assert_eq!(payload.duration, Some(FieldValue::Float(12.5)));
        assert_eq!(AppendRequest::from(payload).duration.as_deref(), Some("12.5"));
    }

    #[test]
    fn test_added_entry_omits_missing_date() {
        let body = ExerciseAdded {
            id: "abc".into(),
            username: "alice".into(),
            description: "run".into(),
            duration: 30,
            date: None,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"_id": "abc", "username": "alice", "description": "run", "duration": 30})
        );
    }
}
