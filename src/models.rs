// Data models for tasklist

use crate::record::{IndexValue, Record};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest id a task may carry; ids stay representable as `i64` for filtering
pub const MAX_TASK_ID: u64 = i64::MAX as u64;

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
}

impl Task {
    pub fn new(id: u64, title: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
            priority,
        }
    }
}

impl Record for Task {
    fn id(&self) -> u64 {
        self.id
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        let id = i64::try_from(self.id).map_or_else(|_| IndexValue::String(self.id.to_string()), IndexValue::Int);
        fields.insert("id".to_string(), id);
        fields.insert("title".to_string(), IndexValue::String(self.title.clone()));
        fields.insert("completed".to_string(), IndexValue::Bool(self.completed));
        fields.insert("priority".to_string(), IndexValue::String(self.priority.to_string()));
        fields
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid priority {0:?} (expected High, Medium or Low)")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    /// Accepts the bare name in any case. Anything after the first run of
    /// whitespace is ignored, so decorated labels like `High 🔴` still parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.split_whitespace().next().unwrap_or_default();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParsePriorityError(s.to_string()))
    }
}

// Same rules as `FromStr` so config files accept `high` like the CLI does
impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new(1, "Buy milk", Priority::Medium);
        assert_eq!(task.id, 1);
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!("MEDIUM".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("  Low  ".parse::<Priority>().unwrap(), Priority::Low);
    }

    #[test]
    fn test_priority_from_decorated_label() {
        assert_eq!("High 🔴".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("Medium 🟠".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("Low 🟢".parse::<Priority>().unwrap(), Priority::Low);
    }

    #[test]
    fn test_priority_from_str_rejects_unknown() {
        assert!("Urgent".parse::<Priority>().is_err());
        assert!("".parse::<Priority>().is_err());
        assert!("Highest".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_serialization() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"High\"");
    }

    #[test]
    fn test_priority_deserialization_ignores_case() {
        let low: Priority = serde_json::from_str("\"low\"").unwrap();
        let high: Priority = serde_json::from_str("\"High\"").unwrap();
        assert_eq!(low, Priority::Low);
        assert_eq!(high, Priority::High);
        assert!(serde_json::from_str::<Priority>("\"urgent\"").is_err());
    }

    #[test]
    fn test_task_json_roundtrip() {
        let task = Task::new(3, "Call mom", Priority::High);
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(serde_json::from_str::<Task>(&json).unwrap(), task);
    }

    #[test]
    fn test_indexed_id_beyond_i64_stays_positive() {
        let task = Task::new(u64::MAX, "huge", Priority::Low);
        assert_eq!(
            task.indexed_fields().get("id"),
            Some(&IndexValue::String(u64::MAX.to_string()))
        );
        let task = Task::new(MAX_TASK_ID, "largest", Priority::Low);
        assert_eq!(task.indexed_fields().get("id"), Some(&IndexValue::Int(i64::MAX)));
    }

    #[test]
    fn test_task_indexed_fields() {
        let task = Task::new(4, "Call mom", Priority::High);
        let fields = task.indexed_fields();

        assert_eq!(task.id(), 4);
        assert_eq!(fields.get("id"), Some(&IndexValue::Int(4)));
        assert_eq!(fields.get("title"), Some(&IndexValue::String("Call mom".to_string())));
        assert_eq!(fields.get("completed"), Some(&IndexValue::Bool(false)));
        assert_eq!(fields.get("priority"), Some(&IndexValue::String("High".to_string())));
    }
}
