//! Core record types for the Galaxy task service.

use crate::db::record::{Audit, text_enum};
use serde::{Deserialize, Serialize};

text_enum! {
    /// How a task is scheduled over time.
    TaskType {
        /// Recurring job with its own execution cycle.
        DelayJob => "DelayJob",
        /// One-shot queued task.
        DelayQueue => "DelayQueue",
    }
}

text_enum! {
    TaskStatus {
        Pending => "PENDING",
        Enabled => "ENABLED",
        Disabled => "DISABLED",
    }
}

text_enum! {
    /// Whether a run is scheduled on one node or fanned out.
    SchedulingCategory {
        Singleton => "SINGLETON",
        Multiple => "MULTIPLE",
    }
}

text_enum! {
    /// Transport used to fire the task.
    Executor {
        Kafka => "KAFKA",
        Rpc => "RPC",
        Http => "HTTP",
    }
}

text_enum! {
    /// Lifecycle of a single scheduling run.
    SchedulingStatus {
        New => "NEW",
        Runnable => "RUNNABLE",
        Running => "RUNNING",
        Finished => "FINISHED",
        Failed => "FAILED",
    }
}

impl SchedulingStatus {
    /// Allowed moves: NEW -> RUNNABLE -> RUNNING, RUNNING back to RUNNABLE,
    /// and RUNNING to one of the terminal states.
    pub fn can_transition_to(self, to: SchedulingStatus) -> bool {
        use SchedulingStatus::*;
        matches!(
            (self, to),
            (New, Runnable)
                | (Runnable, Running)
                | (Running, Runnable)
                | (Running, Finished)
                | (Running, Failed)
        )
    }
}

/// A scheduled task definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub expired_at: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cron: String,
    /// Execution timeout in seconds.
    #[serde(default)]
    pub timeout: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling_category: Option<SchedulingCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<Executor>,
    #[serde(flatten)]
    pub audit: Audit,
}

/// One run of a task through the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulingRecord {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub task_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SchedulingStatus>,
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub audit: Audit,
}

/// Opaque configuration payloads attached to a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub headers: serde_json::Value,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(flatten)]
    pub audit: Audit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_their_stored_names() {
        assert_eq!(TaskType::DelayJob.as_str(), "DelayJob");
        assert_eq!("ENABLED".parse::<TaskStatus>(), Ok(TaskStatus::Enabled));
        assert!("enabled".parse::<TaskStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&Executor::Kafka).unwrap(),
            "\"KAFKA\""
        );
    }

    #[test]
    fn scheduling_status_machine() {
        use SchedulingStatus::*;
        assert!(New.can_transition_to(Runnable));
        assert!(Runnable.can_transition_to(Running));
        assert!(Running.can_transition_to(Runnable));
        assert!(Running.can_transition_to(Finished));
        assert!(Running.can_transition_to(Failed));

        assert!(!New.can_transition_to(Running));
        assert!(!Finished.can_transition_to(Running));
        assert!(!Failed.can_transition_to(Runnable));
    }

    #[test]
    fn task_json_flattens_audit_fields() {
        let task: Task = serde_json::from_str(
            r#"{"name":"n","code":"c","type":"DelayQueue","status":"PENDING","created_at":5}"#,
        )
        .unwrap();
        assert_eq!(task.task_type, Some(TaskType::DelayQueue));
        assert_eq!(task.status, Some(TaskStatus::Pending));
        assert_eq!(task.audit.created_at, 5);

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["created_at"], 5);
        assert_eq!(value["deleted_at"], 0);
        assert!(value.get("created_by").is_none());
    }
}
