//! Task CRUD and paginated listing.

use super::Database;
use super::query::{Page, Pagination, QueryError};
use super::record::{AUDIT_COLUMNS, Audit, ColumnKind, Record, enum_text, uint};
use crate::types::{Executor, SchedulingCategory, Task, TaskStatus, TaskType};
use anyhow::Result;
use rusqlite::Row;
use rusqlite::types::Value;
use serde_json::Map;

impl Record for Task {
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "code",
        "type",
        "status",
        "expired_at",
        "cron",
        "timeout",
        "scheduling_category",
        "executor",
        AUDIT_COLUMNS[0],
        AUDIT_COLUMNS[1],
        AUDIT_COLUMNS[2],
        AUDIT_COLUMNS[3],
        AUDIT_COLUMNS[4],
    ];

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn column_kind(column: &str) -> ColumnKind {
        match column {
            "type" => ColumnKind::Enum(TaskType::is_known),
            "status" => ColumnKind::Enum(TaskStatus::is_known),
            "scheduling_category" => ColumnKind::Enum(SchedulingCategory::is_known),
            "executor" => ColumnKind::Enum(Executor::is_known),
            "expired_at" => ColumnKind::UInt,
            "timeout" => ColumnKind::Int,
            other => Audit::column_kind(other).unwrap_or(ColumnKind::Text),
        }
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn values(&self) -> Result<Vec<Value>, QueryError> {
        let mut values = vec![
            Value::Text(self.name.clone()),
            Value::Text(self.code.clone()),
            enum_text(self.task_type.map(|t| t.as_str())),
            enum_text(self.status.map(|s| s.as_str())),
            uint(self.expired_at)?,
            Value::Text(self.cron.clone()),
            Value::Integer(self.timeout),
            enum_text(self.scheduling_category.map(|c| c.as_str())),
            enum_text(self.executor.map(|e| e.as_str())),
        ];
        values.extend(self.audit.values()?);
        Ok(values)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Task {
            id: row.get("id")?,
            name: row.get("name")?,
            code: row.get("code")?,
            task_type: row.get("type")?,
            status: row.get("status")?,
            expired_at: row.get("expired_at")?,
            cron: row.get("cron")?,
            timeout: row.get("timeout")?,
            scheduling_category: row.get("scheduling_category")?,
            executor: row.get("executor")?,
            audit: Audit::from_row(row)?,
        })
    }
}

impl Database {
    /// Insert a task; `id` and timestamps are filled in on the passed value.
    pub fn create_task(&self, task: &mut Task) -> Result<()> {
        self.insert(task)
    }

    /// Overwrite every column of the task, zero values included.
    pub fn save_task(&self, task: &mut Task) -> Result<()> {
        self.save(task)
    }

    /// Update only the fields of `task` that are set. Returns rows changed.
    pub fn update_task(&self, task: &mut Task) -> Result<usize> {
        self.update_non_zero(task)
    }

    /// Update exactly the given columns, including zero values.
    pub fn update_task_fields(
        &self,
        id: u64,
        changes: &Map<String, serde_json::Value>,
    ) -> Result<usize> {
        self.update_columns::<Task>(id, changes)
    }

    /// Permanently remove a task.
    pub fn delete_task(&self, id: u64) -> Result<usize> {
        self.delete_by_id::<Task>(id)
    }

    /// Mark a task deleted, keeping the row.
    pub fn soft_delete_task(&self, id: u64) -> Result<usize> {
        self.soft_delete_by_id::<Task>(id)
    }

    pub fn get_task(&self, id: u64) -> Result<Option<Task>> {
        self.find_by_id(id, false)
    }

    /// Get a task unless it has been soft-deleted.
    pub fn get_task_exclude_deleted(&self, id: u64) -> Result<Option<Task>> {
        self.find_by_id(id, true)
    }

    pub fn paginate_tasks(&self, pagination: &Pagination) -> Result<Page<Task>> {
        self.paginate(pagination)
    }
}
