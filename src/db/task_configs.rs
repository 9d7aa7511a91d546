//! Task configuration payloads: two JSON documents per row.

use super::Database;
use super::query::{Condition, JsonPathQuery, Page, Pagination, QueryError};
use super::record::{AUDIT_COLUMNS, Audit, ColumnKind, Record, get_json, json_text};
use crate::types::TaskConfig;
use anyhow::Result;
use rusqlite::Row;
use rusqlite::types::Value;
use serde_json::Map;

impl Record for TaskConfig {
    const TABLE: &'static str = "task_config";
    const COLUMNS: &'static [&'static str] = &[
        "headers",
        "content",
        AUDIT_COLUMNS[0],
        AUDIT_COLUMNS[1],
        AUDIT_COLUMNS[2],
        AUDIT_COLUMNS[3],
        AUDIT_COLUMNS[4],
    ];
    const JSON_COLUMNS: &'static [&'static str] = &["headers", "content"];

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn column_kind(column: &str) -> ColumnKind {
        match column {
            "headers" | "content" => ColumnKind::Json,
            other => Audit::column_kind(other).unwrap_or(ColumnKind::Text),
        }
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn values(&self) -> Result<Vec<Value>, QueryError> {
        let mut values = vec![json_text(&self.headers), json_text(&self.content)];
        values.extend(self.audit.values()?);
        Ok(values)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(TaskConfig {
            id: row.get("id")?,
            headers: get_json(row, "headers")?,
            content: get_json(row, "content")?,
            audit: Audit::from_row(row)?,
        })
    }
}

impl Database {
    pub fn create_task_config(&self, config: &mut TaskConfig) -> Result<()> {
        self.insert(config)
    }

    pub fn save_task_config(&self, config: &mut TaskConfig) -> Result<()> {
        self.save(config)
    }

    /// Partial update; a `null` document counts as unset and is skipped.
    pub fn update_task_config(&self, config: &mut TaskConfig) -> Result<usize> {
        self.update_non_zero(config)
    }

    pub fn update_task_config_fields(
        &self,
        id: u64,
        changes: &Map<String, serde_json::Value>,
    ) -> Result<usize> {
        self.update_columns::<TaskConfig>(id, changes)
    }

    pub fn delete_task_config(&self, id: u64) -> Result<usize> {
        self.delete_by_id::<TaskConfig>(id)
    }

    pub fn soft_delete_task_config(&self, id: u64) -> Result<usize> {
        self.soft_delete_by_id::<TaskConfig>(id)
    }

    pub fn get_task_config(&self, id: u64) -> Result<Option<TaskConfig>> {
        self.find_by_id(id, false)
    }

    pub fn get_task_config_exclude_deleted(&self, id: u64) -> Result<Option<TaskConfig>> {
        self.find_by_id(id, true)
    }

    pub fn paginate_task_configs(&self, pagination: &Pagination) -> Result<Page<TaskConfig>> {
        self.paginate(pagination)
    }

    /// Configs whose JSON document matches `query`, across all time.
    pub fn query_task_configs(&self, query: JsonPathQuery) -> Result<Vec<TaskConfig>> {
        let mut condition = Condition::default();
        condition.add_json_queries([query]);
        self.find_where(&condition)
    }
}
