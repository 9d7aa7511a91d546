//! Scheduling record persistence and status transitions.

use super::{Database, now_ns};
use super::query::{Condition, FilterValue, Page, Pagination, QueryError};
use super::record::{AUDIT_COLUMNS, Audit, ColumnKind, Record, enum_text, uint};
use crate::types::{SchedulingRecord, SchedulingStatus};
use anyhow::{Result, anyhow};
use rusqlite::{OptionalExtension, Row, params};
use rusqlite::types::Value;
use serde_json::Map;
use tracing::debug;

impl Record for SchedulingRecord {
    const TABLE: &'static str = "scheduling_records";
    const COLUMNS: &'static [&'static str] = &[
        "task_id",
        "status",
        "message",
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
            "task_id" => ColumnKind::UInt,
            "status" => ColumnKind::Enum(SchedulingStatus::is_known),
            other => Audit::column_kind(other).unwrap_or(ColumnKind::Text),
        }
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn values(&self) -> Result<Vec<Value>, QueryError> {
        let mut values = vec![
            uint(self.task_id)?,
            enum_text(self.status.map(|s| s.as_str())),
            Value::Text(self.message.clone()),
        ];
        values.extend(self.audit.values()?);
        Ok(values)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(SchedulingRecord {
            id: row.get("id")?,
            task_id: row.get("task_id")?,
            status: row.get("status")?,
            message: row.get("message")?,
            audit: Audit::from_row(row)?,
        })
    }
}

impl Database {
    /// Insert a scheduling record. A record without a status starts as NEW.
    pub fn create_scheduling_record(&self, record: &mut SchedulingRecord) -> Result<()> {
        if record.status.is_none() {
            record.status = Some(SchedulingStatus::New);
        }
        self.insert(record)
    }

    pub fn save_scheduling_record(&self, record: &mut SchedulingRecord) -> Result<()> {
        self.save(record)
    }

    pub fn update_scheduling_record(&self, record: &mut SchedulingRecord) -> Result<usize> {
        self.update_non_zero(record)
    }

    pub fn update_scheduling_record_fields(
        &self,
        id: u64,
        changes: &Map<String, serde_json::Value>,
    ) -> Result<usize> {
        self.update_columns::<SchedulingRecord>(id, changes)
    }

    pub fn delete_scheduling_record(&self, id: u64) -> Result<usize> {
        self.delete_by_id::<SchedulingRecord>(id)
    }

    pub fn soft_delete_scheduling_record(&self, id: u64) -> Result<usize> {
        self.soft_delete_by_id::<SchedulingRecord>(id)
    }

    pub fn get_scheduling_record(&self, id: u64) -> Result<Option<SchedulingRecord>> {
        self.find_by_id(id, false)
    }

    pub fn get_scheduling_record_exclude_deleted(
        &self,
        id: u64,
    ) -> Result<Option<SchedulingRecord>> {
        self.find_by_id(id, true)
    }

    pub fn paginate_scheduling_records(
        &self,
        pagination: &Pagination,
    ) -> Result<Page<SchedulingRecord>> {
        self.paginate(pagination)
    }

    /// Live records of one task, oldest first.
    pub fn list_scheduling_records(&self, task_id: u64) -> Result<Vec<SchedulingRecord>> {
        let condition = Pagination::new()
            .with("task_id", FilterValue::eq(task_id))
            .with(super::query::EXCLUDE_DELETED_KEY, true)
            .build_condition()?;
        self.find_where(&condition)
    }

    /// Move a record to `to`, rejecting moves outside the status machine.
    ///
    /// A non-empty `message` replaces the stored one. The status is read
    /// and written under one lock, and the write only applies while the
    /// row still holds the status that was checked.
    pub fn transition_scheduling_record(
        &self,
        id: u64,
        to: SchedulingStatus,
        message: Option<&str>,
    ) -> Result<SchedulingRecord> {
        let id_value = uint(id)?;
        let now = uint(now_ns())?;
        let message = message.filter(|m| !m.is_empty());

        let from = self.with_conn(|conn| {
            let current: Option<SchedulingStatus> = conn
                .query_row(
                    "SELECT status FROM scheduling_records WHERE id = ?1 AND deleted_at = 0",
                    params![id_value],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| anyhow!("scheduling record {} not found", id))?;

            let from = current.unwrap_or(SchedulingStatus::New);
            let rejected = || QueryError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            };
            if !from.can_transition_to(to) {
                return Err(rejected().into());
            }

            let changed = conn.execute(
                "UPDATE scheduling_records
                 SET status = ?1, message = COALESCE(?2, message), updated_at = ?3
                 WHERE id = ?4 AND status IS ?5 AND deleted_at = 0",
                params![to.as_str(), message, now, id_value, current.map(|s| s.as_str())],
            )?;
            if changed == 0 {
                return Err(rejected().into());
            }
            Ok(from)
        })?;
        debug!(id, from = %from, to = %to, "scheduling record transitioned");

        self.get_scheduling_record(id)?
            .ok_or_else(|| anyhow!("scheduling record {} not found", id))
    }

    /// Records of any task matching `condition`.
    pub fn find_scheduling_records(&self, condition: &Condition) -> Result<Vec<SchedulingRecord>> {
        self.find_where(condition)
    }
}
