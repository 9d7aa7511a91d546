//! Task operations exposed to the HTTP layer.
//!
//! Each function runs one persistence call and folds the outcome into the
//! API error taxonomy. Failures are logged here, once.

use crate::db::Database;
use crate::db::query::{Page, Pagination};
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::types::Task;
use tracing::{error, info};

fn failure(op: &str, err: anyhow::Error) -> ApiError {
    let detail = format!("{:#}", err);
    let api_err = ApiError::from(err);
    if api_err.code == ErrorCode::DbOperationAbnormal {
        error!(error = %detail, "occurred exception when {}", op);
    } else {
        info!(error = %detail, "rejected {}", op);
    }
    api_err
}

/// Insert a new task; the stored id and timestamps are written back.
pub fn create_task(db: &Database, task: &mut Task) -> ApiResult<()> {
    db.create_task(task)
        .map_err(|e| failure("inserting task", e))
}

/// Apply the set fields of `task` to the stored row.
pub fn update_task(db: &Database, task: &mut Task) -> ApiResult<()> {
    let changed = db
        .update_task(task)
        .map_err(|e| failure("updating task", e))?;
    if changed == 0 {
        return Err(ApiError::not_found());
    }
    Ok(())
}

/// Create when `task.id` is 0, otherwise partially update, and return
/// the stored row.
pub fn upsert_task(db: &Database, mut task: Task) -> ApiResult<Task> {
    if task.id == 0 {
        create_task(db, &mut task)?;
        return Ok(task);
    }
    update_task(db, &mut task)?;
    get_task(db, task.id)
}

/// Soft delete stamps `deleted_at`; otherwise the row is removed.
pub fn delete_task(db: &Database, id: u64, soft: bool) -> ApiResult<()> {
    let result = if soft {
        db.soft_delete_task(id)
    } else {
        db.delete_task(id)
    };
    let removed = result.map_err(|e| failure("deleting task", e))?;
    if removed == 0 {
        return Err(ApiError::not_found());
    }
    info!(id, soft, "deleted task");
    Ok(())
}

pub fn get_task(db: &Database, id: u64) -> ApiResult<Task> {
    match db.get_task(id) {
        Ok(Some(task)) => Ok(task),
        Ok(None) => Err(ApiError::not_found()),
        Err(e) => Err(failure("getting task", e)),
    }
}

pub fn get_tasks_with(db: &Database, pagination: &Pagination) -> ApiResult<Page<Task>> {
    db.paginate_tasks(pagination)
        .map_err(|e| failure("getting tasks", e))
}
