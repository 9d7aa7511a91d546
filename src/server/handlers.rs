//! Task endpoint handlers.
//!
//! Path and query parameters are validated here, before any database
//! access; everything else is delegated to [`crate::service`].

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};

use super::http::AppState;
use crate::db::now_ns;
use crate::db::query::{
    EXCLUDE_DELETED_KEY, FilterValue, Page, Pagination, Range, TIME_RANGE_KEY,
};
use crate::error::{ApiError, ApiResult, Envelope};
use crate::service;
use crate::types::{Task, TaskStatus};

/// Query string of `GET /v1/task`.
///
/// `f`/`t` are non-negative 32-bit row offsets converted into a page
/// window; `st`/`et` bound `created_at` in nanoseconds. Unparsable numbers
/// fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub f: Option<String>,
    pub t: Option<String>,
    pub st: Option<String>,
    pub et: Option<String>,
    pub code: Option<String>,
    /// Comma-separated task statuses.
    pub status: Option<String>,
    pub include_deleted: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    pub hard: Option<bool>,
}

fn parse_id(raw: &str) -> ApiResult<u64> {
    match raw.parse::<u64>() {
        Ok(0) | Err(_) => Err(ApiError::bad_request(format!("{} invalid.", raw))),
        Ok(id) => Ok(id),
    }
}

/// Row offset from `f`/`t`: a 32-bit integer, 0 when absent or unparsable.
fn offset_or_zero(name: &str, raw: Option<&str>) -> ApiResult<i64> {
    let offset = raw
        .and_then(|s| s.parse::<i32>().ok())
        .map(i64::from)
        .unwrap_or(0);
    if offset < 0 {
        return Err(ApiError::bad_request(format!(
            "pagination {} {} is negative",
            name, offset
        )));
    }
    Ok(offset)
}

fn uint_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn is_truthy(raw: Option<&str>) -> bool {
    matches!(raw, Some("true" | "1"))
}

/// Translate list query parameters into a [`Pagination`].
pub(crate) fn pagination_from(params: &ListParams) -> ApiResult<Pagination> {
    let from = offset_or_zero("from", params.f.as_deref())?;
    let to = offset_or_zero("to", params.t.as_deref())?;
    if from > to {
        return Err(ApiError::bad_request(format!(
            "pagination from {} more than to {}",
            from, to
        )));
    }

    let mut pagination = Pagination::new();
    if to > from {
        let size = to - from;
        pagination.set_page(from / size + 1);
        pagination.set_page_size(size);
    }

    let start = uint_or(params.st.as_deref(), 0);
    let end = uint_or(params.et.as_deref(), now_ns());
    if start > end {
        return Err(ApiError::bad_request(format!(
            "pagination start time {} more than end time {}",
            start, end
        )));
    }
    pagination = pagination.with(TIME_RANGE_KEY, Range::new(start, end)?);

    if let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) {
        pagination = pagination.with("code", code);
    }
    if let Some(status) = params.status.as_deref().filter(|s| !s.is_empty()) {
        let statuses = status
            .split(',')
            .map(|s| s.trim().parse::<TaskStatus>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApiError::bad_request)?;
        pagination = pagination.with(
            "status",
            FilterValue::any_of(statuses.iter().map(|s| s.as_str())),
        );
    }

    let include_deleted = is_truthy(params.include_deleted.as_deref());
    Ok(pagination.with(EXCLUDE_DELETED_KEY, !include_deleted))
}

pub async fn about(State(state): State<AppState>) -> Envelope<Value> {
    let info = state.info();
    Envelope::ok(json!({
        "app": info.app,
        "version": info.version,
        "node_id": info.node_id,
        "started_at": info.started_at,
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn health(State(state): State<AppState>) -> ApiResult<Envelope<Value>> {
    state.db().ping().map_err(|e| {
        error!("Health check failed: {:#}", e);
        ApiError::database()
    })?;
    let schema_version = state.db().schema_version().ok().flatten();
    Ok(Envelope::ok(json!({
        "status": "healthy",
        "schema_version": schema_version,
    })))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Task>> {
    let id = parse_id(&id)?;
    Ok(Envelope::ok(service::get_task(state.db(), id)?))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Envelope<Page<Task>>> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let pagination = pagination_from(&params)?;
    Ok(Envelope::ok(service::get_tasks_with(state.db(), &pagination)?))
}

pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<Task>, JsonRejection>,
) -> ApiResult<Envelope<Task>> {
    let Json(mut task) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    service::create_task(state.db(), &mut task)?;
    info!(id = task.id, code = %task.code, "inserted a task");
    Ok(Envelope::ok(task))
}

pub async fn upsert_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Task>, JsonRejection>,
) -> ApiResult<Envelope<Task>> {
    let id = parse_id(&id)?;
    let Json(mut task) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    task.id = id;
    Ok(Envelope::ok(service::upsert_task(state.db(), task)?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> ApiResult<Envelope<u64>> {
    let id = parse_id(&id)?;
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let soft = !params.hard.unwrap_or(false);
    service::delete_task(state.db(), id, soft)?;
    Ok(Envelope::ok(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut p = ListParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "f" => p.f = v,
                "t" => p.t = v,
                "st" => p.st = v,
                "et" => p.et = v,
                "code" => p.code = v,
                "status" => p.status = v,
                "include_deleted" => p.include_deleted = v,
                _ => unreachable!(),
            }
        }
        p
    }

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        for bad in ["0", "abc", "-3", ""] {
            assert_eq!(parse_id(bad).unwrap_err().code, ErrorCode::BadRequest);
        }
    }

    #[test]
    fn offsets_become_a_page_window() {
        let p = pagination_from(&params(&[("f", "20"), ("t", "30")])).unwrap();
        assert_eq!(p.page(), 3);
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn equal_offsets_use_default_paging() {
        let p = pagination_from(&params(&[])).unwrap();
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
        let c = p.build_condition().unwrap();
        assert!(c.is_exclude_deleted());
        assert_eq!(c.from(), 0);
        assert!(c.to() > 0);
    }

    #[test]
    fn inverted_windows_are_rejected() {
        let err = pagination_from(&params(&[("f", "10"), ("t", "5")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);

        let err = pagination_from(&params(&[("st", "10"), ("et", "5")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);
    }

    #[test]
    fn extreme_offsets_do_not_overflow() {
        let err = pagination_from(&params(&[("f", "-2147483648"), ("t", "2147483647")]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);

        let err = pagination_from(&params(&[("f", "-5"), ("t", "5")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);

        // beyond 32 bits the values are unparsable and fall back to 0
        let p = pagination_from(&params(&[
            ("f", "-9223372036854775808"),
            ("t", "9223372036854775807"),
        ]))
        .unwrap();
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);

        let p = pagination_from(&params(&[("f", "0"), ("t", "2147483647")])).unwrap();
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 100);
    }

    #[test]
    fn filters_are_attached() {
        let p = pagination_from(&params(&[
            ("code", "code5"),
            ("status", "ENABLED, PENDING"),
            ("include_deleted", "true"),
            ("st", "5"),
            ("et", "50"),
        ]))
        .unwrap();
        let c = p.build_condition().unwrap();
        assert!(!c.is_exclude_deleted());
        assert_eq!(c.time_range().resolve(), (5, 50));
        assert_eq!(c.get_attachment("code"), Some(&FilterValue::eq("code5")));
        assert_eq!(
            c.get_attachment("status"),
            Some(&FilterValue::any_of(["ENABLED", "PENDING"]))
        );

        let err = pagination_from(&params(&[("status", "SLEEPING")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);
    }
}
