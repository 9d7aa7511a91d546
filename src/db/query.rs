//! Filter conditions and pagination for record queries.
//!
//! A [`Pagination`] carries the page window plus a loosely-keyed
//! [`Attachment`] of filters. [`Pagination::build_condition`] splits the
//! reserved keys out into a [`Condition`], which renders into a
//! parameterized SQL `WHERE` clause for the executor in `db::record`.

use super::now_ns;
use rusqlite::types::Value;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Default page number.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when none (or a non-positive one) is given.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Upper bound applied to the page size at query time.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Attachment key holding the `created_at` time range.
pub const TIME_RANGE_KEY: &str = "timeRange";
/// Attachment key holding the soft-delete exclusion flag.
pub const EXCLUDE_DELETED_KEY: &str = "excludeDeleted";

/// Validation errors raised while building or rendering a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("range left {left} should not be greater than right {right}")]
    InvertedRange { left: u64, right: u64 },

    #[error("json query {what} must be a non-empty key without quotes")]
    InvalidJsonSegment { what: &'static str },

    #[error("json query supports one or two path levels, got {0}")]
    UnsupportedJsonDepth(usize),

    #[error("reserved key '{key}' expects {expected}")]
    ReservedKeyType { key: &'static str, expected: &'static str },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' is not a json column")]
    NotJsonColumn(String),

    #[error("column '{0}' cannot be updated")]
    ImmutableColumn(String),

    #[error("column '{column}' expects {expected}")]
    InvalidColumnValue {
        column: String,
        expected: &'static str,
    },

    #[error("integer {0} does not fit in a database integer")]
    IntegerOverflow(u64),

    #[error("record id is required")]
    MissingId,

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

/// Inclusive `[left, right]` interval of unsigned values.
///
/// A zero `right` bound means "open-ended": [`Range::right`] resolves it to
/// the current nanosecond timestamp every time it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    left: u64,
    right: u64,
}

impl Range {
    /// Build a range, rejecting `left > right`.
    pub fn new(left: u64, right: u64) -> Result<Self, QueryError> {
        if left > right {
            return Err(QueryError::InvertedRange { left, right });
        }
        Ok(Self { left, right })
    }

    /// Range starting at zero whose upper bound stays unresolved.
    pub fn unbounded() -> Self {
        Self { left: 0, right: 0 }
    }

    pub fn left(&self) -> u64 {
        self.left
    }

    /// Upper bound, or "now" when unset. Two reads of an unset bound may differ.
    pub fn right(&self) -> u64 {
        if self.right == 0 { now_ns() } else { self.right }
    }

    /// Resolve both bounds once.
    pub fn resolve(&self) -> (u64, u64) {
        (self.left(), self.right())
    }
}

impl Default for Range {
    /// `[0, now]`, with "now" fixed at construction time.
    fn default() -> Self {
        Self {
            left: 0,
            right: now_ns(),
        }
    }
}

/// A single comparable value bound into a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Scalar {
    fn to_sql_value(&self) -> Result<Value, QueryError> {
        Ok(match self {
            Scalar::Text(s) => Value::Text(s.clone()),
            Scalar::Bool(b) => Value::Integer(i64::from(*b)),
            Scalar::Int(i) => Value::Integer(*i),
            Scalar::UInt(u) => Value::Integer(checked_i64(*u)?),
            Scalar::Float(f) => Value::Real(*f),
        })
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(i64::from(v))
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::UInt(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

/// Key path inside a JSON column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonPath {
    One(String),
    Two(String, String),
}

impl JsonPath {
    /// SQLite JSON path expression, e.g. `$."info"."age"`.
    fn expression(&self) -> String {
        match self {
            JsonPath::One(k) => format!("$.\"{}\"", k),
            JsonPath::Two(k1, k2) => format!("$.\"{}\".\"{}\"", k1, k2),
        }
    }
}

/// Equality test against a value nested one or two levels inside a JSON column.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPathQuery {
    field: String,
    path: JsonPath,
    value: Scalar,
}

impl JsonPathQuery {
    /// `field.key1 == value`.
    pub fn level1(
        field: impl Into<String>,
        key1: impl Into<String>,
        value: impl Into<Scalar>,
    ) -> Result<Self, QueryError> {
        let field = checked_segment(field.into(), "field")?;
        let key1 = checked_segment(key1.into(), "key1")?;
        Ok(Self {
            field,
            path: JsonPath::One(key1),
            value: value.into(),
        })
    }

    /// `field.key1.key2 == value`.
    pub fn level2(
        field: impl Into<String>,
        key1: impl Into<String>,
        key2: impl Into<String>,
        value: impl Into<Scalar>,
    ) -> Result<Self, QueryError> {
        let field = checked_segment(field.into(), "field")?;
        let key1 = checked_segment(key1.into(), "key1")?;
        let key2 = checked_segment(key2.into(), "key2")?;
        Ok(Self {
            field,
            path: JsonPath::Two(key1, key2),
            value: value.into(),
        })
    }

    /// Build from a list of path segments; only depths 1 and 2 are supported.
    pub fn from_segments(
        field: impl Into<String>,
        segments: &[&str],
        value: impl Into<Scalar>,
    ) -> Result<Self, QueryError> {
        match segments {
            [k1] => Self::level1(field, *k1, value),
            [k1, k2] => Self::level2(field, *k1, *k2, value),
            other => Err(QueryError::UnsupportedJsonDepth(other.len())),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// Number of key levels below the column.
    pub fn level(&self) -> usize {
        match self.path {
            JsonPath::One(_) => 1,
            JsonPath::Two(_, _) => 2,
        }
    }

    pub fn value(&self) -> &Scalar {
        &self.value
    }
}

fn checked_segment(s: String, what: &'static str) -> Result<String, QueryError> {
    if s.is_empty() || s.contains('"') {
        return Err(QueryError::InvalidJsonSegment { what });
    }
    Ok(s)
}

fn checked_i64(v: u64) -> Result<i64, QueryError> {
    i64::try_from(v).map_err(|_| QueryError::IntegerOverflow(v))
}

/// Value side of an attachment entry. The variant picks the predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// `column = value`
    Scalar(Scalar),
    /// `column IN (values)`
    Collection(Vec<Scalar>),
    /// `column BETWEEN left AND right`
    Range(Range),
    /// Nested JSON equality; the attachment key is only a label.
    Json(JsonPathQuery),
}

impl FilterValue {
    pub fn eq(v: impl Into<Scalar>) -> Self {
        FilterValue::Scalar(v.into())
    }

    pub fn any_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        FilterValue::Collection(values.into_iter().map(Into::into).collect())
    }

    pub fn between(range: Range) -> Self {
        FilterValue::Range(range)
    }
}

macro_rules! scalar_filter_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(v: $t) -> Self {
                    FilterValue::Scalar(v.into())
                }
            }
        )*
    };
}

scalar_filter_from!(&str, String, bool, i32, i64, u64, f64);

impl From<Scalar> for FilterValue {
    fn from(v: Scalar) -> Self {
        FilterValue::Scalar(v)
    }
}

impl From<Range> for FilterValue {
    fn from(r: Range) -> Self {
        FilterValue::Range(r)
    }
}

impl From<JsonPathQuery> for FilterValue {
    fn from(q: JsonPathQuery) -> Self {
        FilterValue::Json(q)
    }
}

/// Filters keyed by column name. Ordered so rendered SQL is stable.
pub type Attachment = BTreeMap<String, FilterValue>;

/// A rendered `WHERE` clause with its positional parameters.
#[derive(Debug, Clone)]
pub struct WhereClause {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Resolved query limits, produced by [`Pagination::build_condition`].
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    time_range: Range,
    exclude_deleted: bool,
    attachment: Attachment,
    json_queries: Vec<JsonPathQuery>,
}

impl Condition {
    pub fn time_range(&self) -> &Range {
        &self.time_range
    }

    pub fn from(&self) -> u64 {
        self.time_range.left()
    }

    pub fn to(&self) -> u64 {
        self.time_range.right()
    }

    pub fn is_exclude_deleted(&self) -> bool {
        self.exclude_deleted
    }

    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    pub fn get_attachment(&self, key: &str) -> Option<&FilterValue> {
        self.attachment.get(key)
    }

    pub fn json_queries(&self) -> &[JsonPathQuery] {
        &self.json_queries
    }

    pub fn add_json_queries(&mut self, queries: impl IntoIterator<Item = JsonPathQuery>) {
        self.json_queries.extend(queries);
    }

    /// Render as `WHERE ...` against a table with the given columns.
    ///
    /// `columns` are the filterable column names; `json_columns` the subset
    /// that may be the target of a JSON path query. The time range is
    /// resolved once here, so an open upper bound is stable for the
    /// count and page queries sharing this clause.
    pub fn to_where(
        &self,
        columns: &[&str],
        json_columns: &[&str],
    ) -> Result<WhereClause, QueryError> {
        let (from, to) = self.time_range.resolve();
        let mut clauses = vec!["created_at BETWEEN ? AND ?".to_string()];
        let mut params = vec![
            Value::Integer(checked_i64(from)?),
            Value::Integer(checked_i64(to)?),
        ];

        if self.exclude_deleted {
            clauses.push("deleted_at = 0".to_string());
        }

        for (key, value) in &self.attachment {
            match value {
                FilterValue::Scalar(v) => {
                    check_column(key, columns)?;
                    clauses.push(format!("{} = ?", key));
                    params.push(v.to_sql_value()?);
                }
                FilterValue::Collection(values) if values.is_empty() => {
                    check_column(key, columns)?;
                    // IN () matches nothing
                    clauses.push("1 = 0".to_string());
                }
                FilterValue::Collection(values) => {
                    check_column(key, columns)?;
                    let marks = vec!["?"; values.len()].join(", ");
                    clauses.push(format!("{} IN ({})", key, marks));
                    for v in values {
                        params.push(v.to_sql_value()?);
                    }
                }
                FilterValue::Range(r) => {
                    check_column(key, columns)?;
                    let (left, right) = r.resolve();
                    clauses.push(format!("{} BETWEEN ? AND ?", key));
                    params.push(Value::Integer(checked_i64(left)?));
                    params.push(Value::Integer(checked_i64(right)?));
                }
                FilterValue::Json(q) => push_json(q, json_columns, &mut clauses, &mut params)?,
            }
        }

        for q in &self.json_queries {
            push_json(q, json_columns, &mut clauses, &mut params)?;
        }

        Ok(WhereClause {
            sql: format!("WHERE {}", clauses.join(" AND ")),
            params,
        })
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self {
            time_range: Range::unbounded(),
            exclude_deleted: false,
            attachment: Attachment::new(),
            json_queries: Vec::new(),
        }
    }
}

fn check_column(key: &str, columns: &[&str]) -> Result<(), QueryError> {
    if key == "id" || columns.contains(&key) {
        Ok(())
    } else {
        Err(QueryError::UnknownColumn(key.to_string()))
    }
}

fn push_json(
    q: &JsonPathQuery,
    json_columns: &[&str],
    clauses: &mut Vec<String>,
    params: &mut Vec<Value>,
) -> Result<(), QueryError> {
    if !json_columns.contains(&q.field()) {
        return Err(QueryError::NotJsonColumn(q.field().to_string()));
    }
    clauses.push(format!("json_extract({}, ?) = ?", q.field()));
    params.push(Value::Text(q.path().expression()));
    params.push(q.value().to_sql_value()?);
    Ok(())
}

/// Page window plus the raw filter attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    page: u64,
    page_size: u64,
    attachment: Attachment,
}

impl Pagination {
    pub fn new() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            attachment: Attachment::new(),
        }
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.set_page(page);
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.set_page_size(page_size);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = attachment;
        self
    }

    /// Add one filter entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.attachment.insert(key.into(), value.into());
        self
    }

    /// Clamp to a minimum of 1.
    pub fn set_page(&mut self, page: i64) {
        self.page = u64::try_from(page).unwrap_or(0).max(DEFAULT_PAGE);
    }

    /// Non-positive sizes reset to the default. Oversized values are kept
    /// here and clamped by [`Pagination::limit`].
    pub fn set_page_size(&mut self, page_size: i64) {
        self.page_size = match u64::try_from(page_size) {
            Ok(0) | Err(_) => DEFAULT_PAGE_SIZE,
            Ok(n) => n,
        };
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// Page size as set, before clamping.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    /// Effective page size, within `[1, MAX_PAGE_SIZE]`.
    pub fn limit(&self) -> u64 {
        match self.page_size {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page.max(DEFAULT_PAGE) - 1).saturating_mul(self.limit())
    }

    /// Total page count for `total` rows: `total / limit + 1`.
    pub fn total_pages(&self, total: u64) -> u64 {
        total / self.limit() + 1
    }

    /// Split reserved keys out of the attachment into a new [`Condition`].
    ///
    /// The pagination itself is not modified.
    pub fn build_condition(&self) -> Result<Condition, QueryError> {
        let mut condition = Condition::default();
        for (key, value) in &self.attachment {
            match (key.as_str(), value) {
                (TIME_RANGE_KEY, FilterValue::Range(r)) => condition.time_range = *r,
                (TIME_RANGE_KEY, _) => {
                    return Err(QueryError::ReservedKeyType {
                        key: TIME_RANGE_KEY,
                        expected: "a range",
                    });
                }
                (EXCLUDE_DELETED_KEY, FilterValue::Scalar(Scalar::Bool(b))) => {
                    condition.exclude_deleted = *b;
                }
                (EXCLUDE_DELETED_KEY, _) => {
                    return Err(QueryError::ReservedKeyType {
                        key: EXCLUDE_DELETED_KEY,
                        expected: "a boolean",
                    });
                }
                (_, FilterValue::Json(q)) => condition.json_queries.push(q.clone()),
                _ => {
                    condition.attachment.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(condition)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new()
    }
}

/// One page of query results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub page: u64,
    pub total: u64,
    pub total_page: u64,
    pub data: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["code", "status", "timeout", "headers", "created_at", "deleted_at"];
    const JSON_COLUMNS: &[&str] = &["headers"];

    #[test]
    fn range_reports_bounds() {
        let r = Range::new(3, 9).unwrap();
        assert_eq!(r.left(), 3);
        assert_eq!(r.right(), 9);

        let r = Range::new(5, 5).unwrap();
        assert_eq!(r.resolve(), (5, 5));
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert_eq!(
            Range::new(10, 2),
            Err(QueryError::InvertedRange { left: 10, right: 2 })
        );
    }

    #[test]
    fn unset_right_bound_resolves_to_now() {
        let before = now_ns();
        let r = Range::unbounded();
        let right = r.right();
        assert_eq!(r.left(), 0);
        assert!(right >= before);
        assert!(r.right() >= right);
    }

    #[test]
    fn default_range_spans_zero_to_now() {
        let before = now_ns();
        let r = Range::default();
        assert_eq!(r.left(), 0);
        assert!(r.right() >= before);
    }

    #[test]
    fn pagination_normalizes_page_and_size() {
        let mut p = Pagination::new();
        p.set_page(0);
        assert_eq!(p.page(), 1);
        p.set_page(-4);
        assert_eq!(p.page(), 1);
        p.set_page(3);
        assert_eq!(p.page(), 3);

        p.set_page_size(0);
        assert_eq!(p.page_size(), DEFAULT_PAGE_SIZE);
        p.set_page_size(-1);
        assert_eq!(p.page_size(), DEFAULT_PAGE_SIZE);
        p.set_page_size(25);
        assert_eq!(p.limit(), 25);
    }

    #[test]
    fn oversized_page_size_is_clamped_at_query_time() {
        let p = Pagination::new().with_page(3).with_page_size(500);
        assert_eq!(p.page_size(), 500);
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
        assert_eq!(p.offset(), 200);
    }

    #[test]
    fn total_pages_always_adds_one() {
        let p = Pagination::new().with_page_size(10);
        assert_eq!(p.total_pages(0), 1);
        assert_eq!(p.total_pages(9), 1);
        assert_eq!(p.total_pages(14), 2);
        assert_eq!(p.total_pages(20), 3);
    }

    #[test]
    fn build_condition_extracts_reserved_keys() {
        let range = Range::new(100, 200).unwrap();
        let p = Pagination::new()
            .with(TIME_RANGE_KEY, range)
            .with(EXCLUDE_DELETED_KEY, true)
            .with("code", "code5");

        let c = p.build_condition().unwrap();
        assert_eq!(c.time_range(), &range);
        assert!(c.is_exclude_deleted());
        assert_eq!(c.attachment().len(), 1);
        assert_eq!(c.get_attachment("code"), Some(&FilterValue::eq("code5")));

        // the pagination keeps its own map intact
        assert_eq!(p.attachment().len(), 3);
    }

    #[test]
    fn build_condition_false_flag_keeps_deleted_rows() {
        let c = Pagination::new()
            .with(EXCLUDE_DELETED_KEY, false)
            .build_condition()
            .unwrap();
        assert!(!c.is_exclude_deleted());
        assert!(c.attachment().is_empty());
    }

    #[test]
    fn build_condition_rejects_mistyped_reserved_keys() {
        let err = Pagination::new()
            .with(TIME_RANGE_KEY, 12_i64)
            .build_condition()
            .unwrap_err();
        assert!(matches!(err, QueryError::ReservedKeyType { key: TIME_RANGE_KEY, .. }));

        let err = Pagination::new()
            .with(EXCLUDE_DELETED_KEY, "yes")
            .build_condition()
            .unwrap_err();
        assert!(matches!(err, QueryError::ReservedKeyType { key: EXCLUDE_DELETED_KEY, .. }));
    }

    #[test]
    fn build_condition_moves_json_queries() {
        let q = JsonPathQuery::level2("headers", "info", "age", 14_i64).unwrap();
        let c = Pagination::new()
            .with("age", q.clone())
            .build_condition()
            .unwrap();
        assert!(c.attachment().is_empty());
        assert_eq!(c.json_queries(), &[q]);
    }

    #[test]
    fn where_clause_dispatches_on_value_kind() {
        let c = Pagination::new()
            .with(TIME_RANGE_KEY, Range::new(1, 2).unwrap())
            .with(EXCLUDE_DELETED_KEY, true)
            .with("code", "a")
            .with("status", FilterValue::any_of(["ENABLED", "PENDING"]))
            .with("timeout", Range::new(10, 20).unwrap())
            .build_condition()
            .unwrap();

        let w = c.to_where(COLUMNS, JSON_COLUMNS).unwrap();
        assert_eq!(
            w.sql,
            "WHERE created_at BETWEEN ? AND ? AND deleted_at = 0 AND code = ? \
             AND status IN (?, ?) AND timeout BETWEEN ? AND ?"
        );
        assert_eq!(
            w.params,
            vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Text("a".into()),
                Value::Text("ENABLED".into()),
                Value::Text("PENDING".into()),
                Value::Integer(10),
                Value::Integer(20),
            ]
        );
    }

    #[test]
    fn where_clause_renders_json_paths() {
        let mut c = Condition::default();
        c.add_json_queries([JsonPathQuery::level1("headers", "name", "lance").unwrap()]);
        let w = c.to_where(COLUMNS, JSON_COLUMNS).unwrap();
        assert!(w.sql.ends_with("json_extract(headers, ?) = ?"));
        assert_eq!(w.params[2], Value::Text("$.\"name\"".into()));
        assert_eq!(w.params[3], Value::Text("lance".into()));
    }

    #[test]
    fn where_clause_rejects_unknown_and_non_json_columns() {
        let c = Pagination::new()
            .with("code; DROP TABLE tasks", "x")
            .build_condition()
            .unwrap();
        assert_eq!(
            c.to_where(COLUMNS, JSON_COLUMNS).unwrap_err(),
            QueryError::UnknownColumn("code; DROP TABLE tasks".into())
        );

        let mut c = Condition::default();
        c.add_json_queries([JsonPathQuery::level1("code", "k", 1_i64).unwrap()]);
        assert_eq!(
            c.to_where(COLUMNS, JSON_COLUMNS).unwrap_err(),
            QueryError::NotJsonColumn("code".into())
        );
    }

    #[test]
    fn empty_collection_matches_nothing() {
        let c = Pagination::new()
            .with("code", FilterValue::any_of(Vec::<String>::new()))
            .build_condition()
            .unwrap();
        let w = c.to_where(COLUMNS, JSON_COLUMNS).unwrap();
        assert!(w.sql.ends_with("AND 1 = 0"));
    }

    #[test]
    fn json_query_depth_is_one_or_two() {
        assert_eq!(JsonPathQuery::from_segments("headers", &["a"], 1_i64).unwrap().level(), 1);
        assert_eq!(
            JsonPathQuery::from_segments("headers", &["a", "b"], 1_i64).unwrap().level(),
            2
        );
        assert_eq!(
            JsonPathQuery::from_segments("headers", &[], 1_i64),
            Err(QueryError::UnsupportedJsonDepth(0))
        );
        assert_eq!(
            JsonPathQuery::from_segments("headers", &["a", "b", "c"], 1_i64),
            Err(QueryError::UnsupportedJsonDepth(3))
        );
        assert!(JsonPathQuery::level1("", "a", 1_i64).is_err());
        assert!(JsonPathQuery::level2("headers", "a", "", 1_i64).is_err());
    }
}
