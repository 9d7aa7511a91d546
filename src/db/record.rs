//! Generic record persistence shared by every entity table.
//!
//! Each table implements [`Record`]; the CRUD and paginated query
//! operations below are written once against that trait.

use super::query::{Condition, Page, Pagination, QueryError};
use super::{Database, now_ns};
use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params, params_from_iter};
use serde::{Deserialize, Serialize};
use serde_json::Map;

/// Bookkeeping columns present on every table, in storage order.
pub const AUDIT_COLUMNS: [&str; 5] = [
    "deleted_at",
    "created_at",
    "created_by",
    "updated_at",
    "updated_by",
];

/// Soft-delete marker, engine-managed timestamps and authorship.
///
/// Timestamps are nanoseconds since the Unix epoch. `deleted_at == 0`
/// marks a live row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    #[serde(default)]
    pub deleted_at: u64,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    #[serde(default)]
    pub updated_at: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub updated_by: String,
}

impl Audit {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at != 0
    }

    /// Values in [`AUDIT_COLUMNS`] order.
    pub fn values(&self) -> Result<[Value; 5], QueryError> {
        Ok([
            uint(self.deleted_at)?,
            uint(self.created_at)?,
            Value::Text(self.created_by.clone()),
            uint(self.updated_at)?,
            Value::Text(self.updated_by.clone()),
        ])
    }

    /// Kind of an audit column, `None` for any other name.
    pub fn column_kind(column: &str) -> Option<ColumnKind> {
        match column {
            "deleted_at" | "created_at" | "updated_at" => Some(ColumnKind::UInt),
            "created_by" | "updated_by" => Some(ColumnKind::Text),
            _ => None,
        }
    }

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            deleted_at: row.get("deleted_at")?,
            created_at: row.get("created_at")?,
            created_by: row.get("created_by")?,
            updated_at: row.get("updated_at")?,
            updated_by: row.get("updated_by")?,
        })
    }
}

/// What a column holds, as far as [`Record::from_row`] can read it back.
#[derive(Debug, Clone, Copy)]
pub enum ColumnKind {
    Text,
    Int,
    UInt,
    /// Nullable JSON document stored as text.
    Json,
    /// Nullable text restricted to the names accepted by the predicate.
    Enum(fn(&str) -> bool),
}

impl ColumnKind {
    fn expected(&self) -> &'static str {
        match self {
            ColumnKind::Text => "a string",
            ColumnKind::Int => "an integer",
            ColumnKind::UInt => "a non-negative integer",
            ColumnKind::Json => "a json document",
            ColumnKind::Enum(_) => "a known name or null",
        }
    }

    /// Reject a value that would make the row unreadable.
    pub fn check(&self, column: &str, value: &Value) -> Result<(), QueryError> {
        let ok = match (self, value) {
            (ColumnKind::Text, Value::Text(_)) => true,
            (ColumnKind::Int, Value::Integer(_)) => true,
            (ColumnKind::UInt, Value::Integer(i)) => *i >= 0,
            (ColumnKind::Json, Value::Null | Value::Text(_)) => true,
            (ColumnKind::Enum(_), Value::Null) => true,
            (ColumnKind::Enum(known), Value::Text(s)) => known(s),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(QueryError::InvalidColumnValue {
                column: column.to_string(),
                expected: self.expected(),
            })
        }
    }
}

/// A row type stored in one table with an auto-increment `id`.
pub trait Record: Sized {
    const TABLE: &'static str;

    /// Stored columns except `id`, in the order produced by [`Record::values`].
    const COLUMNS: &'static [&'static str];

    /// Columns holding JSON documents (targets of JSON path queries).
    const JSON_COLUMNS: &'static [&'static str] = &[];

    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    /// Kind of a column listed in [`Record::COLUMNS`].
    fn column_kind(column: &str) -> ColumnKind;

    fn audit_mut(&mut self) -> &mut Audit;

    /// Column values, aligned with [`Record::COLUMNS`].
    fn values(&self) -> Result<Vec<Value>, QueryError>;

    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Bind a u64 as an SQLite integer.
pub fn uint(v: u64) -> Result<Value, QueryError> {
    i64::try_from(v)
        .map(Value::Integer)
        .map_err(|_| QueryError::IntegerOverflow(v))
}

/// Bind an optional JSON document as text; `Null` is stored as SQL NULL.
pub fn json_text(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

/// Read a JSON document column; NULL and unparsable text read as `Null`.
pub fn get_json(row: &Row, column: &str) -> rusqlite::Result<serde_json::Value> {
    let text: Option<String> = row.get(column)?;
    Ok(text
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(serde_json::Value::Null))
}

/// The zero value of a column: skipped by partial struct updates.
fn is_zero(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Integer(i) => *i == 0,
        Value::Real(f) => *f == 0.0,
        Value::Text(s) => s.is_empty(),
        Value::Blob(b) => b.is_empty(),
    }
}

fn select_list<R: Record>() -> String {
    format!("id, {}", R::COLUMNS.join(", "))
}

/// Convert an explicit column value from a JSON update map.
fn map_value<R: Record>(column: &str, v: &serde_json::Value) -> Result<Value, QueryError> {
    if R::JSON_COLUMNS.contains(&column) {
        return Ok(json_text(v));
    }
    Ok(match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(i64::from(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(u) = n.as_u64() {
                return Err(QueryError::IntegerOverflow(u));
            } else {
                Value::Real(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    })
}

fn query_records<R: Record>(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<R>> {
    let mut stmt = conn.prepare(sql)?;
    let records = stmt
        .query_map(params_from_iter(params.iter()), |row| R::from_row(row))?
        .collect::<rusqlite::Result<Vec<R>>>()?;
    Ok(records)
}

fn count_records(conn: &Connection, sql: &str, params: &[Value]) -> Result<u64> {
    let total: i64 = conn.query_row(sql, params_from_iter(params.iter()), |row| row.get(0))?;
    Ok(u64::try_from(total).unwrap_or_default())
}

impl Database {
    /// Insert a record, filling in `id` and any unset timestamps.
    pub fn insert<R: Record>(&self, record: &mut R) -> Result<()> {
        let now = now_ns();
        let audit = record.audit_mut();
        if audit.created_at == 0 {
            audit.created_at = now;
        }
        if audit.updated_at == 0 {
            audit.updated_at = now;
        }

        let mut columns = Vec::with_capacity(R::COLUMNS.len() + 1);
        let mut values = Vec::with_capacity(R::COLUMNS.len() + 1);
        if record.id() != 0 {
            columns.push("id");
            values.push(uint(record.id())?);
        }
        columns.extend_from_slice(R::COLUMNS);
        values.extend(record.values()?);

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );

        let id = self.with_conn(|conn| {
            conn.execute(&sql, params_from_iter(values.iter()))?;
            Ok(conn.last_insert_rowid())
        })?;
        record.set_id(u64::try_from(id).unwrap_or_default());
        Ok(())
    }

    /// Write every column of the record, zero values included.
    ///
    /// A record without an id is inserted; a record whose id has no row is
    /// inserted with that id.
    pub fn save<R: Record>(&self, record: &mut R) -> Result<()> {
        if record.id() == 0 {
            return self.insert(record);
        }
        let now = now_ns();
        let audit = record.audit_mut();
        if audit.created_at == 0 {
            audit.created_at = now;
        }
        audit.updated_at = now;

        let mut values = vec![uint(record.id())?];
        values.extend(record.values()?);

        let assignments = R::COLUMNS
            .iter()
            .map(|c| format!("{c} = excluded.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} (id, {}) VALUES (?, {}) ON CONFLICT(id) DO UPDATE SET {}",
            R::TABLE,
            R::COLUMNS.join(", "),
            vec!["?"; R::COLUMNS.len()].join(", "),
            assignments
        );

        self.with_conn(|conn| {
            conn.execute(&sql, params_from_iter(values.iter()))?;
            Ok(())
        })
    }

    /// Update only the non-zero columns of the record.
    ///
    /// Returns the number of rows changed (0 when the id does not exist).
    pub fn update_non_zero<R: Record>(&self, record: &mut R) -> Result<usize> {
        if record.id() == 0 {
            return Err(QueryError::MissingId.into());
        }
        record.audit_mut().updated_at = now_ns();

        let mut assignments = Vec::new();
        let mut values = Vec::new();
        for (column, value) in R::COLUMNS.iter().zip(record.values()?) {
            if is_zero(&value) {
                continue;
            }
            assignments.push(format!("{} = ?", column));
            values.push(value);
        }
        values.push(uint(record.id())?);

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            R::TABLE,
            assignments.join(", ")
        );
        self.with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(values.iter()))?))
    }

    /// Update exactly the columns named in `changes`, zero values included.
    ///
    /// `updated_at` is bumped unless the map sets it. Unknown columns, `id`
    /// and values the column cannot hold are rejected before anything is
    /// written.
    pub fn update_columns<R: Record>(
        &self,
        id: u64,
        changes: &Map<String, serde_json::Value>,
    ) -> Result<usize> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut assignments = Vec::with_capacity(changes.len() + 1);
        let mut values = Vec::with_capacity(changes.len() + 2);
        for (column, value) in changes {
            if column == "id" {
                return Err(QueryError::ImmutableColumn(column.clone()).into());
            }
            if !R::COLUMNS.contains(&column.as_str()) {
                return Err(QueryError::UnknownColumn(column.clone()).into());
            }
            let value = map_value::<R>(column, value)?;
            R::column_kind(column).check(column, &value)?;
            assignments.push(format!("{} = ?", column));
            values.push(value);
        }
        if !changes.contains_key("updated_at") {
            assignments.push("updated_at = ?".to_string());
            values.push(uint(now_ns())?);
        }
        values.push(uint(id)?);

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            R::TABLE,
            assignments.join(", ")
        );
        self.with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(values.iter()))?))
    }

    /// Remove the row permanently.
    pub fn delete_by_id<R: Record>(&self, id: u64) -> Result<usize> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", R::TABLE);
        let id = uint(id)?;
        self.with_conn(|conn| Ok(conn.execute(&sql, params![id])?))
    }

    /// Mark the row deleted by stamping `deleted_at` with the current time.
    pub fn soft_delete_by_id<R: Record>(&self, id: u64) -> Result<usize> {
        let sql = format!(
            "UPDATE {} SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2",
            R::TABLE
        );
        let now = uint(now_ns())?;
        let id = uint(id)?;
        self.with_conn(|conn| Ok(conn.execute(&sql, params![now, id])?))
    }

    /// Fetch by id. With `exclude_deleted`, soft-deleted rows read as absent.
    pub fn find_by_id<R: Record>(&self, id: u64, exclude_deleted: bool) -> Result<Option<R>> {
        let mut sql = format!("SELECT {} FROM {} WHERE id = ?1", select_list::<R>(), R::TABLE);
        if exclude_deleted {
            sql.push_str(" AND deleted_at = 0");
        }
        let id = uint(id)?;

        self.with_conn(|conn| {
            let result = conn.query_row(&sql, params![id], |row| R::from_row(row));
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// All rows matching the condition, in id order.
    pub fn find_where<R: Record>(&self, condition: &Condition) -> Result<Vec<R>> {
        let clause = condition.to_where(R::COLUMNS, R::JSON_COLUMNS)?;
        let sql = format!(
            "SELECT {} FROM {} {} ORDER BY id ASC",
            select_list::<R>(),
            R::TABLE,
            clause.sql
        );
        self.with_conn(|conn| query_records(conn, &sql, &clause.params))
    }

    /// Number of rows matching the condition.
    pub fn count_where<R: Record>(&self, condition: &Condition) -> Result<u64> {
        let clause = condition.to_where(R::COLUMNS, R::JSON_COLUMNS)?;
        let sql = format!("SELECT COUNT(*) FROM {} {}", R::TABLE, clause.sql);
        self.with_conn(|conn| count_records(conn, &sql, &clause.params))
    }

    /// Run a paginated query: one count over the filtered rows, then one
    /// page of rows in id order.
    pub fn paginate<R: Record>(&self, pagination: &Pagination) -> Result<Page<R>> {
        let condition = pagination.build_condition()?;
        let clause = condition.to_where(R::COLUMNS, R::JSON_COLUMNS)?;

        let count_sql = format!("SELECT COUNT(*) FROM {} {}", R::TABLE, clause.sql);
        let page_sql = format!(
            "SELECT {} FROM {} {} ORDER BY id ASC LIMIT ? OFFSET ?",
            select_list::<R>(),
            R::TABLE,
            clause.sql
        );
        let mut page_params = clause.params.clone();
        page_params.push(Value::Integer(
            i64::try_from(pagination.limit()).unwrap_or(i64::MAX),
        ));
        page_params.push(Value::Integer(
            i64::try_from(pagination.offset()).unwrap_or(i64::MAX),
        ));

        let (total, data) = self.with_conn(|conn| {
            let total = count_records(conn, &count_sql, &clause.params)?;
            let data = query_records::<R>(conn, &page_sql, &page_params)?;
            Ok((total, data))
        })?;

        Ok(Page {
            page: pagination.page(),
            total,
            total_page: pagination.total_pages(total),
            data,
        })
    }
}

/// Declares an enum stored as text, serialized under the same names.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Whether `s` is the stored name of a variant.
            pub fn is_known(s: &str) -> bool {
                s.parse::<$name>().is_ok()
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| rusqlite::types::FromSqlError::Other(e.into()))
            }
        }
    };
}

pub(crate) use text_enum;

/// Bind an optional text enum; `None` is stored as SQL NULL.
pub fn enum_text(v: Option<&'static str>) -> Value {
    v.map(|s| Value::Text(s.to_string())).unwrap_or(Value::Null)
}
