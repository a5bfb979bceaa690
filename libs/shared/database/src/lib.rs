// libs/shared/database/src/lib.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

pub mod postgres;

pub use postgres::PostgresDatabase;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("{0}")]
    Query(String),

    #[error("Connection is closed")]
    Closed,

    #[error("Unexpected result: {0}")]
    UnexpectedShape(String),
}

/// A value bound to a `$n` placeholder. User input only ever reaches the
/// server this way, never spliced into the statement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i32),
    Text(String),
    Date(NaiveDate),
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Date(value)
    }
}

/// SQL text with its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

/// Rows of a query rendered as text, in server column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn first_value(&self) -> Option<&str> {
        self.rows.first().and_then(|row| row.first()).map(String::as_str)
    }

    /// First column of the first row as an integer id.
    pub fn first_int(&self) -> Result<Option<i32>, DatabaseError> {
        match self.first_value() {
            None => Ok(None),
            Some(value) => value.trim().parse::<i32>().map(Some).map_err(|_| {
                DatabaseError::UnexpectedShape(format!("expected an integer, got '{}'", value))
            }),
        }
    }
}

/// The one connection every service talks through.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait Database: Send + Sync {
    /// Runs an INSERT/UPDATE/DELETE and returns the number of affected rows.
    async fn execute(&self, statement: &Statement) -> Result<u64, DatabaseError>;

    async fn query(&self, statement: &Statement) -> Result<QueryResult, DatabaseError>;

    async fn begin(&self) -> Result<(), DatabaseError>;

    async fn commit(&self) -> Result<(), DatabaseError>;

    async fn rollback(&self) -> Result<(), DatabaseError>;

    /// Releases the connection. Safe to call more than once; failures are swallowed.
    async fn close(&self);
}
