// libs/shared/database/src/postgres.rs
use std::error::Error;

use async_trait::async_trait;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type};
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info, instrument};

use shared_config::AppConfig;

use crate::{Database, DatabaseError, QueryResult, SqlValue, Statement};

type BoxError = Box<dyn Error + Sync + Send>;

pub struct PostgresDatabase {
    client: Mutex<Option<Client>>,
    connection: Mutex<Option<JoinHandle<()>>>,
}

impl PostgresDatabase {
    #[instrument(skip(config), fields(target = %config.connection_summary()))]
    pub async fn open(config: &AppConfig) -> Result<Self, DatabaseError> {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&config.db_host)
            .port(config.db_port)
            .dbname(&config.db_name)
            .user(&config.db_user)
            .application_name("hospital-desk");

        if let Some(password) = &config.db_password {
            pg.password(password);
        }

        let (client, connection) = pg
            .connect(NoTls)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("Database connection error: {}", e);
            }
        });

        info!("Connected to {}", config.connection_url());

        Ok(Self {
            client: Mutex::new(Some(client)),
            connection: Mutex::new(Some(handle)),
        })
    }

    async fn batch(&self, sql: &str) -> Result<(), DatabaseError> {
        debug!("Executing {}", sql);
        let guard = self.client.lock().await;
        let client = guard.as_ref().ok_or(DatabaseError::Closed)?;
        client.batch_execute(sql).await?;
        Ok(())
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn execute(&self, statement: &Statement) -> Result<u64, DatabaseError> {
        debug!(sql = statement.sql(), "Executing statement");

        let guard = self.client.lock().await;
        let client = guard.as_ref().ok_or(DatabaseError::Closed)?;

        let affected = client.execute(statement.sql(), &bound_params(statement)).await?;
        Ok(affected)
    }

    async fn query(&self, statement: &Statement) -> Result<QueryResult, DatabaseError> {
        debug!(sql = statement.sql(), "Running query");

        let guard = self.client.lock().await;
        let client = guard.as_ref().ok_or(DatabaseError::Closed)?;

        let prepared = client.prepare(statement.sql()).await?;
        let columns = prepared
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();

        let rows = client.query(&prepared, &bound_params(statement)).await?;
        let rows = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|idx| row.try_get::<_, CellText>(idx).map(|cell| cell.0))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryResult::new(columns, rows))
    }

    async fn begin(&self) -> Result<(), DatabaseError> {
        self.batch("BEGIN").await
    }

    async fn commit(&self) -> Result<(), DatabaseError> {
        self.batch("COMMIT").await
    }

    async fn rollback(&self) -> Result<(), DatabaseError> {
        self.batch("ROLLBACK").await
    }

    async fn close(&self) {
        // Dropping the client ends the connection task.
        if self.client.lock().await.take().is_none() {
            return;
        }

        if let Some(handle) = self.connection.lock().await.take() {
            if let Err(e) = handle.await {
                debug!("Ignoring error while closing connection: {}", e);
            }
        }

        info!("Database connection closed");
    }
}

impl From<tokio_postgres::Error> for DatabaseError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.is_closed() {
            return DatabaseError::Closed;
        }

        match err.as_db_error() {
            Some(db) => DatabaseError::Query(db.message().to_string()),
            None => DatabaseError::Query(err.to_string()),
        }
    }
}

fn bound_params(statement: &Statement) -> Vec<&(dyn ToSql + Sync)> {
    statement
        .params()
        .iter()
        .map(|value| value as &(dyn ToSql + Sync))
        .collect()
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            SqlValue::Int(value) => value.to_sql(ty, out),
            SqlValue::Text(value) => value.to_sql(ty, out),
            SqlValue::Date(value) => value.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <i32 as ToSql>::accepts(ty)
            || <String as ToSql>::accepts(ty)
            || <NaiveDate as ToSql>::accepts(ty)
    }

    // Type-check against the variant actually held, not the union of all three.
    fn to_sql_checked(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            SqlValue::Int(value) => value.to_sql_checked(ty, out),
            SqlValue::Text(value) => value.to_sql_checked(ty, out),
            SqlValue::Date(value) => value.to_sql_checked(ty, out),
        }
    }
}

/// Any column rendered the way the server's text output would show it.
struct CellText(String);

impl<'a> FromSql<'a> for CellText {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let ty = match ty.kind() {
            Kind::Domain(base) => base,
            _ => ty,
        };

        let text = match *ty {
            Type::BOOL => bool::from_sql(ty, raw)?.to_string(),
            Type::INT2 => i16::from_sql(ty, raw)?.to_string(),
            Type::INT4 => i32::from_sql(ty, raw)?.to_string(),
            Type::INT8 => i64::from_sql(ty, raw)?.to_string(),
            Type::OID => u32::from_sql(ty, raw)?.to_string(),
            Type::FLOAT4 => f32::from_sql(ty, raw)?.to_string(),
            Type::FLOAT8 => f64::from_sql(ty, raw)?.to_string(),
            Type::DATE => NaiveDate::from_sql(ty, raw)?.format("%Y-%m-%d").to_string(),
            Type::TIME => NaiveTime::from_sql(ty, raw)?.format("%H:%M:%S").to_string(),
            Type::TIMESTAMP => NaiveDateTime::from_sql(ty, raw)?
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            Type::TIMESTAMPTZ => DateTime::<Utc>::from_sql(ty, raw)?.to_rfc3339(),
            // Character types are sent as plain UTF-8.
            _ => String::from_utf8_lossy(raw).into_owned(),
        };

        Ok(CellText(text))
    }

    fn from_sql_null(_: &Type) -> Result<Self, BoxError> {
        Ok(CellText("null".to_string()))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_renders_common_types() {
        let mut buf = BytesMut::new();
        42i32.to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(CellText::from_sql(&Type::INT4, &buf).unwrap().0, "42");

        let mut buf = BytesMut::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        date.to_sql(&Type::DATE, &mut buf).unwrap();
        assert_eq!(CellText::from_sql(&Type::DATE, &buf).unwrap().0, "2024-03-09");

        assert_eq!(CellText::from_sql(&Type::BPCHAR, b"AV").unwrap().0, "AV");
        assert_eq!(CellText::from_sql_null(&Type::TEXT).unwrap().0, "null");
    }

    #[test]
    fn test_sql_value_checks_the_held_variant() {
        let mut buf = BytesMut::new();
        assert!(SqlValue::Int(1).to_sql_checked(&Type::TEXT, &mut buf).is_err());

        let mut buf = BytesMut::new();
        assert!(SqlValue::Text("AV".into()).to_sql_checked(&Type::TEXT, &mut buf).is_ok());
        assert_eq!(&buf[..], b"AV");
    }
}
