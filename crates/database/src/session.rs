use crate::error::DbError;
use crate::gateway::Gateway;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use core_types::{QueryResult, Statement, Value};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Connection, Executor, PgConnection, Postgres, Row, TypeInfo, ValueRef};

/// A single PostgreSQL connection owned by one user action.
#[derive(Debug)]
pub struct PgSession {
    conn: PgConnection,
}

impl PgSession {
    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }

    /// Closes the connection gracefully. Dropping the session also closes it.
    pub async fn close(self) -> Result<(), DbError> {
        self.conn.close().await?;
        Ok(())
    }
}

#[async_trait]
impl Gateway for PgSession {
    async fn execute_query(&mut self, statement: &Statement) -> Result<QueryResult, DbError> {
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "Executing query.");
        let rows = bind_params(statement).fetch_all(&mut self.conn).await?;

        let columns: Vec<String> = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            // No rows to read the shape from, so ask the server to describe it.
            None => {
                let prepared = Executor::prepare(&mut self.conn, statement.sql.as_str()).await?;
                sqlx::Statement::columns(&prepared)
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            }
        };

        let rows = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(rows = rows.len(), "Query complete.");
        Ok(QueryResult::new(columns, rows))
    }

    async fn execute_transaction(&mut self, statements: &[Statement]) -> Result<u64, DbError> {
        let mut tx = self.conn.begin().await?;
        let mut affected = 0;

        for (position, statement) in statements.iter().enumerate() {
            tracing::debug!(position, sql = %statement.sql, "Executing statement in transaction.");
            match bind_params(statement).execute(&mut *tx).await {
                Ok(done) => affected += done.rows_affected(),
                Err(e) => {
                    tracing::warn!(position, error = %e, "Statement failed, rolling back.");
                    let rolled_back = tx.rollback().await;
                    return Err(statement_failure(e, rolled_back));
                }
            }
        }

        tx.commit().await?;
        tracing::info!(statements = statements.len(), affected, "Transaction committed.");
        Ok(affected)
    }
}

/// The error reported for a failed transaction: always the statement's own.
/// A failed rollback is only logged; the server discards the transaction when
/// the connection goes away.
fn statement_failure(err: sqlx::Error, rolled_back: Result<(), sqlx::Error>) -> DbError {
    if let Err(rollback_err) = rolled_back {
        tracing::error!(error = %rollback_err, "Rollback failed.");
    }
    err.into()
}

/// Binds every parameter of the statement, in order, to its placeholder.
fn bind_params(statement: &Statement) -> Query<'_, Postgres, PgArguments> {
    statement
        .params
        .iter()
        .fold(sqlx::query(&statement.sql), |query, value| match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Integer(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::Decimal(d) => query.bind(*d),
            Value::Text(s) => query.bind(s.as_str()),
            Value::Date(d) => query.bind(*d),
            Value::Timestamp(t) => query.bind(*t),
        })
}

fn decode_row(row: &PgRow) -> Result<Vec<Value>, DbError> {
    (0..row.len()).map(|idx| decode_cell(row, idx)).collect()
}

/// Decodes one cell according to the PostgreSQL type the server reported.
fn decode_cell(row: &PgRow, idx: usize) -> Result<Value, DbError> {
    let type_name = row.column(idx).type_info().name();
    let value = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(Value::Bool),
        "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(|v| Value::Integer(v.into())),
        "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(|v| Value::Integer(v.into())),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(Value::Integer),
        "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(|v| Value::Float(v.into())),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(Value::Float),
        "NUMERIC" => row.try_get::<Option<Decimal>, _>(idx)?.map(Value::Decimal),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" => {
            row.try_get::<Option<String>, _>(idx)?.map(Value::Text)
        }
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(Value::Date),
        "TIMESTAMP" => row.try_get::<Option<NaiveDateTime>, _>(idx)?.map(Value::Timestamp),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|t| Value::Timestamp(t.naive_utc())),
        _ if row.try_get_raw(idx)?.is_null() => None,
        other => {
            tracing::warn!(column = row.column(idx).name(), pg_type = other, "Unsupported column type.");
            Some(Value::Text(format!("<{}>", other.to_lowercase())))
        }
    };
    Ok(value.unwrap_or(Value::Null))
}
