use crate::error::DbError;
use async_trait::async_trait;
use core_types::{QueryResult, Statement};

/// A live session the rest of the system runs statements through.
///
/// Methods take `&mut self`: a session has exactly one caller at a time.
/// Failures are returned immediately and never retried here.
#[async_trait]
pub trait Gateway: Send {
    /// Runs a read statement and returns every row it produced.
    async fn execute_query(&mut self, statement: &Statement) -> Result<QueryResult, DbError>;

    /// Runs the statements in order inside one transaction.
    ///
    /// Either every statement commits or none does. Returns the total number
    /// of affected rows.
    async fn execute_transaction(&mut self, statements: &[Statement]) -> Result<u64, DbError>;
}
