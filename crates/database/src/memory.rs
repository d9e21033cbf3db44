use crate::error::DbError;
use crate::gateway::Gateway;
use async_trait::async_trait;
use core_types::{QueryResult, Statement};
use std::collections::HashMap;

/// An in-memory gateway that serves canned results and records every
/// statement it receives.
///
/// Transactions are staged and only appended to [`MemoryGateway::committed`]
/// when every statement succeeds, so a failure injected with
/// [`MemoryGateway::fail_transaction_at`] leaves no trace of the earlier
/// statements of that transaction.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    results: HashMap<String, QueryResult>,
    queries: Vec<Statement>,
    committed: Vec<Statement>,
    fail_at: Option<(usize, String)>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `result` whenever a query with exactly this SQL text runs.
    pub fn with_result(mut self, sql: impl Into<String>, result: QueryResult) -> Self {
        self.results.insert(sql.into(), result);
        self
    }

    /// Makes the statement at `position` of every transaction fail.
    pub fn fail_transaction_at(mut self, position: usize, message: impl Into<String>) -> Self {
        self.fail_at = Some((position, message.into()));
        self
    }

    /// Every read statement executed so far.
    pub fn queries(&self) -> &[Statement] {
        &self.queries
    }

    /// Every statement that belongs to a committed transaction.
    pub fn committed(&self) -> &[Statement] {
        &self.committed
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn execute_query(&mut self, statement: &Statement) -> Result<QueryResult, DbError> {
        self.queries.push(statement.clone());
        self.results
            .get(&statement.sql)
            .cloned()
            .ok_or_else(|| DbError::QueryError(format!("no result registered for: {}", statement.sql)))
    }

    async fn execute_transaction(&mut self, statements: &[Statement]) -> Result<u64, DbError> {
        let mut staged = Vec::with_capacity(statements.len());
        for (position, statement) in statements.iter().enumerate() {
            if let Some((fail_position, message)) = &self.fail_at {
                if *fail_position == position {
                    return Err(DbError::QueryError(message.clone()));
                }
            }
            staged.push(statement.clone());
        }
        let affected = staged.len() as u64;
        self.committed.extend(staged);
        Ok(affected)
    }
}
