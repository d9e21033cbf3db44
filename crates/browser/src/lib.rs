//! Read-only browsing of the allow-listed tables.

use core_types::{CoreError, QueryResult, Statement, TableName};
use database::{DbError, Gateway};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowseError {
    #[error(transparent)]
    UnknownTable(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl BrowseError {
    pub fn is_validation(&self) -> bool {
        matches!(self, BrowseError::UnknownTable(_))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TableBrowser {
    max_rows: Option<i64>,
}

impl TableBrowser {
    pub fn new(max_rows: Option<i64>) -> Self {
        Self { max_rows }
    }

    /// The browsable tables, in display order.
    pub fn tables(&self) -> &'static [TableName] {
        &TableName::ALL
    }

    /// Builds the full-table select. The name must be on the allow-list, so
    /// user input never reaches the SQL text.
    pub fn statement(&self, name: &str) -> Result<Statement, BrowseError> {
        let table: TableName = name.parse()?;
        let sql = format!("SELECT * FROM {}", table.quoted());
        Ok(match self.max_rows {
            Some(limit) => Statement::new(format!("{sql} LIMIT $1")).bind(limit),
            None => Statement::new(sql),
        })
    }

    pub async fn fetch_table<G: Gateway + ?Sized>(
        &self,
        gateway: &mut G,
        name: &str,
    ) -> Result<QueryResult, BrowseError> {
        let statement = self.statement(name)?;
        tracing::info!(table = name, limit = ?self.max_rows, "Fetching table.");
        Ok(gateway.execute_query(&statement).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Value;
    use database::MemoryGateway;

    #[test]
    fn every_listed_table_is_accepted() {
        let browser = TableBrowser::default();
        assert_eq!(browser.tables().len(), 17);
        for table in browser.tables() {
            let statement = browser.statement(table.as_str()).unwrap();
            assert_eq!(statement.sql, format!("SELECT * FROM \"{}\"", table.as_str()));
            assert!(statement.params.is_empty());
        }
    }

    #[test]
    fn row_limit_is_bound_as_a_parameter() {
        let statement = TableBrowser::new(Some(500)).statement("Courier").unwrap();
        assert_eq!(statement.sql, "SELECT * FROM \"courier\" LIMIT $1");
        assert_eq!(statement.params, vec![Value::Integer(500)]);
    }

    #[tokio::test]
    async fn unlisted_names_never_reach_the_gateway() {
        let browser = TableBrowser::default();
        let mut gateway = MemoryGateway::new();

        for name in ["pg_shadow", "branch; DROP TABLE branch", ""] {
            let err = browser.fetch_table(&mut gateway, name).await.unwrap_err();
            assert!(err.is_validation(), "{name}");
        }
        assert!(gateway.queries().is_empty());
    }

    #[tokio::test]
    async fn fetch_returns_the_gateway_result() {
        let rows = QueryResult::new(["branch_id", "city"], vec![vec![Value::Integer(1), Value::from("Valsad")]]);
        let mut gateway = MemoryGateway::new().with_result("SELECT * FROM \"branch\"", rows.clone());

        let result = TableBrowser::default().fetch_table(&mut gateway, "branch").await.unwrap();
        assert_eq!(result, rows);
    }
}
