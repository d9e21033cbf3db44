use thiserror::Error;

/// SQLSTATE raised when `statement_timeout` cancels a statement.
const QUERY_CANCELED: &str = "57014";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Failed to connect to the database: {0}")]
    ConnectionError(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Statement timed out: {0}")]
    TimeoutError(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(QUERY_CANCELED) => {
                DbError::TimeoutError(db_err.message().to_string())
            }
            sqlx::Error::Configuration(_) => DbError::ConnectionConfigError(err.to_string()),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => DbError::ConnectionError(err.to_string()),
            _ => DbError::QueryError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::fmt;

    /// A server-side error carrying only a SQLSTATE and a message.
    #[derive(Debug)]
    struct ServerError {
        code: &'static str,
        message: &'static str,
    }

    impl fmt::Display for ServerError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl std::error::Error for ServerError {}

    impl DatabaseError for ServerError {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    fn server_error(code: &'static str, message: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ServerError { code, message }))
    }

    #[test]
    fn canceled_statements_are_timeouts() {
        let err = DbError::from(server_error(
            "57014",
            "canceling statement due to statement timeout",
        ));
        assert_eq!(
            err,
            DbError::TimeoutError("canceling statement due to statement timeout".to_string())
        );
    }

    #[test]
    fn other_server_errors_are_query_errors() {
        let err = DbError::from(server_error(
            "23505",
            "duplicate key value violates unique constraint \"branch_pkey\"",
        ));
        assert!(matches!(err, DbError::QueryError(message) if message.contains("branch_pkey")));
    }

    #[test]
    fn io_failures_are_connection_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        assert!(matches!(DbError::from(sqlx::Error::Io(io)), DbError::ConnectionError(_)));
    }

    #[test]
    fn other_failures_are_query_errors() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::QueryError(_)));
    }
}
