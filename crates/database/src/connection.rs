use crate::error::DbError;
use crate::session::PgSession;
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{Connection, PgConnection};
use std::fmt;
use std::time::Duration;

/// Everything needed to open a session against the courier database.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Refuse to talk to the server without TLS.
    #[serde(default = "default_require_tls")]
    pub require_tls: bool,
    /// Server-side `statement_timeout` applied to every statement of the session.
    #[serde(default = "default_statement_timeout_secs")]
    pub statement_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_port() -> u16 { 5432 }
fn default_require_tls() -> bool { true }
fn default_statement_timeout_secs() -> u64 { 30 }
fn default_connect_timeout_secs() -> u64 { 10 }

/// Postgres stores `statement_timeout` as an `int` of milliseconds.
const MAX_STATEMENT_TIMEOUT_SECS: u64 = i32::MAX as u64 / 1000;

impl Credentials {
    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }

    /// The timeout in milliseconds, as sent to the server.
    pub fn statement_timeout_ms(&self) -> u64 {
        self.statement_timeout_secs.saturating_mul(1000)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Checks the settings that would otherwise only fail at connect time.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.host.trim().is_empty() {
            return Err(DbError::ConnectionConfigError("host must be set".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(DbError::ConnectionConfigError("database must be set".to_string()));
        }
        if self.user.trim().is_empty() {
            return Err(DbError::ConnectionConfigError("user must be set".to_string()));
        }
        if self.statement_timeout_secs == 0 {
            return Err(DbError::ConnectionConfigError(
                "statement_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.statement_timeout_secs > MAX_STATEMENT_TIMEOUT_SECS {
            return Err(DbError::ConnectionConfigError(format!(
                "statement_timeout_secs must be at most {MAX_STATEMENT_TIMEOUT_SECS}"
            )));
        }
        Ok(())
    }

    fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_tls { PgSslMode::Require } else { PgSslMode::Prefer };
        let statement_timeout_ms = self.statement_timeout_ms().to_string();
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(ssl_mode)
            .application_name("courier-desk")
            .options([("statement_timeout", statement_timeout_ms.as_str())])
    }
}

// The password never reaches logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"********")
            .field("require_tls", &self.require_tls)
            .field("statement_timeout_secs", &self.statement_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Opens a dedicated session to the PostgreSQL database.
///
/// The session is meant to live for one user action. Any failure here,
/// including authentication and the connect timeout, is a `ConnectionError`.
pub async fn connect(credentials: &Credentials) -> Result<PgSession, DbError> {
    credentials.validate()?;
    let options = credentials.connect_options();

    let conn = tokio::time::timeout(
        credentials.connect_timeout(),
        PgConnection::connect_with(&options),
    )
    .await
    .map_err(|_| {
        DbError::ConnectionError(format!(
            "no response from {}:{} within {:?}",
            credentials.host,
            credentials.port,
            credentials.connect_timeout()
        ))
    })?
    .map_err(|e| DbError::ConnectionError(e.to_string()))?;

    tracing::debug!(host = %credentials.host, database = %credentials.database, "Opened database session.");
    Ok(PgSession::new(conn))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            host: "db.example.com".to_string(),
            port: 5432,
            database: "courier".to_string(),
            user: "desk".to_string(),
            password: "hunter2".to_string(),
            require_tls: true,
            statement_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }

    #[test]
    fn debug_output_redacts_the_password() {
        let rendered = format!("{:?}", credentials());
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("db.example.com"));
    }

    #[test]
    fn validation_rejects_missing_fields() {
        assert!(credentials().validate().is_ok());

        let mut missing_host = credentials();
        missing_host.host = "  ".to_string();
        assert!(matches!(
            missing_host.validate(),
            Err(DbError::ConnectionConfigError(_))
        ));

        let mut no_timeout = credentials();
        no_timeout.statement_timeout_secs = 0;
        assert!(no_timeout.validate().is_err());
    }

    #[test]
    fn oversized_statement_timeout_is_rejected_without_overflow() {
        let mut huge = credentials();
        huge.statement_timeout_secs = u64::MAX;
        assert_eq!(huge.statement_timeout_ms(), u64::MAX);
        assert!(matches!(huge.validate(), Err(DbError::ConnectionConfigError(_))));

        let mut largest = credentials();
        largest.statement_timeout_secs = MAX_STATEMENT_TIMEOUT_SECS;
        assert!(largest.validate().is_ok());
        assert!(largest.statement_timeout_ms() <= i32::MAX as u64);
    }

    #[tokio::test]
    async fn connect_fails_before_dialing_with_invalid_settings() {
        let mut bad = credentials();
        bad.user = String::new();
        let err = connect(&bad).await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionConfigError(_)));
    }
}
