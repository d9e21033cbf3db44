use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{Browser, Logging, Server, Settings};

/// Prefix of the environment variables that override file settings,
/// e.g. `COURIER__DATABASE__PASSWORD`.
const ENV_PREFIX: &str = "COURIER";

/// Loads the application configuration from `config.toml` and the environment.
///
/// This function is the primary entry point for this crate. It reads the
/// optional configuration file, layers `COURIER__*` variables (including those
/// from a `.env` file) on top, and validates the result.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Same as [`load_config`] with an explicit file path. The file may be absent
/// when everything is supplied through the environment.
pub fn load_config_from(path: &Path) -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();

    let builder = config::Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    build(builder)
}

/// Deserializes the merged sources into `Settings` and validates them.
fn build(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    let settings = builder.build()?.try_deserialize::<Settings>()?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    settings
        .database
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    if settings.server.port == 0 {
        return Err(ConfigError::ValidationError("server.port must be non-zero".to_string()));
    }
    if let Some(max_rows) = settings.browser.max_rows {
        if max_rows <= 0 {
            return Err(ConfigError::ValidationError(
                "browser.max_rows must be positive".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        build(config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn minimal_file_fills_in_defaults() {
        let settings = from_toml(
            r#"
            [database]
            host = "db.example.com"
            database = "courier"
            user = "desk"
            "#,
        )
        .unwrap();

        assert_eq!(settings.database.port, 5432);
        assert!(settings.database.require_tls);
        assert_eq!(settings.database.statement_timeout_secs, 30);
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.browser.max_rows, None);
        assert_eq!(settings.logging.filter, "info");
    }

    #[test]
    fn full_file_is_read() {
        let settings = from_toml(
            r#"
            [database]
            host = "db.example.com"
            port = 6543
            database = "courier"
            user = "desk"
            password = "secret"
            require_tls = false
            statement_timeout_secs = 5

            [server]
            host = "0.0.0.0"
            port = 8080

            [browser]
            max_rows = 500

            [logging]
            filter = "debug"
            directory = "logs"
            "#,
        )
        .unwrap();

        assert_eq!(settings.database.port, 6543);
        assert!(!settings.database.require_tls);
        assert_eq!(settings.server.socket_addr().unwrap().port(), 8080);
        assert_eq!(settings.browser.max_rows, Some(500));
        assert_eq!(settings.logging.directory.as_deref(), Some(Path::new("logs")));
    }

    #[test]
    fn empty_host_is_rejected() {
        let err = from_toml(
            r#"
            [database]
            host = ""
            database = "courier"
            user = "desk"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn non_positive_row_limit_is_rejected() {
        let err = from_toml(
            r#"
            [database]
            host = "db.example.com"
            database = "courier"
            user = "desk"

            [browser]
            max_rows = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn missing_database_section_fails_to_load() {
        let err = from_toml("[server]\nport = 8080\n").unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}
