use database::Credentials;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: Credentials,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub browser: Browser,
    #[serde(default)]
    pub logging: Logging,
}

/// Where the JSON API listens.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Server {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Limits for the raw table browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Browser {
    /// Upper bound on rows returned per table. `None` returns every row.
    pub max_rows: Option<i64>,
}

/// Log output settings. `RUST_LOG` takes precedence over `filter`.
#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub filter: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            directory: None,
        }
    }
}
