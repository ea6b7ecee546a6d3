use std::fmt;

use hiring_config::shared::PgConnectionConfig;
use serde::Deserialize;

/// Default request body limit, large enough for a sizeable CSV upload.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Complete configuration of the hiring API service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Database holding the departments, jobs and employees tables.
    pub database: PgConnectionConfig,
    /// HTTP server settings.
    pub application: ApplicationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, applied to uploads and batch requests.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

const fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl fmt::Display for ApplicationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    host: {}", self.host)?;
        writeln!(f, "    port: {}", self.port)?;
        writeln!(f, "    max_upload_bytes: {}", self.max_upload_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_upload_bytes_has_a_default() {
        let config: ApiConfig = serde_json::from_str(
            r#"{
                "database": {
                    "host": "localhost",
                    "port": 5432,
                    "name": "hiring",
                    "username": "postgres",
                    "password": null
                },
                "application": { "host": "127.0.0.1", "port": 8000 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.application.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.database.password.is_none());
    }
}
