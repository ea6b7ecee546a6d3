use std::sync::LazyLock;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Session settings shared by every connection the service opens.
const DATESTYLE: &str = "ISO";
const CLIENT_ENCODING: &str = "UTF8";
const TIMEZONE: &str = "UTC";

const APP_NAME_API: &str = "hiring_api";
const APP_NAME_MIGRATIONS: &str = "hiring_api_migrations";

/// Session options for request handling connections.
pub static API_CONNECTION_OPTIONS: LazyLock<PgConnectionOptions> =
    LazyLock::new(|| PgConnectionOptions {
        datestyle: DATESTYLE.to_string(),
        client_encoding: CLIENT_ENCODING.to_string(),
        timezone: TIMEZONE.to_string(),
        statement_timeout: 30_000,
        lock_timeout: 5_000,
        idle_in_transaction_session_timeout: 60_000,
        application_name: APP_NAME_API.to_string(),
    });

/// Session options for the migration run, with longer timeouts for DDL.
pub static MIGRATION_CONNECTION_OPTIONS: LazyLock<PgConnectionOptions> =
    LazyLock::new(|| PgConnectionOptions {
        datestyle: DATESTYLE.to_string(),
        client_encoding: CLIENT_ENCODING.to_string(),
        timezone: TIMEZONE.to_string(),
        statement_timeout: 300_000,
        lock_timeout: 10_000,
        idle_in_transaction_session_timeout: 60_000,
        application_name: APP_NAME_MIGRATIONS.to_string(),
    });

/// Postgres session parameters sent at connection startup.
///
/// Timeouts are in milliseconds, `0` disables them.
#[derive(Debug, Clone)]
pub struct PgConnectionOptions {
    pub datestyle: String,
    pub client_encoding: String,
    pub timezone: String,
    pub statement_timeout: u32,
    pub lock_timeout: u32,
    pub idle_in_transaction_session_timeout: u32,
    pub application_name: String,
}

impl PgConnectionOptions {
    pub fn to_key_value_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("datestyle".to_string(), self.datestyle.clone()),
            ("client_encoding".to_string(), self.client_encoding.clone()),
            ("timezone".to_string(), self.timezone.clone()),
            (
                "statement_timeout".to_string(),
                self.statement_timeout.to_string(),
            ),
            ("lock_timeout".to_string(), self.lock_timeout.to_string()),
            (
                "idle_in_transaction_session_timeout".to_string(),
                self.idle_in_transaction_session_timeout.to_string(),
            ),
            (
                "application_name".to_string(),
                self.application_name.clone(),
            ),
        ]
    }
}

/// Connection settings of the Postgres database holding the hiring tables.
#[derive(Debug, Clone, Deserialize)]
pub struct PgConnectionConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    /// Redacted in debug output.
    pub password: Option<SecretString>,
    #[serde(default = "TlsConfig::disabled")]
    pub tls: TlsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// PEM encoded root certificates, required when `enabled` is set.
    pub trusted_root_certs: String,
    pub enabled: bool,
}

impl TlsConfig {
    pub fn disabled() -> Self {
        Self {
            trusted_root_certs: String::new(),
            enabled: false,
        }
    }
}

/// Converts [`PgConnectionConfig`] into driver specific connect options.
pub trait IntoConnectOptions<Output> {
    /// Options for the server itself, used for administrative work such as
    /// creating or dropping the database.
    fn without_db(&self, options: Option<&PgConnectionOptions>) -> Output;

    /// Options for the configured database.
    fn with_db(&self, options: Option<&PgConnectionOptions>) -> Output;
}

impl IntoConnectOptions<PgConnectOptions> for PgConnectionConfig {
    fn without_db(&self, options: Option<&PgConnectionOptions>) -> PgConnectOptions {
        let ssl_mode = if self.tls.enabled {
            PgSslMode::VerifyFull
        } else {
            PgSslMode::Prefer
        };
        let mut connect_options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .username(&self.username)
            .port(self.port)
            .ssl_mode(ssl_mode);

        if self.tls.enabled {
            connect_options = connect_options
                .ssl_root_cert_from_pem(self.tls.trusted_root_certs.clone().into_bytes());
        }

        if let Some(password) = &self.password {
            connect_options = connect_options.password(password.expose_secret());
        }

        if let Some(options) = options {
            connect_options = connect_options.options(options.to_key_value_pairs());
        }

        connect_options
    }

    fn with_db(&self, options: Option<&PgConnectionOptions>) -> PgConnectOptions {
        let connect_options: PgConnectOptions = self.without_db(options);
        connect_options.database(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_options_carry_application_name_and_timeouts() {
        let pairs = API_CONNECTION_OPTIONS.to_key_value_pairs();

        assert_eq!(pairs.len(), 7);
        assert!(pairs.contains(&("application_name".to_string(), "hiring_api".to_string())));
        assert!(pairs.contains(&("statement_timeout".to_string(), "30000".to_string())));
        assert!(pairs.contains(&("timezone".to_string(), "UTC".to_string())));
    }

    #[test]
    fn migration_options_allow_longer_statements() {
        assert!(
            MIGRATION_CONNECTION_OPTIONS.statement_timeout
                > API_CONNECTION_OPTIONS.statement_timeout
        );
    }

    #[test]
    fn connection_config_defaults_to_disabled_tls() {
        let config: PgConnectionConfig = serde_json::from_str(
            r#"{
                "host": "localhost",
                "port": 5432,
                "name": "hiring",
                "username": "postgres",
                "password": "postgres"
            }"#,
        )
        .unwrap();

        assert!(!config.tls.enabled);
        assert_eq!(config.password.unwrap().expose_secret(), "postgres");
    }
}
