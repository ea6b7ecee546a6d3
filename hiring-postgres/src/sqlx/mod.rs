use hiring_config::shared::{IntoConnectOptions, PgConnectionConfig, PgConnectionOptions};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[cfg(feature = "test-utils")]
pub mod test_utils;

/// Maximum number of pooled connections serving requests.
const MAX_POOL_CONNECTIONS: u32 = 10;

/// Creates a lazily connecting pool for the configured database.
///
/// No connection is opened until the first query, so building the pool never
/// fails; connection errors surface on use.
pub fn lazy_pool(config: &PgConnectionConfig, options: &PgConnectionOptions) -> PgPool {
    info!(
        host = config.host,
        port = config.port,
        dbname = config.name,
        username = config.username,
        tls_enabled = config.tls.enabled,
        application_name = options.application_name,
        "creating postgres connection pool",
    );

    PgPoolOptions::new()
        .max_connections(MAX_POOL_CONNECTIONS)
        .connect_lazy_with(config.with_db(Some(options)))
}
