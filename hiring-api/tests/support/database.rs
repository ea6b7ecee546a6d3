use hiring_api::config::ApiConfig;
use hiring_api::startup::migrate;
use hiring_config::load_config;
use hiring_config::shared::PgConnectionConfig;
use hiring_postgres::sqlx::test_utils::create_pg_database;
use sqlx::PgPool;
use uuid::Uuid;

/// Database settings of the test environment, pointing at a fresh database name.
pub fn get_test_db_config() -> PgConnectionConfig {
    let mut config = load_config::<ApiConfig>()
        .expect("failed to read configuration")
        .database;
    config.name = Uuid::new_v4().to_string();

    config
}

/// Creates the database described by `config` and applies the migrations.
pub async fn create_hiring_api_database(config: &PgConnectionConfig) -> PgPool {
    let connection_pool = create_pg_database(config).await;

    migrate(&connection_pool)
        .await
        .expect("failed to migrate database");

    connection_pool
}
