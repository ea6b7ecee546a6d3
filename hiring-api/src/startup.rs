use std::net::TcpListener;

use actix_web::{
    App, HttpResponse, HttpServer, dev::Server, error::InternalError, web,
};
use hiring_config::shared::{
    API_CONNECTION_OPTIONS, MIGRATION_CONNECTION_OPTIONS, PgConnectionConfig,
};
use hiring_postgres::sqlx::lazy_pool;
use sqlx::PgPool;
use sqlx::migrate::MigrateError;
use tracing::info;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;

use crate::{
    config::ApiConfig,
    reports::{DepartmentHires, HireQuarters},
    routes::{
        ErrorMessage, MessageResponse,
        api_docs::openapi_json,
        health_check::health_check,
        ingest::{batch_insert, upload_file},
        metrics::{departments_hired_above_average, employee_hire_quarters},
    },
};

/// Hiring API application server wrapper.
///
/// Owns the bound listener's port and the running HTTP server.
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Builds the API application server.
    ///
    /// Applies pending migrations, so the tables exist before the first request,
    /// then binds the listener and configures every route.
    pub async fn build(config: ApiConfig) -> anyhow::Result<Self> {
        Self::migrate_database(&config.database).await?;

        let connection_pool = get_connection_pool(&config.database);

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(&config, listener, connection_pool).await?;

        Ok(Self { port, server })
    }

    /// Runs database migrations on the configured database.
    pub async fn migrate_database(config: &PgConnectionConfig) -> Result<(), anyhow::Error> {
        let connection_pool = lazy_pool(config, &MIGRATION_CONNECTION_OPTIONS);

        migrate(&connection_pool).await?;
        info!(dbname = config.name, "database schema is up to date");

        Ok(())
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Runs the server until it receives a shutdown signal.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// Applies the migrations embedded in the binary. Already applied ones are skipped.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Creates the pool serving API requests.
pub fn get_connection_pool(config: &PgConnectionConfig) -> PgPool {
    lazy_pool(config, &API_CONNECTION_OPTIONS)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health_check::health_check,
        crate::routes::ingest::upload_file,
        crate::routes::ingest::batch_insert,
        crate::routes::metrics::employee_hire_quarters,
        crate::routes::metrics::departments_hired_above_average,
    ),
    components(schemas(ErrorMessage, MessageResponse, HireQuarters, DepartmentHires)),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Ingestion", description = "Loading rows into the hiring tables"),
        (name = "Metrics", description = "Hiring reports for 2021")
    )
)]
pub struct ApiDoc;

/// Creates the HTTP server with all routes and middleware.
pub async fn run(
    config: &ApiConfig,
    listener: TcpListener,
    connection_pool: PgPool,
) -> Result<Server, anyhow::Error> {
    let max_upload_bytes = config.application.max_upload_bytes;
    let connection_pool = web::Data::new(connection_pool);
    let openapi = web::Data::new(ApiDoc::openapi());

    let server = HttpServer::new(move || {
        let tracing_logger = TracingLogger::default();
        App::new()
            .wrap(tracing_logger)
            .app_data(json_config(max_upload_bytes))
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .app_data(connection_pool.clone())
            .app_data(openapi.clone())
            .service(health_check)
            .service(openapi_json)
            // ingestion
            .service(upload_file)
            .service(batch_insert)
            // metrics
            .service(employee_hire_quarters)
            .service(departments_hired_above_average)
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Rejects undecodable JSON bodies with the same error shape as every other failure.
fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(ErrorMessage {
                error: format!("Error processing batch: {err}"),
            });
            InternalError::from_response(err, response).into()
        })
}
