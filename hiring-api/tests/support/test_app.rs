#![allow(dead_code)]

use std::io;
use std::net::TcpListener;
use std::time::Duration;

use hiring_api::config::{ApiConfig, ApplicationSettings};
use hiring_api::startup::run;
use hiring_postgres::sqlx::test_utils::drop_pg_database;
use serde_json::Value;
use sqlx::PgPool;
use tokio::runtime::Handle;
use tokio::time::sleep;

use crate::support::database::{create_hiring_api_database, get_test_db_config};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub pool: PgPool,
    config: ApiConfig,
    server_handle: tokio::task::JoinHandle<io::Result<()>>,
}

impl TestApp {
    pub async fn health_check(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn read_openapi(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/api-docs/openapi.json", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn upload(&self, table_name: &str, contents: &str) -> reqwest::Response {
        self.api_client
            .post(format!("{}/upload/{table_name}", &self.address))
            .header("content-type", "text/csv")
            .body(contents.to_string())
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn batch_insert(&self, table_name: &str, rows: &Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/batch-insert/{table_name}", &self.address))
            .json(rows)
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn read_hire_quarters(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/metrics/employee-hire-quarters", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn read_departments_above_average(&self) -> reqwest::Response {
        self.api_client
            .get(format!(
                "{}/metrics/departments-hired-above-average",
                &self.address
            ))
            .send()
            .await
            .expect("failed to execute request")
    }

    /// Counts the rows currently stored in `table_name`.
    pub async fn count_rows(&self, table_name: &str) -> i64 {
        let query = format!("select count(*) from app.{table_name}");
        sqlx::query_scalar::<_, i64>(&query)
            .fetch_one(&self.pool)
            .await
            .expect("failed to count rows")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        // First, abort the server task to ensure it's terminated.
        self.server_handle.abort();

        // To use `block_in_place,` we need a multithreaded runtime since when a blocking
        // task is issued, the runtime will offload existing tasks to another worker.
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tokio::task::block_in_place(|| {
                Handle::current().block_on(async {
                    // Give server time to shut down gracefully.
                    sleep(Duration::from_millis(100)).await;

                    drop_pg_database(&self.config.database).await;
                });
            });
        }));
    }
}

pub async fn spawn_test_app() -> TestApp {
    let base_address = "127.0.0.1";
    let listener =
        TcpListener::bind(format!("{base_address}:0")).expect("failed to bind random port");
    let port = listener
        .local_addr()
        .expect("failed to read local address")
        .port();

    let database_config = get_test_db_config();
    let pool = create_hiring_api_database(&database_config).await;

    let config = ApiConfig {
        database: database_config,
        application: ApplicationSettings {
            host: base_address.to_string(),
            port,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        },
    };

    let server = run(&config, listener, pool.clone())
        .await
        .expect("failed to bind address");

    let server_handle = tokio::spawn(server);

    TestApp {
        address: format!("http://{base_address}:{port}"),
        api_client: reqwest::Client::new(),
        pool,
        config,
        server_handle,
    }
}
