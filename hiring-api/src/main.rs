use std::env;

use anyhow::{Context, anyhow};
use hiring_api::{config::ApiConfig, startup::Application};
use hiring_telemetry::tracing::init_tracing;
use tracing::{error, info};

/// Entry point for the hiring API service.
///
/// Without arguments the HTTP server is started; `migrate` only applies the
/// database migrations and exits.
fn main() -> anyhow::Result<()> {
    // Initialize tracing from the binary name
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    actix_web::rt::System::new().block_on(async_main())?;

    Ok(())
}

async fn async_main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        // Run the application server
        [] => {
            let config = load_api_config()?;
            info!(application = %config.application, "starting hiring api");
            let application = Application::build(config).await?;
            info!(port = application.port(), "hiring api listening");
            application.run_until_stopped().await?;
        }
        [command] if command == "migrate" => {
            let config = load_api_config()?;
            Application::migrate_database(&config.database).await?;
            info!("database migrated successfully");
        }
        [command] => {
            error!(%command, "invalid command");
            return Err(anyhow!("invalid command: {command}"));
        }
        _ => {
            error!("invalid number of command line arguments");
            return Err(anyhow!("invalid number of command line arguments"));
        }
    }

    Ok(())
}

fn load_api_config() -> anyhow::Result<ApiConfig> {
    hiring_config::load_config::<ApiConfig>().context("loading hiring api configuration")
}
