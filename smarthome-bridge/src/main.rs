use std::process::ExitCode;
use std::sync::Arc;

use smarthome_bridge::configs::Settings;
use smarthome_bridge::run;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::new() {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            eprintln!("Failed to load settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level}").into()
        }))
        .init();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("cannot listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("interrupt received, shutting down");
    };

    match run(&settings, shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
