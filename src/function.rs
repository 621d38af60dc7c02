//! HTTP entry point for the controls report.
//!
//! Runs as an Azure Functions custom handler (the host forwards requests to
//! `FUNCTIONS_CUSTOMHANDLER_PORT`) or standalone on `PORT`.

use anyhow::Result;
use controls_report::config::toml_config::TomlConfig;
use controls_report::config::{EndpointSettings, ReportSettings};
use controls_report::handler::{router, AppState};
use controls_report::utils::{logger, validation::Validate};
use controls_report::{ControlFetcher, ReportEngine};
use std::net::SocketAddr;
use std::sync::Arc;

fn load_settings() -> controls_report::Result<(ReportSettings, EndpointSettings)> {
    match std::env::var("REPORT_CONFIG") {
        Ok(path) if !path.trim().is_empty() => {
            tracing::info!("Loading configuration from {}", path);
            let config = TomlConfig::from_file(path.trim())?;
            Ok((config.report_settings(), config.endpoint_settings()))
        }
        _ => Ok((ReportSettings::from_env()?, EndpointSettings::from_env()?)),
    }
}

fn listen_port() -> u16 {
    ["FUNCTIONS_CUSTOMHANDLER_PORT", "PORT"]
        .iter()
        .find_map(|name| std::env::var(name).ok().and_then(|p| p.parse().ok()))
        .unwrap_or(7071)
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init_function_logger();

    let (settings, endpoint) = load_settings()?;
    settings.validate()?;
    endpoint.validate()?;

    let style = settings.style;
    let fetcher = ControlFetcher::new(settings)?;
    let state = Arc::new(AppState::new(ReportEngine::new(fetcher, style), endpoint));
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], listen_port()));
    tracing::info!("Controls report function listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
