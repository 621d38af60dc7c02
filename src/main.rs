use clap::Parser;
use controls_report::config::toml_config::TomlConfig;
use controls_report::core::Storage;
use controls_report::utils::{logger, validation::Validate};
use controls_report::{CliConfig, ControlFetcher, LocalStorage, ReportEngine, ReportSettings};

fn resolve_settings(config: &CliConfig) -> controls_report::Result<ReportSettings> {
    let settings = match &config.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            TomlConfig::from_file(path)?.report_settings()
        }
        None => config.report_settings(),
    };
    settings.validate()?;
    Ok(settings)
}

async fn run(config: &CliConfig, settings: ReportSettings) -> controls_report::Result<String> {
    let style = settings.style;
    let engine = ReportEngine::new(ControlFetcher::new(settings)?, style);
    let report = engine.generate(config.org_id.trim()).await?;

    let storage = LocalStorage::new(config.output_path.clone());
    let path = storage.write_file(&report.filename, &report.bytes).await?;
    tracing::info!(
        "Wrote {} controls for organization {} to {}",
        report.control_count,
        report.org_id,
        path
    );
    Ok(path)
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting controls-report CLI");
    if config.verbose {
        tracing::debug!("CLI config: org_id={}, output_path={}", config.org_id, config.output_path);
    }

    let settings = match config.validate().and_then(|_| resolve_settings(&config)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    };

    match run(&config, settings).await {
        Ok(output_path) => {
            tracing::info!("✅ Report generated successfully!");
            println!("✅ Report saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("❌ Report generation failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
