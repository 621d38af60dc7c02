use crate::config::{
    ReportSettings, ReportStyle, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECONDS,
};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "controls-report")]
#[command(about = "Generate a PDF summary of an organization's compliance controls")]
pub struct CliConfig {
    #[arg(long, help = "Organization identifier to report on")]
    pub org_id: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, env = "ONETRUST_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "ONETRUST_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    #[arg(long, help = "Skip TLS certificate verification for upstream requests")]
    pub insecure: bool,

    #[arg(long, value_enum, default_value_t = ReportStyle::Detailed)]
    pub style: ReportStyle,

    #[arg(long, help = "TOML file overriding the upstream and report settings")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            base_url: self.base_url.clone(),
            token: self.token.clone().filter(|token| !token.trim().is_empty()),
            page_size: self.page_size,
            timeout_seconds: self.timeout_seconds,
            verify_tls: !self.insecure,
            style: self.style,
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("org_id", &self.org_id)?;
        validate_path("output_path", &self.output_path)?;
        self.report_settings().validate()
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        Ok(full_path.display().to_string())
    }
}
