#[cfg(feature = "cli")]
pub mod cli;
pub mod endpoint;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub use endpoint::{AuthLevel, EndpointSettings};

pub const DEFAULT_BASE_URL: &str =
    "https://sgr-infosec.my.onetrust.com/api/controls/v1/control-implementations/pages";
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Which report layout to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    /// Company title, average score, value and effectiveness per control.
    #[default]
    Detailed,
    /// Plain title, identifier/name/description/effectiveness per control.
    Basic,
}

impl FromStr for ReportStyle {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detailed" => Ok(ReportStyle::Detailed),
            "basic" => Ok(ReportStyle::Basic),
            other => Err(ReportError::InvalidConfigValueError {
                field: "report_style".to_string(),
                value: other.to_string(),
                reason: "Expected one of: detailed, basic".to_string(),
            }),
        }
    }
}

/// Upstream and rendering settings, built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub base_url: String,
    pub token: Option<String>,
    pub page_size: usize,
    pub timeout_seconds: u64,
    pub verify_tls: bool,
    pub style: ReportStyle,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            verify_tls: true,
            style: ReportStyle::Detailed,
        }
    }
}

impl ReportSettings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            base_url: env::var("ONETRUST_BASE_URL").unwrap_or(defaults.base_url),
            token: env::var("ONETRUST_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            page_size: parse_env("ONETRUST_PAGE_SIZE")?.unwrap_or(defaults.page_size),
            timeout_seconds: parse_env("ONETRUST_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.timeout_seconds),
            verify_tls: parse_env_bool("ONETRUST_VERIFY_TLS")?.unwrap_or(defaults.verify_tls),
            style: parse_env("REPORT_STYLE")?.unwrap_or(defaults.style),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_style(mut self, style: ReportStyle) -> Self {
        self.style = style;
        self
    }
}

impl ConfigProvider for ReportSettings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    fn report_style(&self) -> ReportStyle {
        self.style
    }
}

impl Validate for ReportSettings {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_range("page_size", self.page_size, 1, 1000)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;

        if self.token.is_none() {
            tracing::warn!("ONETRUST_TOKEN is not set; upstream requests will be unauthenticated");
        }
        if !self.verify_tls {
            tracing::warn!("TLS certificate verification is disabled for upstream requests");
        }
        Ok(())
    }
}

pub(crate) fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ReportError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        _ => Ok(None),
    }
}

pub(crate) fn parse_env_bool(name: &str) -> Result<Option<bool>> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => parse_bool(name, &raw).map(Some),
        _ => Ok(None),
    }
}

pub(crate) fn parse_bool(field: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ReportError::InvalidConfigValueError {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "Expected a boolean (true/false)".to_string(),
        }),
    }
}
