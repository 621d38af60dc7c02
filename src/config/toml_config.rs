use crate::config::{
    AuthLevel, EndpointSettings, ReportSettings, ReportStyle, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub report: Option<ReportConfig>,
    pub endpoint: Option<EndpointConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub page_size: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub verify_tls: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub style: Option<ReportStyle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub route_prefix: Option<String>,
    pub auth_level: Option<AuthLevel>,
    pub function_key: Option<String>,
    pub allow_any_method: Option<bool>,
    pub expose_error_detail: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ONETRUST_TOKEN})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReportError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn report_settings(&self) -> ReportSettings {
        let source = &self.source;
        ReportSettings {
            base_url: source
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            // An unresolved placeholder means the variable was never set.
            token: source
                .token
                .clone()
                .filter(|token| !token.trim().is_empty() && !token.starts_with("${")),
            page_size: source.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            timeout_seconds: source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            verify_tls: source.verify_tls.unwrap_or(true),
            style: self
                .report
                .as_ref()
                .and_then(|report| report.style)
                .unwrap_or_default(),
        }
    }

    pub fn endpoint_settings(&self) -> EndpointSettings {
        let defaults = EndpointSettings::default();
        let Some(endpoint) = &self.endpoint else {
            return defaults;
        };
        EndpointSettings {
            route_prefix: endpoint
                .route_prefix
                .clone()
                .unwrap_or(defaults.route_prefix),
            auth_level: endpoint.auth_level.unwrap_or(defaults.auth_level),
            function_key: endpoint
                .function_key
                .clone()
                .filter(|key| !key.trim().is_empty() && !key.starts_with("${")),
            allow_any_method: endpoint
                .allow_any_method
                .unwrap_or(defaults.allow_any_method),
            expose_error_detail: endpoint
                .expose_error_detail
                .unwrap_or(defaults.expose_error_detail),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.report_settings().validate()?;
        self.endpoint_settings().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[source]
base_url = "https://grc.example.com/api/controls/v1/control-implementations/pages"
token = "${CONTROLS_REPORT_TEST_TOKEN}"
page_size = 25
verify_tls = false

[report]
style = "basic"

[endpoint]
route_prefix = "/"
auth_level = "anonymous"
expose_error_detail = false
"#;

    #[test]
    fn test_parse_full_config() {
        std::env::set_var("CONTROLS_REPORT_TEST_TOKEN", "abc123");
        let config = TomlConfig::from_toml_str(SAMPLE).unwrap();
        let settings = config.report_settings();

        assert_eq!(
            settings.base_url,
            "https://grc.example.com/api/controls/v1/control-implementations/pages"
        );
        assert_eq!(settings.token.as_deref(), Some("abc123"));
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.timeout_seconds, 60);
        assert!(!settings.verify_tls);
        assert_eq!(settings.style, ReportStyle::Basic);

        let endpoint = config.endpoint_settings();
        assert_eq!(endpoint.auth_level, AuthLevel::Anonymous);
        assert_eq!(endpoint.normalized_prefix(), "");
        assert!(!endpoint.expose_error_detail);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unset_placeholder_leaves_token_empty() {
        let config = TomlConfig::from_toml_str(
            r#"
[source]
token = "${CONTROLS_REPORT_UNSET_VARIABLE}"
"#,
        )
        .unwrap();
        let settings = config.report_settings();
        assert_eq!(settings.token, None);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.style, ReportStyle::Detailed);
        assert_eq!(config.endpoint_settings(), EndpointSettings::default());
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        let err = TomlConfig::from_toml_str("[source\nbase_url = 1").unwrap_err();
        assert!(matches!(err, ReportError::ConfigError { .. }));
    }
}
