use crate::config::{parse_env, parse_env_bool};
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_required_field, Validate};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Authorization applied to inbound report requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLevel {
    Anonymous,
    /// Caller must present the function key (`x-functions-key` or `?code=`).
    #[default]
    Function,
}

impl FromStr for AuthLevel {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anonymous" => Ok(AuthLevel::Anonymous),
            "function" => Ok(AuthLevel::Function),
            other => Err(ReportError::InvalidConfigValueError {
                field: "auth_level".to_string(),
                value: other.to_string(),
                reason: "Expected one of: anonymous, function".to_string(),
            }),
        }
    }
}

/// Inbound HTTP behaviour of the report function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSettings {
    pub route_prefix: String,
    pub auth_level: AuthLevel,
    pub function_key: Option<String>,
    pub allow_any_method: bool,
    pub expose_error_detail: bool,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            route_prefix: "/api".to_string(),
            auth_level: AuthLevel::Function,
            function_key: None,
            allow_any_method: false,
            expose_error_detail: true,
        }
    }
}

impl EndpointSettings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            route_prefix: env::var("REPORT_ROUTE_PREFIX").unwrap_or(defaults.route_prefix),
            auth_level: parse_env("REPORT_AUTH_LEVEL")?.unwrap_or(defaults.auth_level),
            function_key: env::var("REPORT_FUNCTION_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            allow_any_method: parse_env_bool("REPORT_ALLOW_ANY_METHOD")?
                .unwrap_or(defaults.allow_any_method),
            expose_error_detail: parse_env_bool("REPORT_EXPOSE_ERROR_DETAIL")?
                .unwrap_or(defaults.expose_error_detail),
        })
    }

    /// Settings for an endpoint that anyone may call.
    pub fn anonymous() -> Self {
        Self {
            auth_level: AuthLevel::Anonymous,
            ..Self::default()
        }
    }

    /// Prefix normalised to `""` or `"/segment"` without a trailing slash.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.route_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }

    /// Whether a presented key satisfies the configured auth level.
    pub fn authorizes(&self, presented: Option<&str>) -> bool {
        match self.auth_level {
            AuthLevel::Anonymous => true,
            AuthLevel::Function => match (&self.function_key, presented) {
                (Some(expected), Some(given)) => expected == given,
                _ => false,
            },
        }
    }
}

impl Validate for EndpointSettings {
    fn validate(&self) -> Result<()> {
        if self.auth_level == AuthLevel::Function {
            let key = validate_required_field("function_key", &self.function_key)?;
            validate_non_empty_string("function_key", key)?;
        }
        Ok(())
    }
}
