pub mod config;
pub mod core;
pub mod domain;
#[cfg(feature = "function")]
pub mod handler;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, LocalStorage};

pub use config::{EndpointSettings, ReportSettings, ReportStyle};
pub use crate::core::{engine::ReportEngine, fetcher::ControlFetcher};
pub use utils::error::{ReportError, Result};
