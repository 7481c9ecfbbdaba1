pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_range, validate_url};

#[cfg(feature = "cli")]
use crate::adapters::pokeapi::DEFAULT_BASE_URL;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_one_of, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Checks shared by every configuration source.
pub(crate) fn validate_settings(
    base_url: &str,
    page_size: usize,
    concurrent_requests: usize,
    timeout_seconds: u64,
) -> Result<()> {
    validate_url("api_base_url", base_url)?;
    validate_range("page_size", page_size, 1, MAX_PAGE_SIZE)?;
    validate_positive_number("concurrent_requests", concurrent_requests, 1)?;
    validate_range("timeout_seconds", timeout_seconds, 1, 300)?;
    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "pokedex-browser")]
#[command(about = "Browse Pokémon page by page, optionally filtered by up to two types")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,

    /// Type filter, repeatable or comma separated (at most two)
    #[arg(short = 't', long = "type", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Page number; missing, non-numeric or non-positive values mean page 1
    #[arg(short, long, allow_hyphen_values = true)]
    pub page: Option<String>,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    #[arg(long, default_value_t = crate::core::selection::DEFAULT_CONCURRENT_REQUESTS)]
    pub concurrent_requests: usize,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    pub format: String,

    #[arg(long, help = "List the available types instead of a page")]
    pub list_types: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(
            &self.api_base_url,
            self.page_size,
            self.concurrent_requests,
            self.timeout_seconds,
        )?;
        validate_one_of(
            "format",
            &self.format.to_lowercase(),
            &crate::app::render::OutputFormat::NAMES,
        )
    }
}
