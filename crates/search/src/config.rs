//! Engine configuration.
//!
//! Configuration can be built programmatically, parsed from command line
//! arguments, or read from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LABBASE_DEFAULT_CACHE_MODE` | NO_CACHE | Cache mode when fetch options leave it unset |
//! | `LABBASE_CACHE_ENABLED` | true | When false, every search runs as NO_CACHE |
//! | `LABBASE_LOG_LEVEL` | info | Log level |
//! | `LABBASE_MAX_PAGE_SIZE` | 10000 | Largest accepted page `count` |
//!
//! # Example
//!
//! ```rust
//! use labbase_search::EngineConfig;
//! use labbase_search::types::CacheMode;
//!
//! let config = EngineConfig {
//!     default_cache_mode: CacheMode::Cache,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use clap::Parser;

use crate::types::CacheMode;

/// Search engine configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "labbase-search")]
#[command(about = "LabBase search engine")]
pub struct EngineConfig {
    /// Cache mode used when the fetch options do not set one.
    #[arg(
        long,
        env = "LABBASE_DEFAULT_CACHE_MODE",
        default_value = "NO_CACHE",
        value_parser = parse_cache_mode
    )]
    pub default_cache_mode: CacheMode,

    /// Enables the result cache.
    #[arg(long, env = "LABBASE_CACHE_ENABLED", default_value = "true")]
    pub cache_enabled: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "LABBASE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum page size a search may request.
    #[arg(long, env = "LABBASE_MAX_PAGE_SIZE", default_value = "10000")]
    pub max_page_size: usize,
}

fn parse_cache_mode(s: &str) -> Result<CacheMode, String> {
    CacheMode::parse(s).map_err(|e| e.to_string())
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_cache_mode: CacheMode::NoCache,
            cache_enabled: true,
            log_level: "info".to_string(),
            max_page_size: 10_000,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration from environment variables.
    pub fn from_env() -> Self {
        // Try to parse from environment, falling back to defaults
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the cache mode a search actually runs with.
    pub fn effective_cache_mode(&self, requested: Option<CacheMode>) -> CacheMode {
        if !self.cache_enabled {
            return CacheMode::NoCache;
        }
        requested.unwrap_or(self.default_cache_mode)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.max_page_size == 0 {
            errors.push("Max page size cannot be 0".to_string());
        }

        if !matches!(
            self.log_level.to_ascii_lowercase().as_str(),
            "error" | "warn" | "info" | "debug" | "trace"
        ) {
            errors.push(format!("Unknown log level: {}", self.log_level));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration for testing: caching on by default.
    pub fn for_testing() -> Self {
        Self {
            default_cache_mode: CacheMode::Cache,
            log_level: "debug".to_string(),
            max_page_size: 100,
            ..Default::default()
        }
    }
}
