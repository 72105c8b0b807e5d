//! Configuration management for Lodestone
//!
//! This module provides a centralized configuration system that supports:
//! - YAML configuration files
//! - Environment variable overrides
//! - Reasonable defaults
//! - Configuration validation

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::paging::PageRequestPolicy;

/// Root configuration structure for Lodestone
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LodestoneConfig {
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Retrieval cursor limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Page-size ceiling applied when the caller requests "no limit".
    pub max_page_size: usize,

    /// Maximum number of consecutive empty, non-terminal pages the
    /// entity cursor tolerates before the retrieval is declared
    /// inconclusive.
    pub empty_page_retry_ceiling: usize,
}

impl ScanConfig {
    /// Default ceiling for consecutive empty-page retries.
    pub const DEFAULT_EMPTY_PAGE_RETRY_CEILING: usize = 1_000;
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_page_size: PageRequestPolicy::DEFAULT_MAX_PAGE_SIZE,
            empty_page_retry_ceiling: Self::DEFAULT_EMPTY_PAGE_RETRY_CEILING,
        }
    }
}

impl LodestoneConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest priority)
    /// 2. Config file specified by LODESTONE_CONFIG env var
    /// 3. ./config/lodestone.yaml
    /// 4. /etc/lodestone/lodestone.yaml
    /// 5. Hardcoded defaults (lowest priority)
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Set defaults
        builder = Self::set_defaults(builder)?;

        // Load from files (in order of precedence)
        if let Ok(config_path) = std::env::var("LODESTONE_CONFIG") {
            builder = builder.add_source(File::with_name(&config_path).required(false));
        }

        builder = builder
            .add_source(File::with_name("./config/lodestone").required(false))
            .add_source(File::with_name("/etc/lodestone/lodestone").required(false));

        // Override with environment variables
        // Example: LODESTONE_SCAN__MAX_PAGE_SIZE=200
        builder = builder.add_source(
            Environment::with_prefix("LODESTONE")
                .separator("__")
                .try_parsing(true),
        );

        let config: LodestoneConfig = builder.build()?.try_deserialize()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Set default values for all configuration options
    fn set_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default(
                "scan.max_page_size",
                PageRequestPolicy::DEFAULT_MAX_PAGE_SIZE as u64,
            )?
            .set_default(
                "scan.empty_page_retry_ceiling",
                ScanConfig::DEFAULT_EMPTY_PAGE_RETRY_CEILING as u64,
            )
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.max_page_size == 0 {
            return Err(ConfigError::Message(
                "scan.max_page_size must be > 0".to_string(),
            ));
        }

        if self.scan.empty_page_retry_ceiling == 0 {
            return Err(ConfigError::Message(
                "scan.empty_page_retry_ceiling must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
