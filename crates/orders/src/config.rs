use orderdesk_core::ConfigError;
use orderdesk_core::config::{env_lookup, read_flag};

/// Pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Check requested quantities against product stock in the before phases.
    pub enforce_stock: bool,
}

impl PipelineConfig {
    pub const ENFORCE_STOCK_VAR: &'static str = "ORDERDESK_ENFORCE_STOCK";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            enforce_stock: read_flag(&lookup, Self::ENFORCE_STOCK_VAR, true)?,
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { enforce_stock: true }
    }
}
