use orderdesk_cart::StorefrontConfig;
use orderdesk_core::ConfigError;
use orderdesk_core::config::{env_lookup, read_var};
use orderdesk_orders::PipelineConfig;
use orderdesk_products::catalog::DEFAULT_LIMIT;

/// Everything the runtime reads from the environment, in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of products one catalog query returns.
    pub catalog_limit: usize,
    pub pipeline: PipelineConfig,
    pub storefront: StorefrontConfig,
}

impl RuntimeConfig {
    pub const CATALOG_LIMIT_VAR: &'static str = "ORDERDESK_CATALOG_LIMIT";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let catalog_limit = read_var(&lookup, Self::CATALOG_LIMIT_VAR, DEFAULT_LIMIT)?;
        if catalog_limit == 0 {
            return Err(ConfigError::OutOfRange {
                key: Self::CATALOG_LIMIT_VAR,
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            catalog_limit,
            pipeline: PipelineConfig::from_lookup(&lookup)?,
            storefront: StorefrontConfig::from_lookup(&lookup)?,
        })
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            catalog_limit: DEFAULT_LIMIT,
            pipeline: PipelineConfig::default(),
            storefront: StorefrontConfig::default(),
        }
    }
}
