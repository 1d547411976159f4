use orderdesk_core::ConfigError;
use orderdesk_core::config::{env_lookup, read_var};

/// Storefront session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Quantity pre-selected for every product until the user changes it.
    pub default_quantity: i64,
}

impl StorefrontConfig {
    pub const DEFAULT_QUANTITY_VAR: &'static str = "ORDERDESK_DEFAULT_QUANTITY";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_quantity = read_var(&lookup, Self::DEFAULT_QUANTITY_VAR, 1i64)?;
        if default_quantity <= 0 {
            return Err(ConfigError::OutOfRange {
                key: Self::DEFAULT_QUANTITY_VAR,
                message: format!("must be positive, got {default_quantity}"),
            });
        }
        Ok(Self { default_quantity })
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self { default_quantity: 1 }
    }
}
