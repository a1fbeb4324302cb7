//! Registry configuration

use serde::{Deserialize, Serialize};

use crate::types::{RegistryError, Result};

/// Default ceiling on the number of authorized administrators
pub const DEFAULT_ADMIN_LIMIT: usize = 5;

/// Construction-time configuration for a [`crate::Rollbook`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbookConfig {
    /// Maximum number of authorized administrators (owner included)
    pub admin_limit: usize,
}

impl Default for RollbookConfig {
    fn default() -> Self {
        Self {
            admin_limit: DEFAULT_ADMIN_LIMIT,
        }
    }
}

impl RollbookConfig {
    /// Validate configuration before constructing a registry
    pub fn validate(&self) -> Result<()> {
        if self.admin_limit == 0 {
            return Err(RegistryError::invariant(
                "admin limit must allow at least the owner",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RollbookConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = RollbookConfig { admin_limit: 0 };
        assert!(config.validate().is_err());
    }
}
