//! Adapter configuration.
//!
//! Only plain data lives here; the item type resolver is a function and is
//! supplied through [`RecyclerAdapterBuilder`](crate::RecyclerAdapterBuilder).
//!
//! ```
//! use horizon_recycler::AdapterConfig;
//!
//! let config = AdapterConfig::from_toml_str(r#"
//! default_view_type = 2
//! load_more_threshold = 5
//! "#).unwrap();
//! assert_eq!(config.default_view_type, 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::view::ViewType;

/// Recognized adapter options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Type returned by the default item type resolver.
    pub default_view_type: i32,
    /// Number of positions before the end at which a
    /// [`LoadMoreTrigger`](crate::LoadMoreTrigger) built from this config fires.
    pub load_more_threshold: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            default_view_type: ViewType::DEFAULT.get(),
            load_more_threshold: 0,
        }
    }
}

impl AdapterConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// The default view type as a [`ViewType`].
    pub fn default_view_type(&self) -> ViewType {
        ViewType::new(self.default_view_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterError;

    #[test]
    fn test_defaults() {
        let config = AdapterConfig::default();
        assert_eq!(config.default_view_type(), ViewType::DEFAULT);
        assert_eq!(config.load_more_threshold, 0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AdapterConfig::from_toml_str("load_more_threshold = 3").unwrap();
        assert_eq!(config.default_view_type, 0);
        assert_eq!(config.load_more_threshold, 3);
    }

    #[test]
    fn test_invalid_toml() {
        let err = AdapterConfig::from_toml_str("default_view_type = \"zero\"").unwrap_err();
        assert!(matches!(err, AdapterError::Config(_)));
    }
}
