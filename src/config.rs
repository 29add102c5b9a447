//! Runtime configuration.
//!
//! ```json
//! { "lookup": "scan" }
//! ```

use serde::{Deserialize, Serialize};

use crate::Result;

/// How a [`DependencyMap`](crate::dependency::DependencyMap) finds direct dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStrategy {
    /// Keep a reverse index beside the canonical edges.
    #[default]
    Indexed,
    /// Scan every dependency list on each lookup.
    Scan,
}

/// Configuration for observable objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lookup: LookupStrategy,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_defaults_to_indexed() {
        assert_eq!(Config::from_json("{}").unwrap().lookup, LookupStrategy::Indexed);
    }

    #[test]
    fn test_parse_scan() {
        let config = Config::from_json(r#"{"lookup": "scan"}"#).unwrap();
        assert_eq!(config.lookup, LookupStrategy::Scan);
    }

    #[test]
    fn test_malformed_is_config_error() {
        assert!(matches!(Config::from_json(r#"{"lookup": 3}"#), Err(Error::Config(_))));
    }
}
