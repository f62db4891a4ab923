//! Table configuration.
//!
//! The engine has two tunable limits. Both can come from the environment.
//!
//! # Environment Variables
//!
//! - `TOUCHSTONE_MAX_PAGES`: Page-count ceiling for a table file (default: `100`)
//! - `TOUCHSTONE_INTERNAL_NODE_MAX_CELLS`: Keys an internal node holds before it
//!   splits (default: `3`)
//!
//! # Invariants
//!
//! After `validate()` succeeds:
//! - `max_pages >= 1`
//! - `2 <= internal_node_max_cells <= INTERNAL_NODE_MAX_CELLS_LIMIT`

use crate::storage::btree::INTERNAL_NODE_MAX_CELLS_LIMIT;

/// Limits for one open table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Most pages the table file may span. Inserts that would need more fail
    /// with a table-full error.
    pub max_pages: u32,
    /// Keys an internal node holds before the next insert into it splits it.
    pub internal_node_max_cells: u32,
}

/// Error returned when loading or validating configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_pages: Self::DEFAULT_MAX_PAGES,
            internal_node_max_cells: Self::DEFAULT_INTERNAL_NODE_MAX_CELLS,
        }
    }
}

impl TableConfig {
    /// Default page-count ceiling.
    pub const DEFAULT_MAX_PAGES: u32 = 100;
    /// Default internal-node fan-out, kept small so splits happen early.
    pub const DEFAULT_INTERNAL_NODE_MAX_CELLS: u32 = 3;

    const MAX_PAGES_VAR: &'static str = "TOUCHSTONE_MAX_PAGES";
    const INTERNAL_NODE_MAX_CELLS_VAR: &'static str = "TOUCHSTONE_INTERNAL_NODE_MAX_CELLS";

    /// Load configuration from environment variables, falling back to the
    /// defaults for unset ones.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but is not a number, or if the
    /// resulting configuration fails `validate`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from any name-to-value source. `from_env` passes
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            max_pages: Self::load_u32(&lookup, Self::MAX_PAGES_VAR, Self::DEFAULT_MAX_PAGES)?,
            internal_node_max_cells: Self::load_u32(
                &lookup,
                Self::INTERNAL_NODE_MAX_CELLS_VAR,
                Self::DEFAULT_INTERNAL_NODE_MAX_CELLS,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    fn load_u32(
        lookup: &impl Fn(&str) -> Option<String>,
        name: &str,
        default: u32,
    ) -> Result<u32, ConfigError> {
        match lookup(name) {
            Some(value) => value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                message: format!("'{value}' is not a non-negative integer"),
            }),
            None => Ok(default),
        }
    }

    /// Check both limits are in range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first setting out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::MAX_PAGES_VAR.to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if !(2..=INTERNAL_NODE_MAX_CELLS_LIMIT).contains(&self.internal_node_max_cells) {
            return Err(ConfigError::InvalidValue {
                name: Self::INTERNAL_NODE_MAX_CELLS_VAR.to_string(),
                message: format!(
                    "{} is outside 2..={INTERNAL_NODE_MAX_CELLS_LIMIT}",
                    self.internal_node_max_cells
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TableConfig::default();
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.internal_node_max_cells, 3);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_zero_pages() {
        let config = TableConfig {
            max_pages: 0,
            ..TableConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { name, .. }) if name == "TOUCHSTONE_MAX_PAGES"
        ));
    }

    #[test]
    fn test_validate_fan_out_bounds() {
        for cells in [0, 1, INTERNAL_NODE_MAX_CELLS_LIMIT + 1] {
            let config = TableConfig {
                internal_node_max_cells: cells,
                ..TableConfig::default()
            };
            assert!(config.validate().is_err(), "{cells} should be rejected");
        }

        for cells in [2, INTERNAL_NODE_MAX_CELLS_LIMIT] {
            let config = TableConfig {
                internal_node_max_cells: cells,
                ..TableConfig::default()
            };
            assert_eq!(config.validate(), Ok(()));
        }
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_unset_variables_use_defaults() {
        let config = TableConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config, TableConfig::default());
    }

    #[test]
    fn test_reads_both_variables() {
        let config = TableConfig::from_lookup(lookup(&[
            ("TOUCHSTONE_MAX_PAGES", " 250 "),
            ("TOUCHSTONE_INTERNAL_NODE_MAX_CELLS", "7"),
        ]))
        .expect("valid config");
        assert_eq!(
            config,
            TableConfig {
                max_pages: 250,
                internal_node_max_cells: 7,
            }
        );
    }

    #[test]
    fn test_rejects_non_numeric_value() {
        let err = TableConfig::from_lookup(lookup(&[("TOUCHSTONE_MAX_PAGES", "lots")]))
            .expect_err("not a number");
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "TOUCHSTONE_MAX_PAGES".to_string(),
                message: "'lots' is not a non-negative integer".to_string(),
            }
        );

        let err = TableConfig::from_lookup(lookup(&[("TOUCHSTONE_INTERNAL_NODE_MAX_CELLS", "-3")]))
            .expect_err("negative");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name, .. } if name == "TOUCHSTONE_INTERNAL_NODE_MAX_CELLS"
        ));
    }

    #[test]
    fn test_rejects_out_of_range_value() {
        let err = TableConfig::from_lookup(lookup(&[("TOUCHSTONE_INTERNAL_NODE_MAX_CELLS", "1")]))
            .expect_err("fan-out too small");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name, .. } if name == "TOUCHSTONE_INTERNAL_NODE_MAX_CELLS"
        ));

        let err = TableConfig::from_lookup(lookup(&[("TOUCHSTONE_MAX_PAGES", "0")]))
            .expect_err("no pages");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name, .. } if name == "TOUCHSTONE_MAX_PAGES"
        ));
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::InvalidValue {
            name: "TOUCHSTONE_MAX_PAGES".to_string(),
            message: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for TOUCHSTONE_MAX_PAGES: must be at least 1"
        );
    }
}
