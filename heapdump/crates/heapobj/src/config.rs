//! Configuration Module - Dump Analysis Parameters
//!
//! Controls progress reporting and the type labels that the population
//! passes in [`ObjectTable`](crate::table::ObjectTable) treat specially.

/// Configuration for a dump's object table
///
/// # Examples
///
/// ```rust
/// use heapobj::DumpConfig;
///
/// let config = DumpConfig {
///     show_progress: true,
///     progress_interval: 4096,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpConfig {
    /// Emit progress events while population passes run
    ///
    /// Default: false
    pub show_progress: bool,

    /// Emit a progress event every this many records
    ///
    /// Must be a power of two.
    /// Default: 512
    pub progress_interval: usize,

    /// Type labels whose incoming references are stripped by
    /// `remove_expensive_references`
    ///
    /// Modules, frames and types reach nearly everything in a process, so
    /// following references into them makes every object look huge.
    /// Default: `["module", "frame", "type"]`
    pub expensive_types: Vec<String>,

    /// Label of LRU cache nodes, whose sideways links are dropped
    ///
    /// Default: `"_LRUNode"`
    pub lru_node_type: String,

    /// Label of function objects, whose globals/module links are dropped
    ///
    /// Default: `"function"`
    pub function_type: String,

    /// Number of rows shown in a summary report
    ///
    /// Default: 20
    pub summary_rows: usize,
}

impl Default for DumpConfig {
    fn default() -> Self {
        DumpConfig {
            // Progress
            show_progress: false,
            progress_interval: 512,

            // Reference filtering
            expensive_types: vec!["module".to_string(), "frame".to_string(), "type".to_string()],
            lru_node_type: "_LRUNode".to_string(),
            function_type: "function".to_string(),

            // Reporting
            summary_rows: 20,
        }
    }
}

impl DumpConfig {
    /// Validate configuration
    ///
    /// ```rust
    /// use heapobj::DumpConfig;
    ///
    /// let config = DumpConfig {
    ///     progress_interval: 1000, // not a power of two
    ///     ..Default::default()
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.progress_interval.is_power_of_two() {
            return Err(ConfigError::InvalidProgressInterval(format!(
                "progress_interval must be a power of two, got {}",
                self.progress_interval
            )));
        }

        if self.summary_rows == 0 {
            return Err(ConfigError::InvalidSummaryRows(
                "summary_rows must be > 0".to_string(),
            ));
        }

        if let Some(label) = self
            .expensive_types
            .iter()
            .chain([&self.lru_node_type, &self.function_type])
            .find(|label| label.is_empty())
        {
            return Err(ConfigError::InvalidTypeLabel(format!(
                "type labels must not be empty: {:?}",
                label
            )));
        }

        Ok(())
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with:
    /// - HEAPDUMP_SHOW_PROGRESS (`1` or `true`)
    /// - HEAPDUMP_PROGRESS_INTERVAL
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("HEAPDUMP_SHOW_PROGRESS") {
            config.show_progress = val == "1" || val.eq_ignore_ascii_case("true");
        }

        if let Ok(val) = std::env::var("HEAPDUMP_PROGRESS_INTERVAL") {
            if let Ok(interval) = val.parse::<usize>() {
                config.progress_interval = interval;
            }
        }

        config
    }

    /// Check whether `type_str` is one of the expensive types
    pub fn is_expensive(&self, type_str: &str) -> bool {
        self.expensive_types.iter().any(|t| t == type_str)
    }
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid progress interval: {0}")]
    InvalidProgressInterval(String),

    #[error("Invalid summary rows: {0}")]
    InvalidSummaryRows(String),

    #[error("Invalid type label: {0}")]
    InvalidTypeLabel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DumpConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.show_progress);
        assert_eq!(config.progress_interval, 512);
        assert!(config.is_expensive("module"));
        assert!(!config.is_expensive("dict"));
    }

    #[test]
    fn test_invalid_progress_interval() {
        let config = DumpConfig {
            progress_interval: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProgressInterval(_))
        ));
    }

    #[test]
    fn test_invalid_summary_rows() {
        let config = DumpConfig {
            summary_rows: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_type_label() {
        let config = DumpConfig {
            lru_node_type: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTypeLabel(_))
        ));
    }
}
