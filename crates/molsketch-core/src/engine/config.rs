use crate::core::io::mol::DEFAULT_PIXELS_PER_ANGSTROM;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BOND_LENGTH: f64 = 40.0;
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
pub const DEFAULT_MERGE_TOLERANCE: f64 = 10.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings of one editing session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    /// Target bond length in canvas pixels, used by ring/template placement and layout cleanup.
    pub bond_length: f64,
    /// Scale between canvas pixels and ångström for MOL output.
    pub pixels_per_angstrom: f64,
    /// Number of undo steps kept before the oldest is dropped.
    pub history_capacity: usize,
    /// Distance (pixels) under which a template atom merges into an existing atom.
    pub merge_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            bond_length: DEFAULT_BOND_LENGTH,
            pixels_per_angstrom: DEFAULT_PIXELS_PER_ANGSTROM,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
        }
    }
}

impl EditorConfig {
    pub fn builder() -> EditorConfigBuilder {
        EditorConfigBuilder::new()
    }

    /// Parses a TOML document; keys that are absent keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let partial: PartialEditorConfig = toml::from_str(text)?;
        EditorConfigBuilder::new().merge_partial(partial).build()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// The on-disk shape of an [`EditorConfig`]; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialEditorConfig {
    pub bond_length: Option<f64>,
    pub pixels_per_angstrom: Option<f64>,
    pub history_capacity: Option<usize>,
    pub merge_tolerance: Option<f64>,
}

#[derive(Debug, Default)]
pub struct EditorConfigBuilder {
    bond_length: Option<f64>,
    pixels_per_angstrom: Option<f64>,
    history_capacity: Option<usize>,
    merge_tolerance: Option<f64>,
}

impl EditorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bond_length(mut self, length: f64) -> Self {
        self.bond_length = Some(length);
        self
    }

    pub fn pixels_per_angstrom(mut self, scale: f64) -> Self {
        self.pixels_per_angstrom = Some(scale);
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    pub fn merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = Some(tolerance);
        self
    }

    /// Overlays every value present in `partial` onto this builder.
    pub fn merge_partial(mut self, partial: PartialEditorConfig) -> Self {
        self.bond_length = partial.bond_length.or(self.bond_length);
        self.pixels_per_angstrom = partial.pixels_per_angstrom.or(self.pixels_per_angstrom);
        self.history_capacity = partial.history_capacity.or(self.history_capacity);
        self.merge_tolerance = partial.merge_tolerance.or(self.merge_tolerance);
        self
    }

    pub fn build(self) -> Result<EditorConfig, ConfigError> {
        let defaults = EditorConfig::default();
        let config = EditorConfig {
            bond_length: self.bond_length.unwrap_or(defaults.bond_length),
            pixels_per_angstrom: self
                .pixels_per_angstrom
                .unwrap_or(defaults.pixels_per_angstrom),
            history_capacity: self.history_capacity.unwrap_or(defaults.history_capacity),
            merge_tolerance: self.merge_tolerance.unwrap_or(defaults.merge_tolerance),
        };

        positive("bond_length", config.bond_length)?;
        positive("pixels_per_angstrom", config.pixels_per_angstrom)?;
        if config.history_capacity == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "history_capacity",
                reason: "must be at least 1".into(),
            });
        }
        if !config.merge_tolerance.is_finite() || config.merge_tolerance < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "merge_tolerance",
                reason: format!("must be a non-negative number, got {}", config.merge_tolerance),
            });
        }
        Ok(config)
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a positive number, got {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builder_without_values_yields_defaults() {
        let config = EditorConfigBuilder::new().build().unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.bond_length, 40.0);
        assert_eq!(config.history_capacity, 100);
    }

    #[test]
    fn builder_sets_every_field() {
        let config = EditorConfig::builder()
            .bond_length(25.0)
            .pixels_per_angstrom(20.0)
            .history_capacity(5)
            .merge_tolerance(0.0)
            .build()
            .unwrap();
        assert_eq!(config.bond_length, 25.0);
        assert_eq!(config.pixels_per_angstrom, 20.0);
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.merge_tolerance, 0.0);
    }

    #[test]
    fn build_rejects_invalid_values() {
        let err = EditorConfig::builder().bond_length(0.0).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "bond_length",
                ..
            }
        ));
        assert!(EditorConfig::builder().history_capacity(0).build().is_err());
        assert!(EditorConfig::builder().merge_tolerance(-1.0).build().is_err());
        assert!(
            EditorConfig::builder()
                .pixels_per_angstrom(f64::NAN)
                .build()
                .is_err()
        );
    }

    #[test]
    fn toml_uses_kebab_case_and_keeps_missing_defaults() {
        let config = EditorConfig::from_toml_str("bond-length = 30.0\nhistory-capacity = 20\n").unwrap();
        assert_eq!(config.bond_length, 30.0);
        assert_eq!(config.history_capacity, 20);
        assert_eq!(config.merge_tolerance, DEFAULT_MERGE_TOLERANCE);
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = EditorConfig::from_toml_str("bond_length = 30.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "merge-tolerance = 4.5").unwrap();
        let config = EditorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.merge_tolerance, 4.5);

        assert!(matches!(
            EditorConfig::from_file("/nonexistent/editor.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
