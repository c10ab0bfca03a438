use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use molsketch::engine::config::{EditorConfig, EditorConfigBuilder, PartialEditorConfig};
use std::path::Path;
use tracing::debug;

pub fn load_partial(path: &Path) -> Result<PartialEditorConfig> {
    debug!("Loading configuration from file: {:?}", path);
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Builds the session configuration: defaults, then the TOML file, then command-line overrides.
pub fn resolve(args: &ConfigArgs) -> Result<EditorConfig> {
    let partial = match &args.config {
        Some(path) => load_partial(path)?,
        None => PartialEditorConfig::default(),
    };

    let mut builder = EditorConfigBuilder::new().merge_partial(partial);
    if let Some(length) = args.bond_length {
        builder = builder.bond_length(length);
    }
    if let Some(scale) = args.pixels_per_angstrom {
        builder = builder.pixels_per_angstrom(scale);
    }

    let config = builder.build().map_err(|e| CliError::Config(e.to_string()))?;
    debug!("Resolved editor configuration: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("editor.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let config = resolve(&ConfigArgs::default()).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn cli_overrides_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "bond-length = 30.0\npixels-per-angstrom = 20.0\nhistory-capacity = 10\n",
        );
        let args = ConfigArgs {
            config: Some(path),
            bond_length: Some(50.0),
            pixels_per_angstrom: None,
        };

        let config = resolve(&args).unwrap();
        assert_eq!(config.bond_length, 50.0);
        assert_eq!(config.pixels_per_angstrom, 20.0);
        assert_eq!(config.history_capacity, 10);
    }

    #[test]
    fn unknown_keys_are_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "bond-lenght = 30.0\n");
        let args = ConfigArgs {
            config: Some(path),
            ..ConfigArgs::default()
        };
        assert!(matches!(resolve(&args), Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn invalid_override_is_a_config_error() {
        let args = ConfigArgs {
            bond_length: Some(-1.0),
            ..ConfigArgs::default()
        };
        assert!(matches!(resolve(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let args = ConfigArgs {
            config: Some(PathBuf::from("/definitely/not/here/editor.toml")),
            ..ConfigArgs::default()
        };
        assert!(matches!(resolve(&args), Err(CliError::Io(_))));
    }
}
