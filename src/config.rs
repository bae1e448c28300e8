//! Rendering defaults loaded from TOML.
//!
//! ```toml
//! [inline]
//! allow_string_literals = false
//!
//! [output]
//! format = "json"
//! color = false
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{CaseError, CaseResult};

/// Project-local config file name.
pub const LOCAL_CONFIG: &str = "sqlcase.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub inline: InlineConfig,
    pub output: OutputConfig,
}

/// Inline rendering settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InlineConfig {
    /// Write string bindings out as quoted literals instead of `''`.
    pub allow_string_literals: bool,
}

/// CLI output settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Command-line values; `None` keeps the configured setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub allow_string_literals: Option<bool>,
    pub format: Option<OutputFormat>,
    pub color: Option<bool>,
}

/// Effective settings after overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub allow_string_literals: bool,
    pub format: OutputFormat,
    pub color: bool,
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> CaseResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `./sqlcase.toml` is tried,
    /// then `<config dir>/sqlcase/config.toml`, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> CaseResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CaseError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_file(path);
        }

        Self::load_first(&Self::search_paths())
    }

    /// Load the first existing file among `candidates`, or the defaults.
    fn load_first(candidates: &[PathBuf]) -> CaseResult<Self> {
        for path in candidates {
            if path.exists() {
                return Self::load_file(path);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Apply command-line overrides on top of this configuration.
    pub fn resolve(&self, overrides: Overrides) -> Settings {
        Settings {
            allow_string_literals: overrides
                .allow_string_literals
                .unwrap_or(self.inline.allow_string_literals),
            format: overrides.format.unwrap_or(self.output.format),
            color: overrides.color.unwrap_or(self.output.color),
        }
    }

    fn load_file(path: &Path) -> CaseResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sqlcase").join("config.toml"));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.inline.allow_string_literals);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.output.color);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml("[output]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.color);
        assert!(!config.inline.allow_string_literals);
    }

    #[test]
    fn test_bad_format_is_config_error() {
        let err = Config::from_toml("[output]\nformat = \"yaml\"\n").unwrap_err();
        assert!(matches!(err, CaseError::Config(_)));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[inline]\nallow_string_literals = true").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.inline.allow_string_literals);
    }

    #[test]
    fn test_search_order() {
        let paths = Config::search_paths();
        assert_eq!(paths[0], PathBuf::from(LOCAL_CONFIG));
        if let Some(dir) = dirs::config_dir() {
            assert_eq!(paths[1], dir.join("sqlcase").join("config.toml"));
            assert_eq!(paths.len(), 2);
        }
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("sqlcase.toml");
        let global = dir.path().join("config.toml");
        std::fs::write(&global, "[output]\nformat = \"json\"\n").unwrap();

        let config = Config::load_first(&[local.clone(), global.clone()]).unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);

        std::fs::write(&local, "[output]\ncolor = false\n").unwrap();
        let config = Config::load_first(&[local, global]).unwrap();
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.color);
    }

    #[test]
    fn test_no_candidates_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_first(&[dir.path().join("missing.toml")]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides_win_in_both_directions() {
        let config = Config::from_toml(
            "[inline]\nallow_string_literals = true\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        assert_eq!(
            config.resolve(Overrides::default()),
            Settings {
                allow_string_literals: true,
                format: OutputFormat::Json,
                color: true,
            }
        );
        assert_eq!(
            config.resolve(Overrides {
                allow_string_literals: Some(false),
                format: Some(OutputFormat::Text),
                color: Some(false),
            }),
            Settings {
                allow_string_literals: false,
                format: OutputFormat::Text,
                color: false,
            }
        );
        assert!(
            Config::default()
                .resolve(Overrides {
                    allow_string_literals: Some(true),
                    ..Overrides::default()
                })
                .allow_string_literals
        );
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, CaseError::Config(_)));
    }
}
