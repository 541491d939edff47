//! `st-parse.toml` loading.
//!
//! Every field has a default, so an empty or missing file is valid.
//! Command-line flags override what the file sets.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "st-parse.toml";

/// Output rendering selected by `--format` or `[output] format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// One line per token.
    Tokens,
    /// Indented concrete syntax tree.
    Tree,
    /// `path:line:column: message` lines.
    #[default]
    Errors,
    /// One JSON object per file.
    Json,
}

/// Failure to read or decode a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub parse: ParseSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseSection {
    /// Worker threads; `None` uses the available parallelism.
    pub jobs: Option<usize>,
    /// File extensions collected from directories, matched without case.
    pub extensions: Vec<String>,
}

impl Default for ParseSection {
    fn default() -> Self {
        Self {
            jobs: None,
            extensions: vec!["st".to_string(), "pou".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub format: Format,
    /// Include whitespace, comments and pragmas in token and tree output.
    pub show_trivia: bool,
}

impl Config {
    /// Decodes a configuration from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Loads `st-parse.toml` from `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Worker count, never zero.
    #[must_use]
    pub fn jobs(&self) -> usize {
        self.parse
            .jobs
            .or_else(|| std::thread::available_parallelism().ok().map(usize::from))
            .unwrap_or(1)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> Result<Config, ConfigError> {
        Config::from_toml(text, Path::new("st-parse.toml"))
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = decode("").expect("empty config");
        assert_eq!(config, Config::default());
        assert_eq!(config.output.format, Format::Errors);
        assert_eq!(config.parse.extensions, vec!["st", "pou"]);
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = decode(
            "[parse]\njobs = 3\nextensions = [\"iecst\"]\n\n[output]\nformat = \"json\"\nshow_trivia = true\n",
        )
        .expect("config");
        assert_eq!(config.parse.jobs, Some(3));
        assert_eq!(config.jobs(), 3);
        assert_eq!(config.parse.extensions, vec!["iecst"]);
        assert_eq!(config.output.format, Format::Json);
        assert!(config.output.show_trivia);
    }

    #[test]
    fn test_zero_jobs_means_one_worker() {
        let config = decode("[parse]\njobs = 0\n").expect("config");
        assert_eq!(config.jobs(), 1);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = decode("[output]\ncolour = true\n").expect_err("unknown key");
        assert!(err.to_string().starts_with("st-parse.toml: "));
        assert!(decode("[output]\nformat = \"xml\"\n").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = std::env::temp_dir().join("st-parse-config-missing");
        let config = Config::discover(&dir).expect("defaults");
        assert_eq!(config, Config::default());
    }
}
