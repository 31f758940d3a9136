use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::parser::DEFAULT_MAX_ERRORS;

pub const CONFIG_FILE_NAME: &str = "lv6.toml";

/// Knobs the parser itself understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Diagnostics recorded before parsing stops. Lexer errors count.
    pub max_errors: usize,
    /// Keep the trivia channel in `ParseResult::tokens`.
    pub keep_trivia: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_errors: DEFAULT_MAX_ERRORS, keep_trivia: true }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid {}: `max_errors` must be at least 1", .path.display())]
    ZeroMaxErrors { path: PathBuf },
}

// ---- TOML deserialization types ----

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    parser: TomlParser,
    #[serde(default)]
    include: TomlInclude,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlParser {
    max_errors: Option<usize>,
    keep_trivia: Option<bool>,
    jobs: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlInclude {
    #[serde(default)]
    search_path: Vec<String>,
}

/// Settings from an `lv6.toml` file, after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub parse: ParseOptions,
    /// Worker threads for multi-file runs; `None` means one per available core.
    pub jobs: Option<usize>,
    /// Include search directories, resolved against the config file's directory.
    pub include_dirs: Vec<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&text, path, base)
    }

    /// Walks up from `start` looking for `lv6.toml`; no file means defaults.
    pub fn discover(start: &Path) -> Result<Self, ConfigError> {
        let mut dir = Some(start);
        while let Some(d) = dir {
            let candidate = d.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading config");
                return Self::load(&candidate);
            }
            dir = d.parent();
        }
        Ok(Self::default())
    }

    fn from_toml_str(text: &str, path: &Path, base: &Path) -> Result<Self, ConfigError> {
        let raw: TomlConfig =
            toml::from_str(text).map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })?;
        let defaults = ParseOptions::default();
        let max_errors = raw.parser.max_errors.unwrap_or(defaults.max_errors);
        if max_errors == 0 {
            return Err(ConfigError::ZeroMaxErrors { path: path.to_path_buf() });
        }
        Ok(Self {
            parse: ParseOptions { max_errors, keep_trivia: raw.parser.keep_trivia.unwrap_or(defaults.keep_trivia) },
            jobs: raw.parser.jobs.filter(|&j| j > 0),
            include_dirs: raw.include.search_path.iter().map(|p| base.join(p)).collect(),
        })
    }
}
