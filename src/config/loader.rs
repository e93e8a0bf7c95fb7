use crate::config::schema::{SitterConfig, ValidationError};
use crate::ts::{SyntaxParser, TreeSitterError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to turn a config file into a ready parser.
///
/// Errors raised while reading from a string carry no path; loading from a
/// file fills it in.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config TOML{}: {source}", located(.path))]
    Syntax {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },

    #[error("invalid config{}: {source}", located(.path))]
    Invalid {
        path: Option<PathBuf>,
        source: ValidationError,
    },

    #[error("config grammar could not be loaded{}: {source}", located(.path))]
    Grammar {
        path: Option<PathBuf>,
        source: TreeSitterError,
    },
}

impl ConfigError {
    fn at(mut self, file: &Path) -> Self {
        match &mut self {
            ConfigError::Read { .. } => {}
            ConfigError::Syntax { path, .. }
            | ConfigError::Invalid { path, .. }
            | ConfigError::Grammar { path, .. } => {
                path.get_or_insert_with(|| file.to_path_buf());
            }
        }
        self
    }
}

fn located(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" in {}", path.display()))
        .unwrap_or_default()
}

/// Parse and validate a config held in memory.
pub fn load_from_str(input: &str) -> Result<SitterConfig, ConfigError> {
    let config: SitterConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Syntax { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Invalid { path: None, source })?;

    tracing::debug!(name = %config.meta.name, language = %config.parser.language, "loaded config");
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<SitterConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.at(path))
}

/// Load the config at `path` and build a parser for the grammar it names.
pub fn parser_from_path(path: impl AsRef<Path>) -> Result<SyntaxParser, ConfigError> {
    let path = path.as_ref();
    let config = load_from_path(path)?;
    SyntaxParser::from_config(&config).map_err(|source| ConfigError::Grammar {
        path: Some(path.to_path_buf()),
        source,
    })
}
