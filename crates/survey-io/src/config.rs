//! Editor configuration files
//!
//! ```toml
//! max_history = 50
//! warn_on_invalid_references = true
//! verify_integrity = true
//! initial_description = "Opened"
//! ```

use crate::error::ConfigError;
use std::fs;
use std::path::Path;
use survey_editor::EditorConfig;

/// Parse TOML; missing keys keep their defaults
///
/// # Errors
/// Returns [`ConfigError::Toml`] for malformed TOML or wrong value types.
pub fn parse_config(content: &str) -> Result<EditorConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from a TOML file
///
/// # Errors
/// Returns [`ConfigError::Io`] if the file cannot be read and the errors of
/// [`parse_config`].
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), ?config, "Loaded editor config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse_config("max_history = 5\n").unwrap();
        assert_eq!(config.max_history, Some(5));
        assert!(config.warn_on_invalid_references);
        assert!(config.verify_integrity);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), EditorConfig::default());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = parse_config("max_history = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
