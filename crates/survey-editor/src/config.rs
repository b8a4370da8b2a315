//! Editor configuration

use serde::{Deserialize, Serialize};

/// Session settings
///
/// Every field has a default, so a partial TOML table is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Keep at most this many history entries; `None` keeps all
    pub max_history: Option<usize>,
    /// Log a warning when an edit leaves invalid references behind
    pub warn_on_invalid_references: bool,
    /// Re-check the tree invariants after every mutation
    pub verify_integrity: bool,
    /// Description of history entry 0
    pub initial_description: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: Some(100),
            warn_on_invalid_references: true,
            verify_integrity: true,
            initial_description: "Initial state".to_string(),
        }
    }
}

impl EditorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With history bound
    #[inline]
    #[must_use]
    pub fn with_max_history(mut self, max: Option<usize>) -> Self {
        self.max_history = max;
        self
    }

    /// With invalid-reference warnings on or off
    #[inline]
    #[must_use]
    pub fn with_reference_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_invalid_references = enabled;
        self
    }

    /// With integrity checks after mutations on or off
    #[inline]
    #[must_use]
    pub fn with_integrity_checks(mut self, enabled: bool) -> Self {
        self.verify_integrity = enabled;
        self
    }

    /// With description of the initial history entry
    #[inline]
    #[must_use]
    pub fn with_initial_description(mut self, description: impl Into<String>) -> Self {
        self.initial_description = description.into();
        self
    }
}
