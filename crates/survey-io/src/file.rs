//! Survey file exchange
//!
//! `.json` files hold a bare [`SurveyDocument`]; `.csurvey` files hold a
//! whole [`EditorSnapshot`]. Other extensions are recognized by content.

use crate::error::{ParseError, SerializeError};
use serde_json::Value;
use std::fs;
use std::path::Path;
use survey_document::SurveyDocument;
use survey_editor::{EditorConfig, EditorError, EditorSnapshot, SurveyEditor};
use ulid::Ulid;

/// Extension of bare document files
pub const DOCUMENT_EXTENSION: &str = "json";
/// Extension of editor session files
pub const SNAPSHOT_EXTENSION: &str = "csurvey";

/// On-disk layout of a survey file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyFormat {
    Document,
    Snapshot,
}

impl SurveyFormat {
    /// Format implied by the file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(DOCUMENT_EXTENSION) => Some(Self::Document),
            Some(SNAPSHOT_EXTENSION) => Some(Self::Snapshot),
            _ => None,
        }
    }

    /// Format implied by the top-level JSON fields
    #[must_use]
    pub fn sniff(content: &str) -> Option<Self> {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(content) else {
            return None;
        };
        if map.contains_key("history") && map.contains_key("document") {
            Some(Self::Snapshot)
        } else if map.contains_key("surveyKey") && map.contains_key("surveyItems") {
            Some(Self::Document)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Document => DOCUMENT_EXTENSION,
            Self::Snapshot => SNAPSHOT_EXTENSION,
        }
    }
}

/// Parsed survey file
#[derive(Debug, Clone, PartialEq)]
pub enum SurveyFile {
    Document(SurveyDocument),
    Snapshot(EditorSnapshot),
}

impl SurveyFile {
    #[must_use]
    pub fn format(&self) -> SurveyFormat {
        match self {
            Self::Document(_) => SurveyFormat::Document,
            Self::Snapshot(_) => SurveyFormat::Snapshot,
        }
    }

    /// The current document either way
    #[must_use]
    pub fn document(&self) -> &SurveyDocument {
        match self {
            Self::Document(doc) => doc,
            Self::Snapshot(snapshot) => &snapshot.document,
        }
    }

    /// Open an editing session; a snapshot keeps its history
    ///
    /// # Errors
    /// Returns the facade's construction errors.
    pub fn into_editor(self, config: EditorConfig) -> Result<SurveyEditor, EditorError> {
        match self {
            Self::Document(doc) => SurveyEditor::from_document(doc, config),
            Self::Snapshot(snapshot) => SurveyEditor::from_snapshot(snapshot, config),
        }
    }
}

/// Parse file content; `format` overrides sniffing
///
/// `path` is only used in error messages.
///
/// # Errors
/// Returns [`ParseError`] for unknown, malformed or inconsistent content.
pub fn parse_survey(
    content: &str,
    format: Option<SurveyFormat>,
    path: &Path,
) -> Result<SurveyFile, ParseError> {
    let format = match format.or_else(|| SurveyFormat::sniff(content)) {
        Some(format) => format,
        None => {
            return Err(ParseError::UnknownFormat {
                path: path.to_path_buf(),
                reason: "expected a survey document or an editor snapshot".to_string(),
            })
        }
    };
    let syntax = |source| ParseError::Syntax {
        path: path.to_path_buf(),
        source,
    };

    match format {
        SurveyFormat::Document => {
            let doc: SurveyDocument = serde_json::from_str(content).map_err(syntax)?;
            doc.check_integrity().map_err(|source| ParseError::InvalidDocument {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(SurveyFile::Document(doc))
        }
        SurveyFormat::Snapshot => {
            let snapshot: EditorSnapshot = serde_json::from_str(content).map_err(syntax)?;
            snapshot.validate().map_err(|source| ParseError::InvalidSnapshot {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(SurveyFile::Snapshot(snapshot))
        }
    }
}

/// Read a survey file
///
/// # Errors
/// Returns [`ParseError::Io`] if the file cannot be read and the errors of
/// [`parse_survey`].
pub fn read_survey(path: &Path) -> Result<SurveyFile, ParseError> {
    let content = fs::read_to_string(path).map_err(|e| ParseError::io_error(path, e))?;
    let file = parse_survey(&content, SurveyFormat::from_path(path), path)?;
    tracing::debug!(
        path = %path.display(),
        format = ?file.format(),
        items = file.document().len(),
        "Read survey file"
    );
    Ok(file)
}

/// Write a bare document as indented JSON
///
/// # Errors
/// Returns [`SerializeError`] if encoding or writing fails.
pub fn write_document(path: &Path, document: &SurveyDocument) -> Result<(), SerializeError> {
    let json = serde_json::to_string_pretty(document)?;
    write_atomic(path, &json)
}

/// Write a whole session snapshot
///
/// # Errors
/// Returns [`SerializeError`] if encoding or writing fails.
pub fn write_snapshot(path: &Path, snapshot: &EditorSnapshot) -> Result<(), SerializeError> {
    let json = serde_json::to_string(snapshot)?;
    write_atomic(path, &json)
}

/// Write `file` in its own format
///
/// # Errors
/// Returns [`SerializeError`] if encoding or writing fails.
pub fn write_survey(path: &Path, file: &SurveyFile) -> Result<(), SerializeError> {
    match file {
        SurveyFile::Document(doc) => write_document(path, doc),
        SurveyFile::Snapshot(snapshot) => write_snapshot(path, snapshot),
    }
}

/// Write through a temporary sibling and rename into place
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<(), SerializeError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let tmp = dir.join(format!(".survey-{}.tmp", Ulid::new()));
    fs::write(&tmp, content).map_err(|e| SerializeError::io_error(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(SerializeError::io_error(path, e));
    }
    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote survey file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{"surveyKey":"s","surveyItems":{"s":{"key":"s","itemType":"root","items":[]}}}"#;

    #[test]
    fn extension_decides_format() {
        assert_eq!(SurveyFormat::from_path(Path::new("a.json")), Some(SurveyFormat::Document));
        assert_eq!(SurveyFormat::from_path(Path::new("a.csurvey")), Some(SurveyFormat::Snapshot));
        assert_eq!(SurveyFormat::from_path(Path::new("a.txt")), None);
    }

    #[test]
    fn sniffing_reads_top_level_fields() {
        assert_eq!(SurveyFormat::sniff(DOC), Some(SurveyFormat::Document));
        assert_eq!(
            SurveyFormat::sniff(r#"{"formatVersion":1,"document":{},"history":{}}"#),
            Some(SurveyFormat::Snapshot)
        );
        assert_eq!(SurveyFormat::sniff("[1,2]"), None);
        assert_eq!(SurveyFormat::sniff("not json"), None);
    }

    #[test]
    fn parse_without_hint_sniffs() {
        let file = parse_survey(DOC, None, Path::new("in.txt")).unwrap();
        assert_eq!(file.format(), SurveyFormat::Document);
        assert_eq!(file.document().survey_key(), "s");
    }

    #[test]
    fn parse_reports_unknown_content() {
        let err = parse_survey("{}", None, Path::new("in.txt")).unwrap_err();
        assert!(matches!(err, ParseError::UnknownFormat { .. }));
    }

    #[test]
    fn parse_reports_syntax_with_hint() {
        let err = parse_survey("{", Some(SurveyFormat::Document), Path::new("in.json")).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}
