//! Directory loader.
//!
//! Loads every `*.xml` document of a directory into one [`Registry`]. A document
//! that fails to parse is logged and reported, and the rest are still loaded.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::ParseError;
use crate::parser::parse_file;
use crate::registry::Registry;

/// Outcome of loading a directory.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Registry built from every document that parsed.
    pub registry: Registry,
    /// Documents loaded, in load order.
    pub loaded: Vec<PathBuf>,
    /// Documents that failed, with their errors.
    pub failures: Vec<(PathBuf, ParseError)>,
}

impl LoadReport {
    /// Returns true if any document failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Loads all `*.xml` files in `dir` (not recursive), sorted by file name.
///
/// # Errors
/// Returns `ParseError::Io` only if the directory itself cannot be read.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<LoadReport, ParseError> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "xml") {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), files = files.len(), "loading schema directory");

    let mut report = LoadReport::default();
    for path in files {
        match parse_file(&path) {
            Ok(document) => {
                report.registry.register_document(document);
                report.loaded.push(path);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to parse document");
                report.failures.push((path, e));
            }
        }
    }

    info!(
        documents = report.loaded.len(),
        failures = report.failures.len(),
        roots = report.registry.roots().len(),
        ids = report.registry.len(),
        "schema directory loaded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dir_sorted_and_isolated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.xml"), r#"<fmtDef id="X" dataName="FromB"/>"#).unwrap();
        std::fs::write(dir.path().join("a.xml"), r#"<fmtDef id="X" dataName="FromA"/>"#).unwrap();
        std::fs::write(dir.path().join("c.xml"), "<fmtDef><broken></fmtDef>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "<fmtDef id=\"T\"/>").unwrap();

        let report = load_dir(dir.path()).unwrap();
        assert_eq!(report.loaded.len(), 2);
        assert!(report.loaded[0].ends_with("a.xml"));
        assert!(report.has_failures());
        assert!(report.failures[0].0.ends_with("c.xml"));

        assert_eq!(report.registry.roots().len(), 2);
        assert_eq!(
            report.registry.lookup("X").and_then(|n| n.type_name()),
            Some("FromB")
        );
        assert!(!report.registry.contains("T"));
    }

    #[test]
    fn test_load_dir_missing_directory() {
        assert!(matches!(
            load_dir("/nonexistent/schema/dir"),
            Err(ParseError::Io(_))
        ));
    }

    #[test]
    fn test_load_dir_empty() {
        let dir = tempfile::tempdir().unwrap();
        let report = load_dir(dir.path()).unwrap();
        assert!(report.registry.is_empty());
        assert!(!report.has_failures());
    }
}
