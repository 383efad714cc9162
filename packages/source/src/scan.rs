//! Input directory listing.

use std::path::{Path, PathBuf};

use crate::SourceError;

/// Returns `true` if `path` has an `.xml` extension, in any letter case.
#[must_use]
pub fn is_xml_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

/// Lists the `.xml` files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the directory cannot be read.
pub fn list_xml_files(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_xml_file(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
