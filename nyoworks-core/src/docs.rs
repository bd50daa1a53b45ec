//! Documentation checks over the project tree ("the bible").

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NyoError, Result, StorageError};

pub const BIBLE_DIR: &str = "docs/bible";

pub const REQUIRED_SECTIONS: &[&str] = &[
    "00-master",
    "01-vision",
    "02-actors",
    "03-data",
    "05-api",
    "06-ui",
    "07-tech",
];

/// Markdown files at or under this size are still placeholders.
pub const FILLED_THRESHOLD_BYTES: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStatus {
    pub name: String,
    pub files: usize,
    pub filled: usize,
}

pub fn bible_path(project_dir: &Path) -> PathBuf {
    project_dir.join(BIBLE_DIR)
}

/// Per-section fill counts, sorted by section name. Sections starting with
/// `_` are templates and skipped.
pub fn bible_status(project_dir: &Path) -> Result<Vec<SectionStatus>> {
    let root = existing_bible(project_dir)?;
    let mut sections = Vec::new();

    for entry in read_dir(&root)? {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if !path.is_dir() || name.starts_with('_') {
            continue;
        }

        let mut files = 0;
        let mut filled = 0;
        for doc in read_dir(&path)? {
            let doc_path = doc.path();
            if doc_path.extension().and_then(|e| e.to_str()) != Some("md") || !doc_path.is_file() {
                continue;
            }
            files += 1;
            let size = doc
                .metadata()
                .map_err(|e| StorageError::io(&doc_path, e))?
                .len();
            if size > FILLED_THRESHOLD_BYTES {
                filled += 1;
            }
        }
        sections.push(SectionStatus { name, files, filled });
    }

    sections.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sections)
}

/// Required sections that do not exist, in canonical order.
pub fn bible_check(project_dir: &Path) -> Result<Vec<&'static str>> {
    let root = existing_bible(project_dir)?;
    Ok(REQUIRED_SECTIONS
        .iter()
        .copied()
        .filter(|section| !root.join(section).is_dir())
        .collect())
}

/// Raw contents of `features/<id>/manifest.yaml`.
pub fn feature_manifest(project_dir: &Path, id: &str) -> Result<String> {
    if id.is_empty() || id.contains(['/', '\\']) || id == ".." {
        return Err(NyoError::Validation(format!("Invalid feature id '{}'", id)));
    }
    let path = project_dir.join("features").join(id).join("manifest.yaml");
    if !path.is_file() {
        return Err(NyoError::NotFound(format!("Feature '{}'", id)));
    }
    fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e).into())
}

fn existing_bible(project_dir: &Path) -> Result<PathBuf> {
    let root = bible_path(project_dir);
    if root.is_dir() {
        Ok(root)
    } else {
        Err(NyoError::NotFound("Bible directory".to_string()))
    }
}

fn read_dir(path: &Path) -> Result<Vec<fs::DirEntry>> {
    fs::read_dir(path)
        .and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| StorageError::io(path, e).into())
}
