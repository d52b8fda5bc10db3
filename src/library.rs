//! Library roots, book identifiers, and directory resolution.
//!
//! A library is one or more root directories whose `*_data` children are
//! processed books. Book identifiers are scoped as
//! `<root-index>:<directory-name>` so the same folder name under two roots
//! stays unambiguous; a bare directory name is accepted as a fallback and
//! searched across all roots in order.

use std::fs;
use std::path::{Path, PathBuf};

use crate::book;

/// A processed-book directory found during a scan.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    /// Scoped identifier, `<root-index>:<dir-name>`
    pub id: String,
    pub dir_name: String,
    pub path: PathBuf,
}

/// One configured root, for the directory chooser view.
#[derive(Debug, Clone)]
pub struct RootEntry {
    pub index: usize,
    pub name: String,
    pub path: String,
}

/// Resolve a book identifier to its directory.
///
/// Scoped identifiers address one root directly and resolve without
/// touching the filesystem; whether the book actually exists surfaces when
/// its artifact is read. Bare names are searched across roots and resolve
/// only where an artifact file is present. Identifiers whose directory
/// component is empty, contains a path separator, or is a dot name never
/// resolve.
pub fn resolve_book_dir(roots: &[PathBuf], book_id: &str) -> Option<PathBuf> {
    if let Some((index, dir_name)) = book_id.split_once(':') {
        if let Ok(index) = index.parse::<usize>() {
            if let Some(root) = roots.get(index) {
                if !is_safe_dir_name(dir_name) {
                    return None;
                }
                return Some(root.join(dir_name));
            }
        }
        // Unparseable or out-of-range prefix: treat the whole identifier
        // as a literal directory name below
    }

    if !is_safe_dir_name(book_id) {
        return None;
    }

    for root in roots {
        let dir = root.join(book_id);
        if dir.join(book::ARTIFACT_FILE).exists() {
            return Some(dir);
        }
    }

    None
}

/// A single path component: non-empty, no separators, not `.` or `..`.
fn is_safe_dir_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && name != "."
        && name != ".."
}

/// Scan one root for processed book directories, sorted by name.
///
/// An unreadable root yields an empty list; the caller still renders the
/// rest of the library.
pub fn scan_root(root: &Path, root_index: usize) -> Vec<LibraryEntry> {
    let mut entries = Vec::new();

    let read_dir = match fs::read_dir(root) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            tracing::warn!(root = %root.display(), %err, "cannot scan library root");
            return entries;
        }
    };

    for dir_entry in read_dir.flatten() {
        let path = dir_entry.path();
        if !path.is_dir() {
            continue;
        }

        let file_name = dir_entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !book::is_data_dir_name(name) {
            continue;
        }

        entries.push(LibraryEntry {
            id: format!("{root_index}:{name}"),
            dir_name: name.to_string(),
            path,
        });
    }

    entries.sort_by(|a, b| a.dir_name.cmp(&b.dir_name));
    entries
}

/// Root descriptors for the directory chooser.
pub fn root_entries(roots: &[PathBuf]) -> Vec<RootEntry> {
    roots
        .iter()
        .enumerate()
        .map(|(index, root)| {
            let resolved = root.canonicalize().unwrap_or_else(|_| root.clone());
            let name = resolved
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| root.display().to_string());

            RootEntry {
                index,
                name,
                path: resolved.display().to_string(),
            }
        })
        .collect()
}
