//! Book artifact types
//!
//! The serialized contract between the processor and the server. A processed
//! book is a `<source-stem>_data/` directory holding one `book.json` artifact
//! plus extracted images under `images/`. The artifact is written once by the
//! processor and treated as immutable by the server.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Suffix appended to the source filename stem to name the output directory.
pub const DATA_DIR_SUFFIX: &str = "_data";
/// Artifact filename inside the output directory.
pub const ARTIFACT_FILE: &str = "book.json";
/// Subdirectory of the output directory holding extracted images.
pub const IMAGES_DIR: &str = "images";
/// Artifact format version, bumped when the serialized layout changes.
pub const ARTIFACT_VERSION: &str = "3.0";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode artifact: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A fully processed book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Bibliographic metadata
    pub metadata: BookMetadata,
    /// Chapters in reading order; `spine[i].index == i`
    pub spine: Vec<ChapterContent>,
    /// Table of contents, possibly nested
    pub toc: Vec<TocEntry>,
    /// Original manifest href -> path relative to the book directory
    pub images: HashMap<String, String>,
    /// Filename of the source EPUB
    pub source_file: String,
    /// RFC 3339 timestamp of the processing run
    pub processed_at: String,
    /// Artifact format version
    pub version: String,
}

/// Metadata extracted from the EPUB package document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub language: String,
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub date: Option<String>,
    pub identifiers: Vec<String>,
    pub subjects: Vec<String>,
}

impl Default for BookMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown".to_string(),
            language: "en".to_string(),
            authors: Vec::new(),
            description: None,
            publisher: None,
            date: None,
            identifiers: Vec::new(),
            subjects: Vec::new(),
        }
    }
}

/// One chapter of the book, in sanitized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterContent {
    /// Spine idref
    pub id: String,
    /// Source document href within the EPUB
    pub href: String,
    /// Title resolved from the TOC, when one matched
    pub title: Option<String>,
    /// Sanitized HTML body
    pub content: String,
    /// Plain text of the sanitized body, for LLM pairing
    pub text: String,
    /// Position in the spine, zero-based and contiguous
    pub index: usize,
}

/// Table of contents entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocEntry {
    /// Display label
    pub title: String,
    /// Target as authored, may carry a fragment
    pub href: String,
    /// `href` with any fragment stripped
    pub file_href: String,
    /// Fragment part of `href`, empty when absent
    pub anchor: String,
    /// Spine position of `file_href`, when it points at a chapter
    pub chapter_index: Option<usize>,
    /// Nested entries
    #[serde(default)]
    pub children: Vec<TocEntry>,
}

impl Book {
    /// Number of chapters in reading order.
    pub fn chapter_count(&self) -> usize {
        self.spine.len()
    }

    /// Authors as a single display string.
    pub fn authors_joined(&self) -> String {
        self.metadata.authors.join(", ")
    }

    /// Write the artifact into `dir` as compact JSON.
    pub fn save(&self, dir: &Path) -> Result<(), ArtifactError> {
        let data = serde_json::to_vec(self)?;
        fs::write(dir.join(ARTIFACT_FILE), data)?;
        Ok(())
    }

    /// Read the artifact stored in `dir`.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let data = fs::read(dir.join(ARTIFACT_FILE))?;
        Ok(serde_json::from_slice(&data)?)
    }
}

/// Output directory name for a source filename stem.
pub fn data_dir_name(stem: &str) -> String {
    format!("{stem}{DATA_DIR_SUFFIX}")
}

/// Whether a directory name follows the processed-book naming convention.
pub fn is_data_dir_name(name: &str) -> bool {
    name.ends_with(DATA_DIR_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        Book {
            metadata: BookMetadata {
                title: "Test Book".to_string(),
                authors: vec!["Me".to_string()],
                ..Default::default()
            },
            spine: vec![ChapterContent {
                id: "ch1".to_string(),
                href: "ch1.xhtml".to_string(),
                title: Some("Chapter 1".to_string()),
                content: "<p>Hello</p>".to_string(),
                text: "Hello".to_string(),
                index: 0,
            }],
            toc: vec![TocEntry {
                title: "Chapter 1".to_string(),
                href: "ch1.xhtml".to_string(),
                file_href: "ch1.xhtml".to_string(),
                anchor: String::new(),
                chapter_index: Some(0),
                children: Vec::new(),
            }],
            images: HashMap::new(),
            source_file: "test.epub".to_string(),
            processed_at: "2024-01-01T00:00:00Z".to_string(),
            version: ARTIFACT_VERSION.to_string(),
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let book = sample_book();
        book.save(dir.path()).unwrap();

        let loaded = Book::load(dir.path()).unwrap();
        assert_eq!(loaded.metadata.title, "Test Book");
        assert_eq!(loaded.chapter_count(), 1);
        assert_eq!(loaded.spine[0].content, "<p>Hello</p>");
        assert_eq!(loaded.toc[0].chapter_index, Some(0));
        assert_eq!(loaded.version, ARTIFACT_VERSION);
    }

    #[test]
    fn test_load_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Book::load(dir.path()).is_err());
    }

    #[test]
    fn test_load_corrupt_artifact() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ARTIFACT_FILE), b"not json").unwrap();
        assert!(matches!(
            Book::load(dir.path()),
            Err(ArtifactError::Decode(_))
        ));
    }

    #[test]
    fn test_data_dir_naming() {
        assert_eq!(data_dir_name("alice"), "alice_data");
        assert!(is_data_dir_name("alice_data"));
        assert!(!is_data_dir_name("alice"));
        assert!(!is_data_dir_name("alice_data.partial"));
    }

    #[test]
    fn test_authors_joined() {
        let mut book = sample_book();
        book.metadata.authors = vec!["A. One".to_string(), "B. Two".to_string()];
        assert_eq!(book.authors_joined(), "A. One, B. Two");
    }
}
