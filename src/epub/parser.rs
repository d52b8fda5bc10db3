//! EPUB container access using rbook.

use std::path::Path;

use rbook::epub::toc::EpubTocEntry;
use rbook::prelude::*;
use rbook::Epub;
use thiserror::Error;

use crate::book::BookMetadata;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to open EPUB: {0}")]
    OpenError(String),
    #[error("failed to read content: {0}")]
    ContentError(String),
}

/// A spine document with its raw, unsanitized markup.
#[derive(Debug)]
pub struct RawChapter {
    /// Spine idref
    pub id: String,
    /// Document href within the container
    pub href: String,
    /// Raw XHTML as stored in the EPUB
    pub html: String,
}

/// A navigation entry as authored, before spine resolution.
#[derive(Debug)]
pub struct RawTocEntry {
    pub title: String,
    /// Target href, possibly carrying a fragment
    pub href: String,
    pub children: Vec<RawTocEntry>,
}

/// An image resource from the manifest.
pub struct RawImage {
    /// Manifest href
    pub href: String,
    pub data: Vec<u8>,
}

/// EPUB parser that maintains an open container.
pub struct EpubParser {
    epub: Epub,
    source_stem: String,
}

impl EpubParser {
    /// Open an EPUB from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let source_stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        // Lenient parsing handles EPUBs with missing or malformed metadata
        let epub = Epub::options()
            .strict(false)
            .open(path)
            .map_err(|e| ParseError::OpenError(e.to_string()))?;

        Ok(Self { epub, source_stem })
    }

    /// Filename stem of the source EPUB.
    pub fn source_stem(&self) -> &str {
        &self.source_stem
    }

    /// Extract bibliographic metadata, falling back to the filename stem
    /// when the package carries no title.
    pub fn metadata(&self) -> BookMetadata {
        let meta = self.epub.metadata();

        let title = meta
            .title()
            .map(|t| t.value().to_string())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.source_stem.clone());

        let authors: Vec<String> = meta.creators().map(|c| c.value().to_string()).collect();

        let language = meta
            .language()
            .map(|l| l.value().to_string())
            .unwrap_or_else(|| "en".to_string());

        let description = meta.description().map(|d| d.value().to_string());
        let publisher = meta.publishers().next().map(|p| p.value().to_string());

        let date = meta
            .by_property("dc:date")
            .next()
            .or_else(|| meta.by_property("dcterms:modified").next())
            .map(|d| d.value().to_string());

        let identifiers: Vec<String> = meta
            .identifier()
            .map(|i| i.value().to_string())
            .into_iter()
            .collect();

        let subjects: Vec<String> = meta.tags().map(|s| s.value().to_string()).collect();

        BookMetadata {
            title,
            language,
            authors,
            description,
            publisher,
            date,
            identifiers,
            subjects,
        }
    }

    /// Extract the navigation tree.
    pub fn toc(&self) -> Vec<RawTocEntry> {
        let toc = self.epub.toc();

        let Some(root) = toc.contents() else {
            return Vec::new();
        };

        // The resolved href keeps any fragment the entry points at,
        // which spine resolution later splits off as the anchor.
        fn convert_entry(entry: EpubTocEntry<'_>) -> RawTocEntry {
            let title = entry.label().to_string();
            let href = entry
                .href()
                .map(|h| h.as_str().to_string())
                .unwrap_or_default();
            let children: Vec<RawTocEntry> =
                entry.children().iter().map(convert_entry).collect();

            RawTocEntry {
                title,
                href,
                children,
            }
        }

        root.children().iter().map(convert_entry).collect()
    }

    /// Extract spine documents in reading order.
    ///
    /// A spine idref without a manifest entry fails the whole run; chapter
    /// positions must stay contiguous with the spine.
    pub fn chapters(&self) -> Result<Vec<RawChapter>, ParseError> {
        let spine = self.epub.spine();
        let manifest = self.epub.manifest();

        let mut result = Vec::new();
        for item in spine.entries() {
            let idref = item.idref().to_string();

            let manifest_item = manifest.by_id(&idref).ok_or_else(|| {
                ParseError::ContentError(format!("spine item '{idref}' missing from manifest"))
            })?;
            let href = manifest_item.href().to_string();

            let html = self
                .epub
                .read_resource_str(manifest_item.href())
                .map_err(|e| ParseError::ContentError(e.to_string()))?;

            result.push(RawChapter {
                id: idref,
                href,
                html,
            });
        }

        Ok(result)
    }

    /// Extract every image in the manifest.
    pub fn images(&self) -> Result<Vec<RawImage>, ParseError> {
        let manifest = self.epub.manifest();

        let mut result = Vec::new();
        for entry in manifest.images() {
            let href = entry.href().to_string();
            let data = self
                .epub
                .read_resource_bytes(entry.href())
                .map_err(|e| ParseError::ContentError(format!("image '{href}': {e}")))?;

            result.push(RawImage { href, data });
        }

        Ok(result)
    }
}
