//! EPUB processing pipeline.
//!
//! Turns one EPUB file into a self-contained book directory:
//!
//! ```text
//! mybook.epub  ->  mybook_data/
//!                    book.json
//!                    images/cover.jpg ...
//! ```
//!
//! The directory is built in a staging location and swapped into place at
//! the end, so an interrupted run never leaves a half-written book where
//! the server would list it.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::book::{self, Book, ChapterContent, TocEntry};
use crate::epub::{EpubParser, RawChapter, RawImage, RawTocEntry};
use crate::html::{extract_text, normalize_href, sanitize_chapter, ImageRewriter};

const STAGING_SUFFIX: &str = ".partial";

/// Process one EPUB into its book directory.
///
/// The directory lands next to the EPUB, or under `output_parent` when
/// given, and is named `<stem>_data`. Any previous output for the same
/// stem is replaced. Returns the final directory path.
pub fn process(epub_path: &Path, output_parent: Option<&Path>) -> Result<PathBuf> {
    let parser = EpubParser::open(epub_path)
        .with_context(|| format!("failed to process {}", epub_path.display()))?;

    let parent = match output_parent {
        Some(dir) => dir.to_path_buf(),
        None => epub_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let dir_name = book::data_dir_name(parser.source_stem());
    let final_dir = parent.join(&dir_name);
    let staging_dir = parent.join(format!("{dir_name}{STAGING_SUFFIX}"));

    // Residue from an interrupted run
    if staging_dir.exists() {
        fs::remove_dir_all(&staging_dir)
            .with_context(|| format!("failed to clear staging dir {}", staging_dir.display()))?;
    }
    fs::create_dir_all(&staging_dir)
        .with_context(|| format!("failed to create staging dir {}", staging_dir.display()))?;

    let metadata = parser.metadata();
    tracing::info!(
        title = %metadata.title,
        source = %epub_path.display(),
        "processing EPUB"
    );

    // Images first so chapter sanitization can rewrite references to them
    let images = write_images(&parser.images()?, &staging_dir)?;
    let rewriter = ImageRewriter::new(&images);

    let raw_chapters = parser.chapters()?;
    let spine_index = SpineIndex::new(&raw_chapters);

    let toc = convert_toc(&parser.toc(), &spine_index);
    let titles = chapter_titles(&toc);

    let mut spine = Vec::with_capacity(raw_chapters.len());
    for (index, raw) in raw_chapters.into_iter().enumerate() {
        let content = sanitize_chapter(&raw.html, &rewriter)
            .with_context(|| format!("failed to sanitize chapter '{}'", raw.href))?;
        let text = extract_text(&content);

        spine.push(ChapterContent {
            id: raw.id,
            href: raw.href,
            index,
            title: titles.get(&index).cloned(),
            content,
            text,
        });
    }

    let source_file = epub_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let book = Book {
        metadata,
        spine,
        toc,
        images,
        source_file,
        processed_at: chrono::Utc::now().to_rfc3339(),
        version: book::ARTIFACT_VERSION.to_string(),
    };

    book.save(&staging_dir)
        .with_context(|| format!("failed to write {}", book::ARTIFACT_FILE))?;

    swap_into_place(&staging_dir, &final_dir)?;

    tracing::info!(
        chapters = book.chapter_count(),
        images = book.images.len(),
        output = %final_dir.display(),
        "processed EPUB"
    );

    Ok(final_dir)
}

/// Spine positions keyed by document href, with the same tiered matching
/// used for image references. TOC hrefs are authored relative to the nav
/// document and rarely match manifest hrefs verbatim.
struct SpineIndex {
    hrefs: Vec<(String, usize)>,
    by_name: HashMap<String, usize>,
}

impl SpineIndex {
    fn new(chapters: &[RawChapter]) -> Self {
        let mut hrefs = Vec::with_capacity(chapters.len());
        let mut by_name = HashMap::new();

        for (index, chapter) in chapters.iter().enumerate() {
            let norm = normalize_href(&chapter.href).to_lowercase();
            if let Some(name) = norm.rsplit('/').next() {
                by_name.entry(name.to_string()).or_insert(index);
            }
            hrefs.push((norm, index));
        }

        Self { hrefs, by_name }
    }

    fn resolve(&self, file_href: &str) -> Option<usize> {
        let norm = normalize_href(file_href).to_lowercase();
        if norm.is_empty() {
            return None;
        }

        for (href, index) in &self.hrefs {
            if *href == norm {
                return Some(*index);
            }
        }

        let suffix = format!("/{norm}");
        for (href, index) in &self.hrefs {
            if href.ends_with(&suffix) {
                return Some(*index);
            }
        }

        let name = norm.rsplit('/').next()?;
        self.by_name.get(name).copied()
    }
}

fn convert_toc(entries: &[RawTocEntry], spine: &SpineIndex) -> Vec<TocEntry> {
    entries
        .iter()
        .map(|entry| {
            let (file_href, anchor) = split_fragment(&entry.href);

            TocEntry {
                title: entry.title.clone(),
                href: entry.href.clone(),
                file_href: file_href.to_string(),
                anchor: anchor.to_string(),
                chapter_index: spine.resolve(file_href),
                children: convert_toc(&entry.children, spine),
            }
        })
        .collect()
}

fn split_fragment(href: &str) -> (&str, &str) {
    match href.split_once('#') {
        Some((file, fragment)) => (file, fragment),
        None => (href, ""),
    }
}

/// First TOC title per chapter, depth first. Chapters the TOC never points
/// at stay untitled.
fn chapter_titles(toc: &[TocEntry]) -> HashMap<usize, String> {
    fn collect(entries: &[TocEntry], titles: &mut HashMap<usize, String>) {
        for entry in entries {
            if let Some(index) = entry.chapter_index {
                titles.entry(index).or_insert_with(|| entry.title.clone());
            }
            collect(&entry.children, titles);
        }
    }

    let mut titles = HashMap::new();
    collect(toc, &mut titles);
    titles
}

fn write_images(images: &[RawImage], staging_dir: &Path) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    if images.is_empty() {
        return Ok(map);
    }

    let images_dir = staging_dir.join(book::IMAGES_DIR);
    fs::create_dir_all(&images_dir)
        .with_context(|| format!("failed to create {}", images_dir.display()))?;

    let mut taken = HashSet::new();
    for image in images {
        let name = unique_filename(&image.href, &mut taken);
        let dest = images_dir.join(&name);
        fs::write(&dest, &image.data)
            .with_context(|| format!("failed to write image {}", dest.display()))?;

        map.insert(image.href.clone(), format!("{}/{name}", book::IMAGES_DIR));
    }

    Ok(map)
}

/// Basename of the manifest href, with a numeric prefix when the name is
/// already taken. Different manifest folders can carry same-named files.
fn unique_filename(href: &str, taken: &mut HashSet<String>) -> String {
    let base = Path::new(href)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.bin".to_string());

    let mut candidate = base.clone();
    let mut counter = 1;
    while !taken.insert(candidate.to_lowercase()) {
        candidate = format!("{counter}_{base}");
        counter += 1;
    }

    candidate
}

/// Replace the previous output, if any, with the freshly built staging
/// directory. Staging sits in the same parent, so the rename stays on one
/// filesystem and is atomic.
fn swap_into_place(staging: &Path, final_dir: &Path) -> Result<()> {
    if final_dir.exists() {
        fs::remove_dir_all(final_dir).with_context(|| {
            format!("failed to remove previous output {}", final_dir.display())
        })?;
    }
    fs::rename(staging, final_dir).with_context(|| {
        format!(
            "failed to move {} into place at {}",
            staging.display(),
            final_dir.display()
        )
    })?;

    Ok(())
}
