//! Askama templates for the server views.
//!
//! Handlers precompute hrefs and flatten the nested TOC before rendering,
//! so the templates stay plain interpolation and loops.

use askama::Template;

use crate::book::{Book, TocEntry};
use crate::library::RootEntry;

/// One book in the library listing.
pub struct BookCard {
    /// Link to chapter 0
    pub href: String,
    pub title: String,
    pub author: String,
    pub chapters: usize,
}

#[derive(Template)]
#[template(path = "library.html")]
pub struct LibraryTemplate {
    pub books: Vec<BookCard>,
}

#[derive(Template)]
#[template(path = "roots.html")]
pub struct RootsTemplate {
    pub roots: Vec<RootEntry>,
}

/// A TOC entry flattened for rendering, with its nesting depth.
pub struct TocItem<'a> {
    pub title: &'a str,
    pub depth: usize,
    /// Chapter link with anchor, or None when the entry points outside
    /// the spine
    pub href: Option<String>,
    /// Whether the entry targets the chapter being read
    pub current: bool,
}

#[derive(Template)]
#[template(path = "reader.html")]
pub struct ReaderTemplate<'a> {
    pub book_title: &'a str,
    pub chapter_title: Option<&'a str>,
    pub chapter_html: &'a str,
    pub chapter_text: &'a str,
    /// 1-based, for display
    pub chapter_number: usize,
    pub chapter_count: usize,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub toc: Vec<TocItem<'a>>,
}

/// Link to a chapter of a book. The identifier is percent-encoded; folder
/// names can carry spaces and colons.
pub fn chapter_href(book_id: &str, chapter_index: usize) -> String {
    format!("/read/{}/{}", urlencoding::encode(book_id), chapter_index)
}

/// Flatten the TOC tree depth first, resolving each entry to a link.
pub fn toc_items<'a>(book: &'a Book, book_id: &str, current_index: usize) -> Vec<TocItem<'a>> {
    fn walk<'a>(
        entries: &'a [TocEntry],
        depth: usize,
        book_id: &str,
        current_index: usize,
        out: &mut Vec<TocItem<'a>>,
    ) {
        for entry in entries {
            let href = entry.chapter_index.map(|index| {
                let mut href = chapter_href(book_id, index);
                if !entry.anchor.is_empty() {
                    href.push('#');
                    href.push_str(&entry.anchor);
                }
                href
            });

            out.push(TocItem {
                title: &entry.title,
                depth,
                href,
                current: entry.chapter_index == Some(current_index),
            });

            walk(&entry.children, depth + 1, book_id, current_index, out);
        }
    }

    let mut items = Vec::new();
    walk(&book.toc, 0, book_id, current_index, &mut items);
    items
}
