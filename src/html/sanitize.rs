//! Chapter sanitization using lol_html.
//!
//! Spine documents arrive as complete XHTML files. One rewrite pass strips
//! everything that is not chapter content (scripts, styles, head material,
//! embedded viewers), unwraps the html/body shell so the result can be
//! embedded in the reading template, and points image references at the
//! files extracted next to the artifact.

use std::collections::{BTreeMap, HashMap};

use html2text::render::TrivialDecorator;
use lol_html::{doc_comments, doctype, element, rewrite_str, RewriteStrSettings};
use thiserror::Error;

/// Rendering width passed to html2text. Large enough that no hard line
/// breaks are baked into the extracted text; readers handle wrapping.
const TEXT_WIDTH: usize = 10_000;

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("HTML rewrite failed: {0}")]
    RewriteError(String),
}

/// Resolves image references found in chapter markup to the relative paths
/// of extracted image files.
///
/// Chapter documents refer to images with paths relative to their own
/// location (`../Images/pic.png`), while the extraction map is keyed by
/// manifest href (`OEBPS/Images/pic.png`). Lookup is tiered: exact
/// normalized match, then suffix match, then basename match.
pub struct ImageRewriter {
    by_href: BTreeMap<String, String>,
    by_name: HashMap<String, String>,
}

impl ImageRewriter {
    /// Build a rewriter from the manifest-href -> extracted-path map.
    pub fn new(images: &HashMap<String, String>) -> Self {
        let mut by_href = BTreeMap::new();
        let mut by_name = HashMap::new();

        for (href, target) in images {
            let norm = normalize_href(href).to_lowercase();
            if let Some(name) = norm.rsplit('/').next() {
                by_name
                    .entry(name.to_string())
                    .or_insert_with(|| target.clone());
            }
            by_href.insert(norm, target.clone());
        }

        Self { by_href, by_name }
    }

    /// Resolve a chapter-relative reference, or None when it matches no
    /// extracted image.
    pub fn resolve(&self, src: &str) -> Option<&str> {
        let norm = normalize_href(src).to_lowercase();
        if norm.is_empty() {
            return None;
        }

        if let Some(target) = self.by_href.get(&norm) {
            return Some(target);
        }

        // Suffix match with a path separator so "pic.png" cannot match
        // "atopic.png" by accident
        let suffix = format!("/{norm}");
        for (href, target) in &self.by_href {
            if href.ends_with(&suffix) {
                return Some(target);
            }
        }

        let name = norm.rsplit('/').next()?;
        self.by_name.get(name).map(|s| s.as_str())
    }
}

/// Normalize an href for matching: drop any fragment, URL-decode, unify
/// separators, and strip leading `./`, `../`, and `/` runs.
pub(crate) fn normalize_href(href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);
    let decoded = urlencoding::decode(href).unwrap_or_else(|_| href.into());
    let cleaned = decoded.replace('\\', "/");

    let mut rest = cleaned.trim_start_matches('/');
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        } else {
            break;
        }
    }
    rest.to_string()
}

fn is_external(url: &str) -> bool {
    url.starts_with("http") || url.starts_with("data:")
}

/// Sanitize one chapter document and rewrite its image references.
///
/// Removes script, style, link, meta, iframe, object, and embed elements
/// along with the document head; strips inline event handlers and
/// `javascript:` URLs; unwraps the html/body shell. Semantic markup
/// (headings, paragraphs, emphasis, lists, tables, images) passes through.
pub fn sanitize_chapter(html: &str, images: &ImageRewriter) -> Result<String, SanitizeError> {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            document_content_handlers: vec![
                // XML prologs tokenize as bogus comments; drop them with
                // every other comment
                doc_comments!(|c| {
                    c.remove();
                    Ok(())
                }),
                doctype!(|d| {
                    d.remove();
                    Ok(())
                }),
            ],
            element_content_handlers: vec![
                // Non-content and executable elements
                element!("head", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("script", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("style", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("link", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("meta", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("iframe", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("object", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("embed", |el| {
                    el.remove();
                    Ok(())
                }),
                // Unwrap the document shell, keeping its content
                element!("html", |el| {
                    el.remove_and_keep_content();
                    Ok(())
                }),
                element!("body", |el| {
                    el.remove_and_keep_content();
                    Ok(())
                }),
                // Point image references at the extracted files
                element!("img[src]", |el| {
                    if let Some(src) = el.get_attribute("src") {
                        if !is_external(&src) {
                            if let Some(target) = images.resolve(&src) {
                                el.set_attribute("src", target)?;
                            }
                        }
                    }
                    Ok(())
                }),
                // SVG image elements reference by href or xlink:href
                element!("image", |el| {
                    for attr in ["href", "xlink:href"] {
                        if let Some(href) = el.get_attribute(attr) {
                            if !is_external(&href) {
                                if let Some(target) = images.resolve(&href) {
                                    el.set_attribute(attr, target)?;
                                }
                            }
                        }
                    }
                    Ok(())
                }),
                // Strip event handlers and javascript: URLs everywhere
                element!("*", |el| {
                    // Any on* attribute is a handler; collect names first,
                    // removal needs the element mutably
                    let handlers: Vec<String> = el
                        .attributes()
                        .iter()
                        .map(|a| a.name())
                        .filter(|name| name.starts_with("on"))
                        .collect();
                    for name in handlers {
                        el.remove_attribute(&name);
                    }
                    if let Some(href) = el.get_attribute("href") {
                        if href.trim().to_lowercase().starts_with("javascript:") {
                            el.remove_attribute("href");
                        }
                    }
                    if let Some(src) = el.get_attribute("src") {
                        if src.trim().to_lowercase().starts_with("javascript:") {
                            el.remove_attribute("src");
                        }
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| SanitizeError::RewriteError(e.to_string()))?;

    Ok(result)
}

/// Plain text of a sanitized chapter, for clipboard and LLM use.
///
/// The trivial decorator renders headings, emphasis, and links as bare
/// text; the default decorator would add markdown-style markers.
pub fn extract_text(html: &str) -> String {
    let decorator = TrivialDecorator::new();
    match html2text::from_read_with_decorator(html.as_bytes(), TEXT_WIDTH, decorator) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("html2text failed: {err}");
            String::new()
        }
    }
}
