//! HTML processing module
//!
//! Chapter markup handling for processed books:
//! - sanitization (non-content and executable elements stripped)
//! - image reference rewriting onto extracted files
//! - plain-text extraction for LLM pairing
//!
//! Uses lol_html for streaming HTML processing.

mod sanitize;

pub use sanitize::{extract_text, sanitize_chapter, ImageRewriter, SanitizeError};
pub(crate) use sanitize::normalize_href;
