//! EPUB parsing module
//!
//! Wraps the rbook crate behind a small API that yields exactly what the
//! processor needs: metadata, the navigation tree, spine documents in
//! reading order, and manifest images.

mod parser;

pub use parser::{EpubParser, ParseError, RawChapter, RawImage, RawTocEntry};
