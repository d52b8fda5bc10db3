//! Reader3
//!
//! Converts EPUB files into locally browsable, chapter-paginated web
//! books, built for pairing book text with LLM workflows. Two phases:
//!
//! - the `process` binary parses one EPUB into a `<stem>_data/` directory
//!   holding a `book.json` artifact plus extracted images
//! - the `serve` binary lists those directories as a library and renders
//!   chapters with prev/next and TOC navigation
//!
//! # Modules
//!
//! - `epub`: EPUB container access (metadata, spine, TOC, images)
//! - `html`: chapter sanitization, image reference rewriting, text
//!   extraction
//! - `processor`: the EPUB -> book directory pipeline
//! - `book`: the serialized artifact types
//! - `library`, `cache`, `state`, `routes`, `templates`: the server

pub mod book;
pub mod cache;
pub mod config;
pub mod epub;
pub mod error;
pub mod html;
pub mod library;
pub mod processor;
pub mod routes;
pub mod state;
pub mod templates;
