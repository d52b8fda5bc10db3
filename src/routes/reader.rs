//! Chapter reading routes
//!
//! The reader interface: chapter pages with prev/next and TOC navigation,
//! plus book-scoped image serving for the references rewritten during
//! processing.

use askama::Template;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, Redirect, Response},
    routing::get,
    Router,
};

use crate::book;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::templates::{chapter_href, toc_items, ReaderTemplate};

/// Create the reader router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/read/:book_id", get(first_chapter))
        .route("/read/:book_id/:chapter_index", get(read_chapter))
        .route("/read/:book_id/images/:image_name", get(serve_image))
}

/// Convenience entry: send the reader to chapter 0.
async fn first_chapter(Path(book_id): Path<String>) -> Redirect {
    Redirect::to(&chapter_href(&book_id, 0))
}

/// The main reader interface.
async fn read_chapter(
    State(state): State<AppState>,
    Path((book_id, chapter_index)): Path<(String, String)>,
) -> Result<Html<String>> {
    let found = state.load_book(&book_id).await;
    let book = found.ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

    // Parsed by hand so "-1" and other non-indices turn into 404, not 400
    let chapter_index: usize = chapter_index
        .parse()
        .map_err(|_| AppError::NotFound("Chapter not found".to_string()))?;

    let chapter = book
        .spine
        .get(chapter_index)
        .ok_or_else(|| AppError::NotFound("Chapter not found".to_string()))?;

    let prev_href = chapter_index
        .checked_sub(1)
        .map(|index| chapter_href(&book_id, index));
    let next_href = (chapter_index + 1 < book.chapter_count())
        .then(|| chapter_href(&book_id, chapter_index + 1));

    let template = ReaderTemplate {
        book_title: &book.metadata.title,
        chapter_title: chapter.title.as_deref(),
        chapter_html: &chapter.content,
        chapter_text: &chapter.text,
        chapter_number: chapter_index + 1,
        chapter_count: book.chapter_count(),
        prev_href,
        next_href,
        toc: toc_items(&book, &book_id, chapter_index),
    };

    Ok(Html(template.render()?))
}

/// Book-scoped image bytes.
///
/// The requested name is reduced to its final component before joining
/// under the book's images directory, so traversal attempts resolve inside
/// the book dir or miss entirely.
async fn serve_image(
    State(state): State<AppState>,
    Path((book_id, image_name)): Path<(String, String)>,
) -> Result<Response> {
    let book_dir = state
        .book_dir(&book_id)
        .ok_or_else(|| AppError::NotFound("Book path not found".to_string()))?;

    let safe_name = std::path::Path::new(&image_name)
        .file_name()
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;
    let image_path = book_dir.join(book::IMAGES_DIR).join(safe_name);

    let data = tokio::fs::read(&image_path).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound("Image not found".to_string())
        } else {
            AppError::Io(err)
        }
    })?;

    let content_type = mime_guess::from_path(&image_path)
        .first_or_octet_stream()
        .to_string();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(e.to_string()))?)
}
