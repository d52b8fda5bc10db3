//! Library listing routes

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::library;
use crate::state::AppState;
use crate::templates::{chapter_href, BookCard, LibraryTemplate, RootsTemplate};

/// Create the library router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(library_view))
}

#[derive(Deserialize)]
struct LibraryQuery {
    dir_index: Option<i64>,
}

/// Library listing.
///
/// With several roots configured and no selection, shows the root chooser
/// instead. A selection that is negative or out of range falls back to
/// root 0.
async fn library_view(
    State(state): State<AppState>,
    Query(query): Query<LibraryQuery>,
) -> Result<Html<String>> {
    let roots = state.roots();

    if roots.len() > 1 && query.dir_index.is_none() {
        let template = RootsTemplate {
            roots: library::root_entries(roots),
        };
        return Ok(Html(template.render()?));
    }

    let root_index = query
        .dir_index
        .and_then(|index| usize::try_from(index).ok())
        .filter(|index| *index < roots.len())
        .unwrap_or(0);

    let mut books = Vec::new();
    for entry in library::scan_root(&roots[root_index], root_index) {
        // One unreadable book must not take the listing down; the cache
        // logs the failure
        let Some(book) = state.cache().get_or_load(&entry.id, &entry.path).await else {
            continue;
        };

        books.push(BookCard {
            href: chapter_href(&entry.id, 0),
            title: book.metadata.title.clone(),
            author: book.authors_joined(),
            chapters: book.chapter_count(),
        });
    }

    let template = LibraryTemplate { books };
    Ok(Html(template.render()?))
}
