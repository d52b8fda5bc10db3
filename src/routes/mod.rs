//! Route modules for the reader server.

use axum::Router;

use crate::state::AppState;

pub mod library;
pub mod reader;

/// The full application router, without layers or state applied.
pub fn router() -> Router<AppState> {
    Router::new().merge(library::router()).merge(reader::router())
}
