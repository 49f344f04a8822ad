//! API route definitions.

mod health;
mod search;

pub use search::{SearchParams, SearchResponse, query_text};

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::middleware;
use axum::response::Response;
use axum::routing::get;

use crate::state::AppState;

/// Build the complete API router.
///
/// # Route Structure
///
/// - `GET /health` - Health check
/// - `GET /search?q=...` - Search photos by free text
/// - `POST /search` - Same, with `{"q": "..."}` as the body
///
/// Every response carries `Access-Control-Allow-Origin: *`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/search", get(search::search_get).post(search::search_post))
        .layer(middleware::map_response(add_cors_header))
        .with_state(state)
}

/// Allow any origin on every response, errors included.
async fn add_cors_header(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}
