//! snapseek search API.
//!
//! Answers free-text photo searches by translating the text into labels and
//! querying the index with an exact-match terms filter.
//!
//! # Architecture
//!
//! - **AppState**: configuration, signed index client, intent resolver
//! - **Extract**: NLU resolver with deterministic tokenizer fallback
//! - **Search**: terms query, hit mapping, empty-label short circuit
//! - **Routes**: HTTP handlers and the cross-origin response header

mod error;
pub mod extract;
pub mod intent;
mod routes;
pub mod search;
mod state;

pub use self::error::{ApiError, IntentError, MISSING_QUERY_MESSAGE};
pub use self::extract::{Extraction, ExtractionSource, STOP_WORDS, extract_labels, fallback_labels};
pub use self::intent::{IntentResolver, LexResolver};
pub use self::routes::{SearchParams, SearchResponse, query_text, router};
pub use self::search::{map_hits, run_search, terms_query};
pub use self::state::{AppState, Config};
