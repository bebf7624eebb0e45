//! Request/response records for the search relay.

pub mod search;

pub use search::{SearchLogRecord, SearchRequest, SearchResponse};
