// Matchmaking orchestration: build the request from stored records, call the external
// service, normalize whichever response shape comes back.
// All scoring happens in the external service; nothing here ranks candidates.

pub mod client;
pub mod handlers;
pub mod normalizer;
pub mod request_builder;
pub mod runner;

use thiserror::Error;

pub use client::{MatchClient, Matchmaker};
pub use runner::MatchRunner;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("could not fetch {collection}: {source}")]
    Fetch {
        collection: &'static str,
        source: anyhow::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("matchmaking service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response body is not JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unsupported response shape: {0}")]
    UnsupportedShape(String),
}
