use std::path::PathBuf;

use thiserror::Error;

use crowd_agent::AgentError;
use crowd_grid::GridError;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("destination {destination:?} refers to unknown region {region_id}")]
    UnknownRegion { destination: String, region_id: i32 },

    #[error("map {0} is not a text map; decode it and use Scenario::from_document")]
    UnsupportedMap(PathBuf),

    #[error("scenario ends ({end}) before it starts ({start})")]
    EmptyWindow { start: i64, end: i64 },

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
