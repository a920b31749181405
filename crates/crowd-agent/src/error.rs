//! Agent-subsystem error type.

use thiserror::Error;

use crowd_core::{AgentId, DestinationId};
use crowd_grid::GridError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent {0} has no position")]
    UnknownAgent(AgentId),

    #[error("destination {0} is not registered")]
    UnknownDestination(DestinationId),

    #[error("too many destinations (limit {})", u16::MAX)]
    TooManyDestinations,

    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type AgentResult<T> = Result<T, AgentError>;
