use thiserror::Error;

use crowd_agent::AgentError;
use crowd_core::{AgentId, Vec2};
use crowd_grid::GridError;

#[derive(Debug, Error)]
pub enum MotionError {
    /// A resolved move ended outside the grid.  Wall framing should make
    /// this unreachable, so it is treated as fatal.
    #[error("agent {agent} would leave the grid at {to}")]
    Escaped { agent: AgentId, to: Vec2 },

    #[error("agent {agent} is not listed in tile ({x}, {y})")]
    NotOccupying { agent: AgentId, x: i64, y: i64 },

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

pub type MotionResult<T> = Result<T, MotionError>;
