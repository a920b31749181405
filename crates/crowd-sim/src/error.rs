use thiserror::Error;

use crowd_agent::AgentError;
use crowd_core::Vec2;
use crowd_grid::GridError;
use crowd_motion::MotionError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("cannot place an agent at {0}: tile is not walkable")]
    NotWalkable(Vec2),

    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("movement error: {0}")]
    Motion(#[from] MotionError),
}

pub type SimResult<T> = Result<T, SimError>;
