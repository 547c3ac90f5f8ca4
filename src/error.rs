use crate::grid::Position;

/// Errors surfaced by the grid engine. "No path found" is never an error;
/// searches report it as an empty path instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MazeError {
    #[error("invalid maze dimensions: {0}")]
    InvalidDimension(String),
    #[error("position {0:?} is outside the grid or on a border wall")]
    OutOfBounds(Position),
    #[error("unknown search strategy: {0:?}")]
    UnknownStrategy(String),
    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),
    #[error("computation exceeded its deadline")]
    ComputationTimeout,
}
