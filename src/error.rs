use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// A pointer-down arrived for something that is not one of the nine cells
    #[error("unknown cell id `{0}`")]
    UnknownCell(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type GameResult<T> = Result<T, GameError>;
