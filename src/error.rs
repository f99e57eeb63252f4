use thiserror::Error;

/// Terminal failures of a single page render. Each one replaces the loading
/// indicator with its message; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Failed to load game data: {0}")]
    LoadFailure(String),
    #[error("No game specified")]
    MissingParameter,
    #[error("Game not found")]
    NotFound,
}

impl PageError {
    pub fn load(reason: impl Into<String>) -> Self {
        PageError::LoadFailure(reason.into())
    }
}
