use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("Repetition not found: {0}")]
    RepetitionNotFound(usize),
}

pub type Result<T> = std::result::Result<T, MarketError>;
