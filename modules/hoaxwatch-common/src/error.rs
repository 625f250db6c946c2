use thiserror::Error;

#[derive(Error, Debug)]
pub enum HoaxWatchError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Fact-check error: {0}")]
    FactCheck(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
