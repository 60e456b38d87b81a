use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodeloomError {
    #[error("Evidence error: {0}")]
    Evidence(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Proposal error: {0}")]
    Proposal(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
