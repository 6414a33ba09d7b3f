use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid entry: {0}")]
    InvalidEntry(String),
    #[error("missing input: {0}")]
    MissingInput(&'static str),
    #[error("repository failure: {0}")]
    Repository(#[source] anyhow::Error),
}

impl CoreError {
    pub fn repository(err: impl Into<anyhow::Error>) -> Self {
        Self::Repository(err.into())
    }
}
