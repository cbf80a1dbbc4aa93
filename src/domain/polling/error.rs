use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum PollingError {
    #[error("store error: {0}")]
    Store(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<PollingError> for AppError {
    fn from(err: PollingError) -> Self {
        match err {
            PollingError::Store(msg) => AppError::Internal(msg),
            PollingError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
