use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgoraError {
    #[error("storage error: {message}")]
    Storage { message: String },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("validation error: {message}")]
    Validation { message: String },
    #[error("config error: {message}")]
    Config { message: String },
}

impl AgoraError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type AgoraResult<T> = Result<T, AgoraError>;

impl From<sea_orm::DbErr> for AgoraError {
    fn from(value: sea_orm::DbErr) -> Self {
        AgoraError::storage(value.to_string())
    }
}
