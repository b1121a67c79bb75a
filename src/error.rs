use async_graphql::ErrorExtensions;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Stable machine-readable code reported in GraphQL error extensions
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Database {
            message: err.to_string(),
        }
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        // Internal failures are logged here and reported without details
        let message = match code {
            "INTERNAL_ERROR" => {
                tracing::error!("Internal error while resolving: {}", self);
                "Internal error".to_string()
            }
            _ => self.to_string(),
        };
        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_error_kind() {
        assert_eq!(AppError::NotFound("tier".into()).code(), "NOT_FOUND");
        assert_eq!(AppError::Validation("year".into()).code(), "VALIDATION_ERROR");
        assert_eq!(
            AppError::InvalidArgument("limit".into()).code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(
            AppError::Database {
                message: "locked".into()
            }
            .code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn internal_errors_hide_details_in_graphql() {
        let err = AppError::Database {
            message: "disk I/O error".into(),
        }
        .extend();
        assert_eq!(err.message, "Internal error");

        let err = AppError::NotFound("Tier `gold` not found".into()).extend();
        assert!(err.message.contains("gold"));
    }
}
