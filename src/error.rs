use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Shown to the user whenever the store cannot be reached.
pub const DB_CONNECT_ERROR: &str = "Unable to connect to the database. Please try again later.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad form input; the form is shown again with this message.
    #[error("{0}")]
    Validation(String),

    /// Bad credentials; same treatment as `Validation`.
    #[error("{0}")]
    Auth(String),

    #[error("{}", DB_CONNECT_ERROR)]
    Connection,

    #[error("{0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors the handler turns into a message on the page instead of an
    /// error response.
    pub fn user_message(&self) -> Option<String> {
        match self {
            AppError::Validation(msg) | AppError::Auth(msg) => Some(msg.clone()),
            AppError::Connection => Some(DB_CONNECT_ERROR.to_string()),
            _ => None,
        }
    }

    /// `Ok(message)` for errors shown on the page, `Err(self)` for the rest.
    pub fn recover(self) -> AppResult<String> {
        match self.user_message() {
            Some(message) => {
                tracing::debug!("Recovered at handler: {}", message);
                Ok(message)
            }
            None => Err(self),
        }
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        tracing::warn!("Store unreachable: {}", e);
        AppError::Connection
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) | AppError::Auth(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Connection => (
                StatusCode::SERVICE_UNAVAILABLE,
                DB_CONNECT_ERROR.to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Hashing(e) => {
                tracing::error!("Password hashing error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(
            response_status(AppError::NotFound("gone".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn forbidden_returns_403() {
        assert_eq!(response_status(AppError::Forbidden), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn connection_returns_503() {
        assert_eq!(
            response_status(AppError::Connection),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn user_message_only_for_recoverable_errors() {
        assert_eq!(
            AppError::Validation("Title is required.".into()).user_message(),
            Some("Title is required.".to_string())
        );
        assert_eq!(
            AppError::Connection.user_message(),
            Some(DB_CONNECT_ERROR.to_string())
        );
        assert!(AppError::Forbidden.user_message().is_none());
        assert!(AppError::NotFound("x".into()).user_message().is_none());
    }
}
