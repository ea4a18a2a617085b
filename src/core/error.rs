use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio::sync::{mpsc, oneshot};

/// A common error type that can be used throughout the App
#[derive(thiserror::Error, Debug)]
pub enum Error {
    // 400 Bad Request
    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),
    #[error("Invalid room id")]
    InvalidRoomId,

    // 404 NotFound
    #[error("Resource not found")]
    NotFound,

    // 422 UnprocessableEntity
    #[error(transparent)]
    QueryRejection(#[from] QueryRejection),
    #[error(transparent)]
    JsonRejection(#[from] JsonRejection),
    #[error(transparent)]
    PathRejection(#[from] PathRejection),

    // 500 Internal Server Error
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Bcrypt(#[from] bcrypt::BcryptError),

    // Websocket Error
    #[error("wrong-password")]
    WrongPassword,
    #[error("unauthorized")]
    Unauthorized,
    #[error("already-joined")]
    AlreadyJoined,
    #[error("bad-request")]
    BadRequest,
    #[error("Failed to reach the hub")]
    SendMessage,
}

// Convert mpsc send error to Error
impl<T> From<mpsc::error::SendError<T>> for Error {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        Self::SendMessage
    }
}

impl From<oneshot::error::RecvError> for Error {
    fn from(_: oneshot::error::RecvError) -> Self {
        Self::SendMessage
    }
}

impl Error {
    pub fn into_error(self) -> (StatusCode, String) {
        let status = match self {
            // 400
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::InvalidRoomId => StatusCode::BAD_REQUEST,
            // 404
            Error::NotFound => StatusCode::NOT_FOUND,
            // 422
            Error::QueryRejection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::JsonRejection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::PathRejection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => {
                tracing::error!("{}", self.to_string());
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server internal error".into(),
                );
            }
        };
        (status, self.to_string())
    }

    /// Text reported to a websocket peer
    ///
    /// Upstream failures collapse into `bad-request` so causes never reach the wire.
    pub fn wire_text(&self) -> String {
        match self {
            Error::WrongPassword | Error::Unauthorized | Error::AlreadyJoined => self.to_string(),
            _ => Error::BadRequest.to_string(),
        }
    }

    /// Whether the connection can keep going after reporting this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::SendMessage)
    }
}

// Axum allows you to return Error which impl IntoResponse
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_error().into_response()
    }
}

// ========================// tests //======================== //
