use crate::ledger::LedgerError;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use tracing::warn;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "password required".to_string(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        warn!("rejected request: {err}");
        match err {
            LedgerError::GoalNotFound(_) | LedgerError::EntryNotFound(_) => {
                Self::not_found(err.to_string())
            }
            LedgerError::InvalidAmount(_) | LedgerError::InvalidGoal(_) => {
                Self::bad_request(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("rejected request body: {}", rejection.body_text());
        Self::bad_request(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        warn!("rejected form body: {}", rejection.body_text());
        Self::bad_request(rejection.body_text())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
