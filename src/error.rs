use axum::extract::multipart::MultipartError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

use crate::types::responses::{DeleteSkillResponse, ErrorResponse};

#[derive(Debug, ThisError)]
pub enum PortfolioError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    MultipartError(#[from] MultipartError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Unexpected file field: {0}")]
    UnexpectedFile(String),

    #[error("Database connection is not available")]
    StoreUnavailable,

    #[error("Configuration error: {0}")]
    ConfigError(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PortfolioError {
    fn is_client_error(&self) -> bool {
        matches!(self, PortfolioError::InvalidBody(_))
    }
}

/// Fallback mapping used when an extractor rejects before a handler runs.
impl IntoResponse for PortfolioError {
    fn into_response(self) -> axum::response::Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// The operation a handler was performing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddSkill,
    AddProject,
    FetchSkills,
    FetchProjects,
    UpdateSkill,
    UpdateProject,
    DeleteProject,
    DeleteSkill,
    AddMessage,
}

impl Action {
    pub fn failure_message(self) -> &'static str {
        match self {
            Action::AddSkill => "Error adding skill",
            Action::AddProject => "Error adding project",
            Action::FetchSkills => "Error fetching skills",
            Action::FetchProjects => "Error fetching projects",
            Action::UpdateSkill => "Error updating skill",
            Action::UpdateProject => "Error updating project",
            Action::DeleteProject => "Error deleting project",
            Action::DeleteSkill => "Error deleting skill",
            Action::AddMessage => "Error adding message",
        }
    }
}

/// Handler-level error: the failed action plus its cause.
#[derive(Debug, ThisError)]
#[error("{}: {source}", .action.failure_message())]
pub struct ApiFailure {
    pub action: Action,
    #[source]
    pub source: PortfolioError,
}

impl ApiFailure {
    pub fn new(action: Action, source: impl Into<PortfolioError>) -> Self {
        Self {
            action,
            source: source.into(),
        }
    }
}

pub trait ResultExt<T> {
    /// Tag an error with the action that was in progress.
    fn during(self, action: Action) -> Result<T, ApiFailure>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<PortfolioError>,
{
    fn during(self, action: Action) -> Result<T, ApiFailure> {
        self.map_err(|e| ApiFailure::new(action, e))
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> axum::response::Response {
        error!(action = ?self.action, error = %self.source, "request failed");

        if self.source.is_client_error() {
            return self.source.into_response();
        }

        let message = self.action.failure_message().to_string();
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        match self.action {
            Action::DeleteSkill => (
                status,
                Json(DeleteSkillResponse {
                    success: false,
                    message,
                }),
            )
                .into_response(),
            _ => (status, Json(ErrorResponse { error: message })).into_response(),
        }
    }
}
