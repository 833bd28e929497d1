use axum::{Json, extract::State, http::StatusCode};

use crate::error::{Action, ApiFailure, PortfolioError, ResultExt};
use crate::middleware::JsonForm;
use crate::router::PortfolioState;
use crate::types::{MessageFields, MessageResponse};

/// POST /api/messages
pub async fn create_message(
    State(state): State<PortfolioState>,
    form: Result<JsonForm<MessageFields>, PortfolioError>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiFailure> {
    let JsonForm(body) = form.during(Action::AddMessage)?;

    state
        .store
        .insert_message(
            body.name.as_deref(),
            body.email.as_deref(),
            body.message.as_deref(),
        )
        .await
        .during(Action::AddMessage)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Message sent successfully")),
    ))
}
