use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{info, warn};

use crate::db::Skill;
use crate::error::{Action, ApiFailure, PortfolioError, ResultExt};
use crate::middleware::UploadForm;
use crate::router::PortfolioState;
use crate::types::{CreatedResponse, DeleteSkillResponse, MessageResponse, SkillFields};

/// POST /api/skills
pub async fn create_skill(
    State(state): State<PortfolioState>,
    form: Result<UploadForm<SkillFields>, PortfolioError>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiFailure> {
    let form = form.during(Action::AddSkill)?;
    let image_path = form.image_path();
    info!(image_path = ?image_path, "Saving image path");

    let id = state
        .store
        .insert_skill(form.fields.title.as_deref(), image_path)
        .await
        .during(Action::AddSkill)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new("Skill added successfully", id)),
    ))
}

/// GET /api/skills
pub async fn list_skills(
    State(state): State<PortfolioState>,
) -> Result<Json<Vec<Skill>>, ApiFailure> {
    let skills = state.store.list_skills().await.during(Action::FetchSkills)?;
    Ok(Json(skills))
}

/// PUT /api/skills/{id} -> the stored image is only replaced when a new file arrives.
pub async fn update_skill(
    State(state): State<PortfolioState>,
    Path(id): Path<String>,
    form: Result<UploadForm<SkillFields>, PortfolioError>,
) -> Result<Json<MessageResponse>, ApiFailure> {
    let form = form.during(Action::UpdateSkill)?;

    let affected = state
        .store
        .update_skill(&id, form.fields.title.as_deref(), form.image_path())
        .await
        .during(Action::UpdateSkill)?;
    info!(id = %id, affected, replaced_image = form.image.is_some(), "skill updated");

    Ok(Json(MessageResponse::new("Skill updated successfully")))
}

/// DELETE /api/skills/{id}
///
/// Reads the stored image path, removes the file best-effort, then deletes
/// the row. A failed unlink is logged and does not stop the deletion.
pub async fn delete_skill(
    State(state): State<PortfolioState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteSkillResponse>, ApiFailure> {
    let image_path = state
        .store
        .skill_image_path(&id)
        .await
        .during(Action::DeleteSkill)?;

    if let Some(path) = image_path.as_deref()
        && let Err(e) = state.uploads.remove(path).await
    {
        warn!(id = %id, path = %path, error = %e, "Error deleting image file");
    }

    state
        .store
        .delete_skill(&id)
        .await
        .during(Action::DeleteSkill)?;

    Ok(Json(DeleteSkillResponse {
        success: true,
        message: "Skill deleted successfully".to_string(),
    }))
}
