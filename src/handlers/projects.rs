use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::db::Project;
use crate::error::{Action, ApiFailure, PortfolioError, ResultExt};
use crate::middleware::UploadForm;
use crate::router::PortfolioState;
use crate::types::{CreatedResponse, MessageResponse, ProjectFields};

/// POST /api/projects
pub async fn create_project(
    State(state): State<PortfolioState>,
    form: Result<UploadForm<ProjectFields>, PortfolioError>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiFailure> {
    let form = form.during(Action::AddProject)?;
    let image_path = form.image_path();
    info!(image_path = ?image_path, "Saving image path");

    let ProjectFields { title, description } = &form.fields;
    let id = state
        .store
        .insert_project(title.as_deref(), description.as_deref(), image_path)
        .await
        .during(Action::AddProject)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new("Project added successfully", id)),
    ))
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<PortfolioState>,
) -> Result<Json<Vec<Project>>, ApiFailure> {
    let projects = state
        .store
        .list_projects()
        .await
        .during(Action::FetchProjects)?;
    Ok(Json(projects))
}

/// PUT /api/projects/{id}
pub async fn update_project(
    State(state): State<PortfolioState>,
    Path(id): Path<String>,
    form: Result<UploadForm<ProjectFields>, PortfolioError>,
) -> Result<Json<MessageResponse>, ApiFailure> {
    let form = form.during(Action::UpdateProject)?;

    let ProjectFields { title, description } = &form.fields;
    let affected = state
        .store
        .update_project(
            &id,
            title.as_deref(),
            description.as_deref(),
            form.image_path(),
        )
        .await
        .during(Action::UpdateProject)?;
    info!(id = %id, affected, replaced_image = form.image.is_some(), "project updated");

    Ok(Json(MessageResponse::new("Project updated successfully")))
}

/// DELETE /api/projects/{id} -> leaves any uploaded image on disk.
pub async fn delete_project(
    State(state): State<PortfolioState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiFailure> {
    state
        .store
        .delete_project(&id)
        .await
        .during(Action::DeleteProject)?;
    Ok(Json(MessageResponse::new("Project deleted successfully")))
}
