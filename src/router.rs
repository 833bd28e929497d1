use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::db::PortfolioStore;
use crate::handlers::{messages, projects, skills};
use crate::service::uploads::UploadStore;

/// Everything a handler needs, passed in at startup.
#[derive(Clone)]
pub struct PortfolioState {
    pub store: PortfolioStore,
    pub uploads: UploadStore,
    pub body_limit: usize,
}

impl PortfolioState {
    pub fn new(store: PortfolioStore, uploads: UploadStore, body_limit: usize) -> Self {
        Self {
            store,
            uploads,
            body_limit,
        }
    }
}

impl FromRef<PortfolioState> for UploadStore {
    fn from_ref(state: &PortfolioState) -> Self {
        state.uploads.clone()
    }
}

pub fn portfolio_router(state: PortfolioState) -> Router {
    let static_files = ServeDir::new(state.uploads.dir());
    let upload_prefix = state.uploads.url_prefix();
    let body_limit = state.body_limit;

    Router::new()
        .route(
            "/api/skills",
            get(skills::list_skills).post(skills::create_skill),
        )
        .route(
            "/api/skills/{id}",
            put(skills::update_skill).delete(skills::delete_skill),
        )
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/projects/{id}",
            put(projects::update_project).delete(projects::delete_project),
        )
        .route("/api/messages", post(messages::create_message))
        .nest_service(&upload_prefix, static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
