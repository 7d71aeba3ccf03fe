use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::Material;
use super::filter::FilterCondition;
use super::repository::{MaterialRepository, RepositoryError};
use super::scoring::WeightSet;
use super::service::{MaterialSelectionService, SelectionServiceError};

/// Router builder exposing the material catalog and the selection pipeline.
pub fn selection_router<R>(service: Arc<MaterialSelectionService<R>>) -> Router
where
    R: MaterialRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/materials",
            get(list_handler::<R>).post(add_handler::<R>),
        )
        .route(
            "/api/v1/materials/:name",
            axum::routing::delete(remove_handler::<R>),
        )
        .route("/api/v1/materials/import", post(import_handler::<R>))
        .route("/api/v1/materials/template", get(template_handler::<R>))
        .route("/api/v1/materials/export", get(export_handler::<R>))
        .route("/api/v1/materials/screen", post(screen_handler::<R>))
        .route("/api/v1/materials/filter", post(filter_handler::<R>))
        .route("/api/v1/materials/score", post(score_handler::<R>))
        .route("/api/v1/materials/mold-cost", post(mold_cost_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportRequest {
    pub(crate) csv: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FilterRequest {
    #[serde(default)]
    pub(crate) conditions: Vec<FilterCondition>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    #[serde(default)]
    pub(crate) conditions: Vec<FilterCondition>,
    pub(crate) weights: WeightSet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoldCostRequest {
    pub(crate) part_volume_m3: f64,
    #[serde(default)]
    pub(crate) conditions: Vec<FilterCondition>,
}

fn error_response(error: SelectionServiceError) -> Response {
    let status = match &error {
        SelectionServiceError::Import(_) => StatusCode::BAD_REQUEST,
        SelectionServiceError::Weights(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SelectionServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        SelectionServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<MaterialSelectionService<R>>>,
) -> Response
where
    R: MaterialRepository + 'static,
{
    match service.list() {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_handler<R>(
    State(service): State<Arc<MaterialSelectionService<R>>>,
    axum::Json(material): axum::Json<Material>,
) -> Response
where
    R: MaterialRepository + 'static,
{
    match service.add(material) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_handler<R>(
    State(service): State<Arc<MaterialSelectionService<R>>>,
    Path(name): Path<String>,
) -> Response
where
    R: MaterialRepository + 'static,
{
    match service.remove(&name) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn import_handler<R>(
    State(service): State<Arc<MaterialSelectionService<R>>>,
    axum::Json(request): axum::Json<ImportRequest>,
) -> Response
where
    R: MaterialRepository + 'static,
{
    match service.import(request.csv.as_bytes()) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn template_handler<R>(
    State(service): State<Arc<MaterialSelectionService<R>>>,
) -> Response
where
    R: MaterialRepository + 'static,
{
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv")],
        service.template(),
    )
        .into_response()
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<MaterialSelectionService<R>>>,
) -> Response
where
    R: MaterialRepository + 'static,
{
    match service.export() {
        Ok(table) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv")],
            table,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn screen_handler<R>(
    State(service): State<Arc<MaterialSelectionService<R>>>,
) -> Response
where
    R: MaterialRepository + 'static,
{
    match service.screen() {
        Ok(outcomes) => (StatusCode::OK, axum::Json(outcomes)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn filter_handler<R>(
    State(service): State<Arc<MaterialSelectionService<R>>>,
    axum::Json(request): axum::Json<FilterRequest>,
) -> Response
where
    R: MaterialRepository + 'static,
{
    match service.shortlist(&request.conditions) {
        Ok(materials) => {
            let views: Vec<_> = materials.iter().map(Material::view).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<MaterialSelectionService<R>>>,
    axum::Json(request): axum::Json<ScoreRequest>,
) -> Response
where
    R: MaterialRepository + 'static,
{
    match service.score(&request.conditions, &request.weights) {
        Ok(ranked) => (StatusCode::OK, axum::Json(ranked)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn mold_cost_handler<R>(
    State(service): State<Arc<MaterialSelectionService<R>>>,
    axum::Json(request): axum::Json<MoldCostRequest>,
) -> Response
where
    R: MaterialRepository + 'static,
{
    match service.mold_cost(request.part_volume_m3, &request.conditions) {
        Ok(estimates) => (StatusCode::OK, axum::Json(estimates)).into_response(),
        Err(error) => error_response(error),
    }
}
