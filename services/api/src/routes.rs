use crate::infra::{AppState, CurveStore};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use labspace::workflows::library::{FileRecord, LibraryError};
use labspace::workflows::selection::{selection_router, MaterialRepository, MaterialSelectionService};
use labspace::workflows::tensile;
use labspace::workflows::thermal::{self, DscConfig};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Full route table: the selection catalog endpoints from the core crate plus
/// the curve-analysis and library endpoints, health, readiness, and metrics.
pub(crate) fn with_routes<R>(selection: Arc<MaterialSelectionService<R>>) -> axum::Router
where
    R: MaterialRepository + 'static,
{
    selection_router(selection)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/tensile/analyze",
            axum::routing::post(tensile_analyze_endpoint),
        )
        .route(
            "/api/v1/dsc/analyze",
            axum::routing::post(dsc_analyze_endpoint),
        )
        .route(
            "/api/v1/library/:kind/files",
            axum::routing::get(library_list_endpoint).post(library_upload_endpoint),
        )
        .route(
            "/api/v1/library/:kind/files/:name",
            axum::routing::get(library_content_endpoint).delete(library_delete_endpoint),
        )
        .route(
            "/api/v1/library/:kind/files/:name/analyze",
            axum::routing::post(library_analyze_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LibraryKind {
    Tensile,
    Dsc,
}

impl LibraryKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "tensile" => Some(Self::Tensile),
            "dsc" => Some(Self::Dsc),
            _ => None,
        }
    }

    fn store(self, state: &AppState) -> Arc<CurveStore> {
        match self {
            Self::Tensile => state.tensile_files.clone(),
            Self::Dsc => state.dsc_files.clone(),
        }
    }
}

fn unknown_library(raw: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("no curve library named '{raw}'") })),
    )
        .into_response()
}

fn library_error(error: LibraryError) -> Response {
    let status = match &error {
        LibraryError::NotFound(_) => StatusCode::NOT_FOUND,
        LibraryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct TensileAnalyzeRequest {
    #[serde(default = "default_specimen")]
    pub(crate) specimen: String,
    pub(crate) content: String,
}

fn default_specimen() -> String {
    "inline".to_string()
}

pub(crate) async fn tensile_analyze_endpoint(
    Json(request): Json<TensileAnalyzeRequest>,
) -> Response {
    match tensile::analyze(&request.specimen, &request.content) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DscAnalyzeRequest {
    #[serde(default = "default_specimen")]
    pub(crate) specimen: String,
    pub(crate) content: String,
    #[serde(default)]
    pub(crate) config: Option<DscConfig>,
}

pub(crate) async fn dsc_analyze_endpoint(Json(request): Json<DscAnalyzeRequest>) -> Response {
    let config = request.config.unwrap_or_default();
    match thermal::analyze(&request.specimen, &request.content, &config) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadRequest {
    pub(crate) file_name: String,
    #[serde(default)]
    pub(crate) display_name: String,
    #[serde(default = "default_uploader")]
    pub(crate) uploaded_by: String,
    pub(crate) content: String,
}

fn default_uploader() -> String {
    "unknown".to_string()
}

pub(crate) async fn library_list_endpoint(
    Extension(state): Extension<AppState>,
    Path(kind): Path<String>,
) -> Response {
    let Some(kind) = LibraryKind::parse(&kind) else {
        return unknown_library(&kind);
    };
    match kind.store(&state).list() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => library_error(error),
    }
}

pub(crate) async fn library_upload_endpoint(
    Extension(state): Extension<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<UploadRequest>,
) -> Response {
    let Some(kind) = LibraryKind::parse(&kind) else {
        return unknown_library(&kind);
    };
    let record = FileRecord::new(
        &request.file_name,
        &request.display_name,
        &request.uploaded_by,
    );
    match kind.store(&state).save(record, request.content) {
        Ok(saved) => (StatusCode::CREATED, Json(saved)).into_response(),
        Err(error) => library_error(error),
    }
}

pub(crate) async fn library_content_endpoint(
    Extension(state): Extension<AppState>,
    Path((kind, name)): Path<(String, String)>,
) -> Response {
    let Some(kind) = LibraryKind::parse(&kind) else {
        return unknown_library(&kind);
    };
    match kind.store(&state).content(&name) {
        Ok(content) => {
            let mime = mime_guess::from_path(&name).first_or_text_plain();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.essence_str().to_string())],
                content,
            )
                .into_response()
        }
        Err(error) => library_error(error),
    }
}

pub(crate) async fn library_delete_endpoint(
    Extension(state): Extension<AppState>,
    Path((kind, name)): Path<(String, String)>,
) -> Response {
    let Some(kind) = LibraryKind::parse(&kind) else {
        return unknown_library(&kind);
    };
    match kind.store(&state).remove(&name) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => library_error(error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StoredAnalyzeRequest {
    #[serde(default)]
    pub(crate) config: Option<DscConfig>,
}

pub(crate) async fn library_analyze_endpoint(
    Extension(state): Extension<AppState>,
    Path((kind, name)): Path<(String, String)>,
    body: Option<Json<StoredAnalyzeRequest>>,
) -> Response {
    let Some(kind) = LibraryKind::parse(&kind) else {
        return unknown_library(&kind);
    };
    let content = match kind.store(&state).content(&name) {
        Ok(content) => content,
        Err(error) => return library_error(error),
    };

    match kind {
        LibraryKind::Tensile => match tensile::analyze(&name, &content) {
            Ok(report) => (StatusCode::OK, Json(report)).into_response(),
            Err(error) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
        },
        LibraryKind::Dsc => {
            let config = body
                .and_then(|Json(request)| request.config)
                .unwrap_or_default();
            match thermal::analyze(&name, &content, &config) {
                Ok(report) => (StatusCode::OK, Json(report)).into_response(),
                Err(error) => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": error.to_string() })),
                )
                    .into_response(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;

    const TENSILE_SAMPLE: &str = "\
preamble
Time measurement,Extension,Force,Strain 1,Strain 2,Stress
0.0,0.00,0.0,0.00,0.00,0.0
0.1,0.02,12.0,0.05,0.10,12.5
0.2,0.04,30.0,0.10,0.20,30.2
";

    #[tokio::test]
    async fn tensile_endpoint_returns_the_report() {
        let request = TensileAnalyzeRequest {
            specimen: "S-01".to_string(),
            content: TENSILE_SAMPLE.to_string(),
        };
        let response = tensile_analyze_endpoint(Json(request)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn tensile_endpoint_rejects_unparseable_uploads() {
        let request = TensileAnalyzeRequest {
            specimen: "bad".to_string(),
            content: "nothing useful".to_string(),
        };
        let response = tensile_analyze_endpoint(Json(request)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn dsc_endpoint_rejects_short_files() {
        let request = DscAnalyzeRequest {
            specimen: "tiny".to_string(),
            content: "0.0 25.0 0.1\n0.1 26.0 0.1\n".to_string(),
            config: None,
        };
        let response = dsc_analyze_endpoint(Json(request)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
