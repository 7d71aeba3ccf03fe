use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::selection::import::MaterialImportError;
use crate::workflows::selection::repository::RepositoryError;
use crate::workflows::selection::scoring::WeightError;
use crate::workflows::selection::service::SelectionServiceError;
use crate::workflows::tensile::CurveError;
use crate::workflows::thermal::DscError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Import(MaterialImportError),
    Weights(WeightError),
    Repository(RepositoryError),
    Tensile(CurveError),
    Dsc(DscError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "material import error: {}", err),
            AppError::Weights(err) => write!(f, "scoring blocked: {}", err),
            AppError::Repository(err) => write!(f, "catalog error: {}", err),
            AppError::Tensile(err) => write!(f, "tensile analysis error: {}", err),
            AppError::Dsc(err) => write!(f, "dsc analysis error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Weights(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Tensile(err) => Some(err),
            AppError::Dsc(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Import(_) | AppError::Tensile(_) | AppError::Dsc(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Weights(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Repository(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<MaterialImportError> for AppError {
    fn from(value: MaterialImportError) -> Self {
        Self::Import(value)
    }
}

impl From<WeightError> for AppError {
    fn from(value: WeightError) -> Self {
        Self::Weights(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<SelectionServiceError> for AppError {
    fn from(value: SelectionServiceError) -> Self {
        match value {
            SelectionServiceError::Repository(err) => Self::Repository(err),
            SelectionServiceError::Import(err) => Self::Import(err),
            SelectionServiceError::Weights(err) => Self::Weights(err),
        }
    }
}

impl From<CurveError> for AppError {
    fn from(value: CurveError) -> Self {
        Self::Tensile(value)
    }
}

impl From<DscError> for AppError {
    fn from(value: DscError) -> Self {
        Self::Dsc(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_failures_keep_their_variant_and_status() {
        let error: AppError = RepositoryError::Unavailable("disk full".to_string()).into();
        assert!(matches!(error, AppError::Repository(_)));
        assert!(error.to_string().contains("disk full"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_catalog_records_map_to_not_found() {
        let error: AppError = RepositoryError::NotFound.into();
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn blocked_weights_map_to_unprocessable() {
        let error: AppError = WeightError::SumMismatch { sum: 90 }.into();
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
