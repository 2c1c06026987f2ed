//! Tipos de error del visor. Ninguno es fatal: cada uno queda acotado a la
//! zona de la interfaz afectada. La falta de portapapeles solo existe en el
//! navegador y la resuelve el cliente mostrando el enlace.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    /// El directorio o el manifiesto no se pudo leer o interpretar.
    #[error("Error al cargar los diagramas desde {location}: {reason}")]
    CatalogUnavailable { location: String, reason: String },

    /// El identificador no pertenece al catálogo actual.
    #[error("Diagrama no encontrado: {0}")]
    DiagramNotFound(String),

    /// Falló la lectura del contenido SVG de un diagrama.
    #[error("Error al cargar el diagrama {id}: {reason}")]
    ContentFetchFailed { id: String, reason: String },
}

impl ViewerError {
    pub fn catalog(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::CatalogUnavailable {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn content(id: impl Into<String>, reason: impl ToString) -> Self {
        Self::ContentFetchFailed {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DiagramNotFound(_) => StatusCode::NOT_FOUND,
            Self::CatalogUnavailable { .. } | Self::ContentFetchFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ViewerError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
