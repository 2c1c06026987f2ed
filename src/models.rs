//! Modelos de dominio: registros de diagramas y documentos JSON de intercambio.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Un diagrama del catálogo: metadatos de presentación y ubicación de su SVG.
/// Inmutable una vez construido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// URL desde la que se sirven los bytes del SVG (ej: `/diagrams/api-gateway.svg`).
    pub path: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
}

/// Respuesta de `GET /api/diagrams`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub diagrams: Vec<DiagramRecord>,
    pub total: usize,
    pub last_updated: DateTime<Utc>,
}

/// Documento de manifiesto estático: `{ "diagrams": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub diagrams: Vec<ManifestEntry>,
}

/// Entrada de manifiesto. Salvo `filename`, todos los campos son opcionales;
/// los ausentes se normalizan a cadena o lista vacía, nunca a `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
}

impl From<&DiagramRecord> for ManifestEntry {
    fn from(record: &DiagramRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            title: Some(record.title.clone()),
            description: record.description.clone(),
            category: record.category.clone(),
            tags: record.tags.clone(),
            filename: record.filename.clone(),
            created_at: record.created_at,
            size: record.size,
            author: record.author.clone(),
        }
    }
}
