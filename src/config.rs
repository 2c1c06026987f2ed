//! Carga y gestión de configuración de la aplicación (catálogo, servidor y visor).

use std::{env, path::PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use url::Url;

/// Origen del catálogo. El escaneo de directorio es el sistema de referencia;
/// el manifiesto queda como vía de importación heredada.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogMode {
    Scan,
    Manifest,
}

impl CatalogMode {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "scan" | "directory" => Ok(Self::Scan),
            "manifest" | "json" => Ok(Self::Manifest),
            other => Err(anyhow!("Modo de catálogo no soportado: {other}")),
        }
    }
}

/// Límites de escala del visor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self { min: 0.1, max: 5.0 }
    }
}

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    pub catalog_mode: CatalogMode,
    pub diagrams_dir: PathBuf,
    pub manifest_path: PathBuf,
    /// Prefijo URL bajo el que se publican los SVG (ej: `/diagrams`).
    pub diagrams_base_url: String,
    /// Origen usado para construir enlaces compartibles.
    pub public_base_url: Url,
    pub frontend_dir: PathBuf,
    pub open_browser: bool,
    pub zoom: ZoomBounds,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env`, pero leyendo de una función arbitraria.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let server_addr = var("SERVER_ADDR", "127.0.0.1:3000");
        let catalog_mode = CatalogMode::from_str(&var("CATALOG_MODE", "scan"))?;
        let diagrams_dir = PathBuf::from(var("DIAGRAMS_DIR", "public/diagrams"));
        let manifest_path = PathBuf::from(var("MANIFEST_PATH", "public/diagrams.json"));
        let diagrams_base_url = normalize_base_path(&var("DIAGRAMS_BASE_URL", "/diagrams"));
        if diagrams_base_url == "/" || diagrams_base_url.starts_with("/api") {
            bail!("DIAGRAMS_BASE_URL no puede ser la raíz ni colgar de /api: {diagrams_base_url}");
        }

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{server_addr}"));
        let public_base_url = Url::parse(&public_base_url)
            .with_context(|| format!("PUBLIC_BASE_URL no es una URL válida: {public_base_url}"))?;

        let frontend_dir = PathBuf::from(var("FRONTEND_DIR", "frontend"));
        let open_browser = parse_bool(&var("OPEN_BROWSER", "true"))
            .ok_or_else(|| anyhow!("OPEN_BROWSER debe ser true o false"))?;

        let defaults = ZoomBounds::default();
        let zoom = ZoomBounds {
            min: parse_f64(lookup("ZOOM_MIN"), "ZOOM_MIN", defaults.min)?,
            max: parse_f64(lookup("ZOOM_MAX"), "ZOOM_MAX", defaults.max)?,
        };
        if !(zoom.min > 0.0 && zoom.min < zoom.max) {
            bail!(
                "Límites de zoom inválidos: ZOOM_MIN={} ZOOM_MAX={}",
                zoom.min,
                zoom.max
            );
        }

        Ok(Self {
            server_addr,
            catalog_mode,
            diagrams_dir,
            manifest_path,
            diagrams_base_url,
            public_base_url,
            frontend_dir,
            open_browser,
            zoom,
        })
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "si" | "sí" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_f64(raw: Option<String>, key: &str, default: f64) -> Result<f64> {
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{key} debe ser numérico, recibido: {v}")),
        None => Ok(default),
    }
}
