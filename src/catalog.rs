//! Carga del catálogo de diagramas, ya sea escaneando un directorio de SVG o
//! leyendo un manifiesto JSON pre-construido.
//!
//! El catálogo se construye entero en cada carga y a partir de ahí es de solo
//! lectura: una recarga produce un `Catalog` nuevo, nunca parchea el anterior.

use std::{
    collections::HashSet,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{
    config::{AppConfig, CatalogMode},
    error::ViewerError,
    metadata,
    models::{CatalogResponse, DiagramRecord, Manifest, ManifestEntry},
};

/// Colección ordenada de diagramas de una sesión.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub diagrams: Vec<DiagramRecord>,
    pub last_updated: DateTime<Utc>,
    pub mode: CatalogMode,
}

impl Catalog {
    pub fn new(mode: CatalogMode, diagrams: Vec<DiagramRecord>) -> Self {
        Self {
            diagrams,
            last_updated: Utc::now(),
            mode,
        }
    }

    pub fn empty(mode: CatalogMode) -> Self {
        Self::new(mode, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.diagrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagrams.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DiagramRecord> {
        self.diagrams.iter().find(|d| d.id == id)
    }

    pub fn first(&self) -> Option<&DiagramRecord> {
        self.diagrams.first()
    }

    pub fn to_response(&self) -> CatalogResponse {
        CatalogResponse {
            diagrams: self.diagrams.clone(),
            total: self.diagrams.len(),
            last_updated: self.last_updated,
        }
    }

    /// Congela el catálogo actual como documento de manifiesto.
    pub fn to_manifest(&self) -> Manifest {
        Manifest {
            diagrams: self.diagrams.iter().map(ManifestEntry::from).collect(),
        }
    }
}

/// Estrategia de carga, elegida según el modo de despliegue.
#[derive(Debug, Clone)]
pub enum CatalogLoader {
    Scan { dir: PathBuf, base_url: String },
    Manifest { path: PathBuf, base_url: String },
}

impl CatalogLoader {
    pub fn from_config(cfg: &AppConfig) -> Self {
        match cfg.catalog_mode {
            CatalogMode::Scan => Self::Scan {
                dir: cfg.diagrams_dir.clone(),
                base_url: cfg.diagrams_base_url.clone(),
            },
            CatalogMode::Manifest => Self::Manifest {
                path: cfg.manifest_path.clone(),
                base_url: cfg.diagrams_base_url.clone(),
            },
        }
    }

    pub fn mode(&self) -> CatalogMode {
        match self {
            Self::Scan { .. } => CatalogMode::Scan,
            Self::Manifest { .. } => CatalogMode::Manifest,
        }
    }

    pub async fn load(&self) -> Result<Catalog, ViewerError> {
        let diagrams = match self {
            Self::Scan { dir, base_url } => {
                let (dir, base_url) = (dir.clone(), base_url.clone());
                tokio::task::spawn_blocking(move || scan_directory(&dir, &base_url))
                    .await
                    .map_err(|e| ViewerError::catalog("escaneo", e))??
            }
            Self::Manifest { path, base_url } => read_manifest(path, base_url).await?,
        };
        info!(
            "Catálogo cargado ({:?}): {} diagramas.",
            self.mode(),
            diagrams.len()
        );
        Ok(Catalog::new(self.mode(), diagrams))
    }
}

/// Escanea `dir` (sin recursión) y genera un registro por cada fichero SVG,
/// ordenados del más reciente al más antiguo. Un directorio inexistente
/// produce un catálogo vacío.
pub fn scan_directory(dir: &Path, base_url: &str) -> Result<Vec<DiagramRecord>, ViewerError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(ViewerError::catalog(
                dir.display().to_string(),
                "la ruta no es un directorio",
            ));
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(
                "El directorio de diagramas {} no existe; catálogo vacío.",
                dir.display()
            );
            return Ok(Vec::new());
        }
        // Permisos, un padre que no es directorio, etc.: no es un catálogo vacío.
        Err(err) => return Err(ViewerError::catalog(dir.display().to_string(), err)),
    }

    let mut records = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(ViewerError::catalog(dir.display().to_string(), err));
            }
            Err(err) => {
                warn!("Saltando entrada ilegible en {}: {}", dir.display(), err);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_svg(entry.path()) {
            continue;
        }
        let file_meta = match entry.metadata() {
            Ok(m) => m,
            Err(err) => {
                warn!("No se pudo leer {}: {}", entry.path().display(), err);
                continue;
            }
        };

        let filename = entry.file_name().to_string_lossy().to_string();
        let derived = metadata::derive(&filename);
        records.push(DiagramRecord {
            id: format!("diagram-{}", records.len() + 1),
            title: derived.title,
            description: derived.description,
            category: derived.category,
            tags: derived.tags,
            path: join_url(base_url, &filename),
            filename,
            created_at: file_meta.modified().ok().map(DateTime::<Utc>::from),
            size: Some(file_meta.len()),
            author: String::new(),
        });
    }

    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(records)
}

/// Lee un manifiesto `{ "diagrams": [...] }` respetando su orden.
pub async fn read_manifest(path: &Path, base_url: &str) -> Result<Vec<DiagramRecord>, ViewerError> {
    let location = path.display().to_string();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ViewerError::catalog(location.clone(), e))?;
    let manifest: Manifest =
        serde_json::from_str(&raw).map_err(|e| ViewerError::catalog(location.clone(), e))?;
    records_from_manifest(manifest, base_url).map_err(|reason| ViewerError::catalog(location, reason))
}

fn records_from_manifest(manifest: Manifest, base_url: &str) -> Result<Vec<DiagramRecord>, String> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(manifest.diagrams.len());

    for (index, entry) in manifest.diagrams.into_iter().enumerate() {
        if !is_plain_filename(&entry.filename) {
            return Err(format!("nombre de fichero inválido: {:?}", entry.filename));
        }
        let id = entry
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("diagram-{}", index + 1));
        if !seen.insert(id.clone()) {
            return Err(format!("identificador duplicado: {id}"));
        }
        let title = entry
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| metadata::derive(&entry.filename).title);

        records.push(DiagramRecord {
            id,
            title,
            description: entry.description,
            category: entry.category,
            tags: entry.tags,
            path: join_url(base_url, &entry.filename),
            filename: entry.filename,
            created_at: entry.created_at,
            size: entry.size,
            author: entry.author,
        });
    }
    Ok(records)
}

/// Solo `.svg` en claro; `.svgz` (comprimido) no se puede servir como texto.
fn is_svg(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Un nombre de fichero sin componentes de ruta (`a.svg`, no `../a.svg`).
pub fn is_plain_filename(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn join_url(base: &str, filename: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), filename)
}
