use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::oneshot;

use crate::{
    catalog::{Catalog, CatalogLoader},
    config::AppConfig,
    error::ViewerError,
    viewer::FsContentSource,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub loader: CatalogLoader,
    pub content: FsContentSource,
    /// Última instantánea del catálogo; se sustituye entera en cada recarga.
    pub catalog: Arc<RwLock<Arc<Catalog>>>,
    pub status: Arc<Mutex<Status>>,
    pub shutdown_sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    /// Una sola recarga a la vez: carga y publicación no se intercalan.
    pub reload_lock: Arc<tokio::sync::Mutex<()>>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub message: String,
    pub diagrams: usize,
    pub last_error: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig, shutdown_tx: oneshot::Sender<()>) -> Self {
        let loader = CatalogLoader::from_config(&config);
        Self {
            content: FsContentSource::new(config.diagrams_dir.clone()),
            catalog: Arc::new(RwLock::new(Arc::new(Catalog::empty(loader.mode())))),
            status: Arc::new(Mutex::new(Status {
                message: "Servidor listo.".to_string(),
                ..Status::default()
            })),
            shutdown_sender: Arc::new(Mutex::new(Some(shutdown_tx))),
            reload_lock: Arc::new(tokio::sync::Mutex::new(())),
            loader,
            config,
        }
    }

    /// Instantánea actual, sin recargar.
    pub fn catalog(&self) -> Arc<Catalog> {
        match self.catalog.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Reconstruye el catálogo completo y lo publica.
    pub async fn reload(&self) -> Result<Arc<Catalog>, ViewerError> {
        let _serialized = self.reload_lock.lock().await;
        let result = self.loader.load().await.map(Arc::new);

        let mut status = self.status.lock().unwrap_or_else(|p| p.into_inner());
        match &result {
            Ok(catalog) => {
                match self.catalog.write() {
                    Ok(mut guard) => *guard = catalog.clone(),
                    Err(poisoned) => *poisoned.into_inner() = catalog.clone(),
                }
                status.message = format!("Catálogo actualizado: {} diagramas.", catalog.len());
                status.diagrams = catalog.len();
                status.last_error = None;
            }
            Err(err) => {
                status.message = "Error al cargar los diagramas.".to_string();
                status.last_error = Some(err.to_string());
            }
        }
        result
    }
}
