//! Visor de un diagrama: carga asíncrona del SVG, vista con zoom/desplazamiento,
//! descarga y enlace para compartir. La API construye un `Viewer` por petición
//! y sirve desde él el contenido, el ajuste inicial y la descarga.
//!
//! Cada carga recibe un `FetchTicket` con un número de generación creciente.
//! Solo el ticket de la última generación puede publicar su resultado; las
//! respuestas tardías de selecciones ya sustituidas se descartan.

use std::{future::Future, path::PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::{
    catalog::is_plain_filename, config::ZoomBounds, error::ViewerError, models::DiagramRecord,
    selection::NAV_PARAM, svg,
};

/// Factor multiplicativo de cada paso de zoom.
pub const ZOOM_STEP: f64 = 1.5;

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Sin diagrama seleccionado (catálogo vacío).
    Empty,
    Loading { id: String },
    Ready { id: String, svg: String },
    Failed { id: String, error: ViewerError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    id: String,
}

impl FetchTicket {
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied,
    Discarded,
}

/// Origen de los bytes SVG de un diagrama.
pub trait ContentSource {
    fn fetch(
        &self,
        record: &DiagramRecord,
    ) -> impl Future<Output = Result<String, ViewerError>> + Send;
}

/// Lee los SVG del directorio de diagramas a partir de `filename`.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for FsContentSource {
    async fn fetch(&self, record: &DiagramRecord) -> Result<String, ViewerError> {
        if !is_plain_filename(&record.filename) {
            return Err(ViewerError::content(&record.id, "nombre de fichero inválido"));
        }
        tokio::fs::read_to_string(self.root.join(&record.filename))
            .await
            .map_err(|e| ViewerError::content(&record.id, e))
    }
}

/// Escala y desplazamiento de la superficie de zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    scale: f64,
    offset: (f64, f64),
    bounds: ZoomBounds,
}

impl ZoomState {
    pub fn new(bounds: ZoomBounds) -> Self {
        Self {
            scale: 1.0_f64.clamp(bounds.min, bounds.max),
            offset: (0.0, 0.0),
            bounds,
        }
    }

    /// Estado enviado por el cliente; la escala se acota y un valor no finito
    /// vuelve a la escala inicial.
    pub fn at(bounds: ZoomBounds, scale: f64, offset: (f64, f64)) -> Self {
        let mut zoom = Self::new(bounds);
        if scale.is_finite() {
            zoom.set_scale(scale);
        }
        if offset.0.is_finite() && offset.1.is_finite() {
            zoom.offset = offset;
        }
        zoom
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale / ZOOM_STEP);
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(self.bounds.min, self.bounds.max);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset = (self.offset.0 + dx, self.offset.1 + dy);
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.bounds);
    }

    /// Centra el contenido en la ventana conservando la escala.
    pub fn center(&mut self, content: (f64, f64), viewport: (f64, f64)) {
        self.offset = (
            (viewport.0 - content.0 * self.scale) / 2.0,
            (viewport.1 - content.1 * self.scale) / 2.0,
        );
    }

    /// Escala para que el contenido quepa entero y lo centra.
    pub fn fit(&mut self, content: (f64, f64), viewport: (f64, f64)) {
        if content.0 <= 0.0 || content.1 <= 0.0 {
            return;
        }
        self.set_scale((viewport.0 / content.0).min(viewport.1 / content.1));
        self.center(content, viewport);
    }
}

/// Fichero de descarga: SVG tal cual se recibió.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

impl Download {
    pub fn of(record: &DiagramRecord, svg: String) -> Self {
        Self {
            filename: download_name(&record.title),
            content_type: SVG_CONTENT_TYPE,
            body: svg,
        }
    }
}

/// `<titulo-en-minusculas-con-guiones>.svg`.
pub fn download_name(title: &str) -> String {
    let slug = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    if slug.is_empty() {
        "diagrama.svg".to_string()
    } else {
        format!("{slug}.svg")
    }
}

#[derive(Debug)]
pub struct Viewer {
    state: ViewState,
    generation: u64,
    zoom: ZoomState,
}

impl Viewer {
    pub fn new(bounds: ZoomBounds) -> Self {
        Self {
            state: ViewState::Empty,
            generation: 0,
            zoom: ZoomState::new(bounds),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomState {
        &mut self.zoom
    }

    pub fn svg(&self) -> Option<&str> {
        match &self.state {
            ViewState::Ready { svg, .. } => Some(svg),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ViewerError> {
        match &self.state {
            ViewState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Empieza a mostrar `record`; cualquier carga anterior queda obsoleta.
    pub fn begin(&mut self, record: &DiagramRecord) -> FetchTicket {
        self.generation += 1;
        self.state = ViewState::Loading {
            id: record.id.clone(),
        };
        self.zoom.reset();
        FetchTicket {
            generation: self.generation,
            id: record.id.clone(),
        }
    }

    /// Vuelve al estado vacío e invalida las cargas en curso.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = ViewState::Empty;
        self.zoom.reset();
    }

    pub fn complete(&mut self, ticket: FetchTicket, result: Result<String, ViewerError>) -> Commit {
        if ticket.generation != self.generation {
            debug!("Descartada respuesta obsoleta del diagrama {}", ticket.id);
            return Commit::Discarded;
        }
        self.state = match result {
            Ok(svg) => ViewState::Ready { id: ticket.id, svg },
            Err(error) => {
                warn!("{error}");
                ViewState::Failed {
                    id: ticket.id,
                    error,
                }
            }
        };
        Commit::Applied
    }

    /// Ajusta la vista al tamaño intrínseco del SVG cargado.
    pub fn fit_to(&mut self, viewport: (f64, f64)) -> bool {
        match self.svg().and_then(svg::dimensions) {
            Some(content) => {
                self.zoom.fit(content, viewport);
                true
            }
            None => false,
        }
    }

    /// Descarga del SVG mostrado, si corresponde a `record`.
    pub fn download(&self, record: &DiagramRecord) -> Option<Download> {
        match &self.state {
            ViewState::Ready { id, svg } if *id == record.id => {
                Some(Download::of(record, svg.clone()))
            }
            _ => None,
        }
    }
}

/// Carga `record` en el visor: `begin`, lectura sin mantener el cerrojo y
/// `complete`. Si entretanto se seleccionó otro diagrama, el resultado se descarta.
pub async fn load<S: ContentSource>(
    viewer: &Mutex<Viewer>,
    source: &S,
    record: &DiagramRecord,
) -> Commit {
    let ticket = viewer.lock().await.begin(record);
    let result = source.fetch(record).await;
    viewer.lock().await.complete(ticket, result)
}

/// Enlace directo: `<base>?diagram=<id>`.
pub fn share_link(base: &Url, id: &str) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair(NAV_PARAM, id);
    url
}
