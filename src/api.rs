use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::{
    app_state::{AppState, Status},
    config::CatalogMode,
    error::ViewerError,
    models::{CatalogResponse, DiagramRecord, Manifest},
    selection::{Navigator, SelectionController, NAV_PARAM},
    svg,
    viewer::{self, Commit, Viewer, ZoomState, SVG_CONTENT_TYPE},
};

/// `attr-char` de RFC 5987: todo lo demás se codifica con `%XX`.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

// --- Payloads y Respuestas de la API ---

#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    /// Valor actual de `?diagram=` en la barra de direcciones.
    diagram: Option<String>,
    q: Option<String>,
    /// Diagrama elegido por el usuario en la lista.
    select: Option<String>,
}

/// Escritura de historial que el cliente debe aplicar, en orden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "id", rename_all = "lowercase")]
pub enum HistoryOp {
    Replace(String),
    Push(String),
}

/// El historial del navegador visto desde el servidor: parte del parámetro que
/// envía el cliente y anota las escrituras en lugar de aplicarlas.
#[derive(Debug, Default)]
struct ClientHistory {
    current: Option<String>,
    ops: Vec<HistoryOp>,
}

impl ClientHistory {
    fn at(param: Option<String>) -> Self {
        Self {
            current: param.filter(|p| !p.is_empty()),
            ops: Vec::new(),
        }
    }
}

impl Navigator for ClientHistory {
    fn current(&self) -> Option<String> {
        self.current.clone()
    }

    fn replace(&mut self, id: &str) {
        self.current = Some(id.to_string());
        self.ops.push(HistoryOp::Replace(id.to_string()));
    }

    fn push(&mut self, id: &str) {
        self.current = Some(id.to_string());
        self.ops.push(HistoryOp::Push(id.to_string()));
    }
}

/// Estado de la vista para un parámetro de navegación y un término de búsqueda.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    selected: Option<DiagramRecord>,
    history: Vec<HistoryOp>,
    query: String,
    visible: Vec<DiagramRecord>,
    visible_count: usize,
    total: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewportParams {
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomView {
    scale: f64,
    x: f64,
    y: f64,
}

impl From<&ZoomState> for ZoomView {
    fn from(zoom: &ZoomState) -> Self {
        let (x, y) = zoom.offset();
        Self {
            scale: zoom.scale(),
            x,
            y,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    id: String,
    svg: String,
    /// Tamaño intrínseco del SVG, si declara `width`/`height` o `viewBox`.
    width: Option<f64>,
    height: Option<f64>,
    fitted: bool,
    zoom: ZoomView,
    download_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoomAction {
    In,
    Out,
    Reset,
    Fit,
    Center,
}

#[derive(Debug, Deserialize)]
pub struct ZoomParams {
    action: ZoomAction,
    #[serde(default = "unit_scale")]
    scale: f64,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    /// Tamaño del contenido.
    cw: Option<f64>,
    ch: Option<f64>,
    /// Tamaño de la ventana.
    vw: Option<f64>,
    vh: Option<f64>,
}

fn unit_scale() -> f64 {
    1.0
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    mode: CatalogMode,
    nav_param: &'static str,
    zoom_min: f64,
    zoom_max: f64,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/diagrams", get(list_diagrams_handler))
        .route("/api/diagrams/:id/content", get(content_handler))
        .route("/api/diagrams/:id/render", get(render_handler))
        .route("/api/diagrams/:id/download", get(download_handler))
        .route("/api/diagrams/:id/share", get(share_handler))
        .route("/api/view", get(view_handler))
        .route("/api/zoom", get(zoom_handler))
        .route("/api/manifest", get(manifest_handler))
        .route("/api/config", get(config_handler))
        .route("/api/status", get(status_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .with_state(app_state)
}

// --- Handlers ---

/// Cada petición reconstruye el catálogo completo, como una recarga de página.
#[axum::debug_handler]
async fn list_diagrams_handler(
    State(state): State<AppState>,
) -> Result<Json<CatalogResponse>, ViewerError> {
    match state.reload().await {
        Ok(catalog) => Ok(Json(catalog.to_response())),
        Err(err) => {
            error!("Error cargando diagramas: {}", err);
            Err(err)
        }
    }
}

/// Selección inicial (o tras atrás/adelante) y, con `select`, la elección del
/// usuario. La respuesta dice qué escrituras de historial debe hacer el cliente.
#[axum::debug_handler]
async fn view_handler(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> Result<Json<ViewResponse>, ViewerError> {
    let catalog = state.catalog();
    let total = catalog.len();
    let mut history = ClientHistory::at(params.diagram);

    let mut controller = SelectionController::new();
    controller.load_catalog(catalog, &mut history);
    if let Some(id) = params.select.as_deref() {
        controller.select(id, &mut history)?;
    }
    controller.set_query(params.q.unwrap_or_default());

    let visible: Vec<DiagramRecord> = controller.visible().into_iter().cloned().collect();
    Ok(Json(ViewResponse {
        selected: controller.selected().cloned(),
        history: history.ops,
        query: controller.query().to_string(),
        visible_count: visible.len(),
        visible,
        total,
    }))
}

#[axum::debug_handler]
async fn content_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ViewerError> {
    let record = find(&state, &id)?;
    let viewer = open_viewer(&state, &record).await?;
    let svg = viewer
        .svg()
        .map(str::to_string)
        .ok_or_else(|| ViewerError::content(&record.id, "sin contenido"))?;
    Ok(([(header::CONTENT_TYPE, SVG_CONTENT_TYPE)], svg).into_response())
}

/// SVG listo para mostrar, con la vista ya ajustada si se indica la ventana.
#[axum::debug_handler]
async fn render_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(viewport): Query<ViewportParams>,
) -> Result<Json<RenderResponse>, ViewerError> {
    let record = find(&state, &id)?;
    let mut viewer = open_viewer(&state, &record).await?;
    let fitted = match positive_pair(viewport.width, viewport.height) {
        Some(size) => viewer.fit_to(size),
        None => false,
    };
    let svg = viewer
        .svg()
        .map(str::to_string)
        .ok_or_else(|| ViewerError::content(&record.id, "sin contenido"))?;
    let size = svg::dimensions(&svg);

    Ok(Json(RenderResponse {
        id: record.id,
        width: size.map(|(w, _)| w),
        height: size.map(|(_, h)| h),
        fitted,
        zoom: ZoomView::from(viewer.zoom()),
        download_name: viewer::download_name(&record.title),
        svg,
    }))
}

#[axum::debug_handler]
async fn download_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ViewerError> {
    let record = find(&state, &id)?;
    let viewer = open_viewer(&state, &record).await?;
    let download = viewer
        .download(&record)
        .ok_or_else(|| ViewerError::content(&record.id, "sin contenido"))?;
    info!("Descarga de {} como {}", record.id, download.filename);

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(download.content_type)),
            (header::CONTENT_DISPOSITION, content_disposition(&download.filename)),
        ],
        download.body,
    )
        .into_response())
}

#[axum::debug_handler]
async fn share_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ViewerError> {
    let record = find(&state, &id)?;
    let url = viewer::share_link(&state.config.public_base_url, &record.id);
    Ok(Json(json!({ "url": url.as_str() })))
}

/// Un paso de zoom sobre el estado que envía el cliente.
#[axum::debug_handler]
async fn zoom_handler(
    State(state): State<AppState>,
    Query(params): Query<ZoomParams>,
) -> Json<ZoomView> {
    let mut zoom = ZoomState::at(state.config.zoom, params.scale, (params.x, params.y));
    let content = positive_pair(params.cw, params.ch);
    let viewport = positive_pair(params.vw, params.vh);

    match params.action {
        ZoomAction::In => zoom.zoom_in(),
        ZoomAction::Out => zoom.zoom_out(),
        ZoomAction::Reset => zoom.reset(),
        ZoomAction::Fit => {
            if let (Some(content), Some(viewport)) = (content, viewport) {
                zoom.fit(content, viewport);
            }
        }
        ZoomAction::Center => {
            if let (Some(content), Some(viewport)) = (content, viewport) {
                zoom.center(content, viewport);
            }
        }
    }
    Json(ZoomView::from(&zoom))
}

#[axum::debug_handler]
async fn manifest_handler(State(state): State<AppState>) -> Json<Manifest> {
    Json(state.catalog().to_manifest())
}

#[axum::debug_handler]
async fn config_handler(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(ClientConfig {
        mode: state.config.catalog_mode,
        nav_param: NAV_PARAM,
        zoom_min: state.config.zoom.min,
        zoom_max: state.config.zoom.max,
    })
}

#[axum::debug_handler]
async fn status_handler(State(state): State<AppState>) -> Json<Status> {
    Json(state.status.lock().unwrap_or_else(|p| p.into_inner()).clone())
}

// --- Handler de Apagado y Utilidades ---

#[axum::debug_handler]
async fn shutdown_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!("Petición de apagado recibida.");
    if let Some(sender) = state
        .shutdown_sender
        .lock()
        .unwrap_or_else(|p| p.into_inner())
        .take()
    {
        let _ = sender.send(());
    }
    StatusCode::OK
}

fn find(state: &AppState, id: &str) -> Result<DiagramRecord, ViewerError> {
    state
        .catalog()
        .get(id)
        .cloned()
        .ok_or_else(|| ViewerError::DiagramNotFound(id.to_string()))
}

/// Carga `record` en un visor nuevo; si la lectura falla se devuelve su error.
async fn open_viewer(state: &AppState, record: &DiagramRecord) -> Result<Viewer, ViewerError> {
    let viewer = Mutex::new(Viewer::new(state.config.zoom));
    if viewer::load(&viewer, &state.content, record).await == Commit::Discarded {
        debug!("Carga de {} sustituida", record.id);
    }
    let viewer = viewer.into_inner();
    match viewer.failure() {
        Some(err) => Err(err.clone()),
        None => Ok(viewer),
    }
}

fn positive_pair(a: Option<f64>, b: Option<f64>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some(a), Some(b)) if a.is_finite() && b.is_finite() && a > 0.0 && b > 0.0 => Some((a, b)),
        _ => None,
    }
}

fn content_disposition(filename: &str) -> HeaderValue {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    let encoded = utf8_percent_encode(filename, ATTR_CHAR);
    HeaderValue::from_str(&format!(
        "attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::to_bytes;
    use std::{collections::HashMap, fs};
    use tokio::sync::oneshot;

    fn state_for(dir: &std::path::Path) -> AppState {
        let vars: HashMap<&str, String> = HashMap::from([
            ("DIAGRAMS_DIR", dir.display().to_string()),
            ("PUBLIC_BASE_URL", "http://visor.local".to_string()),
        ]);
        let cfg = AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        let (tx, _rx) = oneshot::channel();
        AppState::new(cfg, tx)
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn listing_rebuilds_catalog_each_time() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_for(tmp.path());

        let Json(first) = list_diagrams_handler(State(state.clone())).await.unwrap();
        assert_eq!(first.total, 0);

        fs::write(tmp.path().join("user-auth-flow.svg"), "<svg/>").unwrap();
        let Json(second) = list_diagrams_handler(State(state.clone())).await.unwrap();
        assert_eq!(second.total, 1);
        assert_eq!(second.diagrams[0].category, "Autenticación");
        assert_eq!(state.catalog().len(), 1);
        assert_eq!(state.status.lock().unwrap().diagrams, 1);
    }

    #[tokio::test]
    async fn listing_failure_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("no-es-directorio");
        fs::write(&file, "x").unwrap();
        let state = state_for(&file);

        let err = list_diagrams_handler(State(state.clone())).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.status.lock().unwrap().last_error.is_some());
    }

    async fn scanned_state() -> (tempfile::TempDir, AppState) {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("api-gateway.svg"), "<svg/>").unwrap();
        fs::write(tmp.path().join("orders-db.svg"), "<svg/>").unwrap();
        let state = state_for(tmp.path());
        state.reload().await.unwrap();
        (tmp, state)
    }

    fn view(diagram: Option<&str>, q: Option<&str>, select: Option<&str>) -> Query<ViewParams> {
        Query(ViewParams {
            diagram: diagram.map(str::to_string),
            q: q.map(str::to_string),
            select: select.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn view_corrects_unknown_param_and_filters() {
        let (_tmp, state) = scanned_state().await;
        let first_id = state.catalog().first().unwrap().id.clone();

        let Json(view) = view_handler(State(state.clone()), view(Some("diagram-99"), Some("sql"), None))
            .await
            .unwrap();
        assert_eq!(view.history, vec![HistoryOp::Replace(first_id.clone())]);
        assert_eq!(view.selected.unwrap().id, first_id);
        assert_eq!(view.visible_count, 1);
        assert_eq!(view.visible[0].filename, "orders-db.svg");
        assert_eq!(view.total, 2);
    }

    #[tokio::test]
    async fn view_keeps_valid_param_without_history_writes() {
        let (_tmp, state) = scanned_state().await;
        let last_id = state.catalog().diagrams[1].id.clone();

        let Json(view) = view_handler(State(state), view(Some(last_id.as_str()), None, None))
            .await
            .unwrap();
        assert!(view.history.is_empty());
        assert_eq!(view.selected.unwrap().id, last_id);
        assert_eq!(view.visible_count, 2);
    }

    #[tokio::test]
    async fn user_selection_pushes_once() {
        let (_tmp, state) = scanned_state().await;
        let ids: Vec<String> = state.catalog().diagrams.iter().map(|d| d.id.clone()).collect();

        let Json(same) = view_handler(State(state.clone()), view(Some(ids[0].as_str()), None, Some(ids[0].as_str())))
            .await
            .unwrap();
        assert!(same.history.is_empty());

        let Json(other) = view_handler(State(state.clone()), view(Some(ids[0].as_str()), None, Some(ids[1].as_str())))
            .await
            .unwrap();
        assert_eq!(other.history, vec![HistoryOp::Push(ids[1].clone())]);
        assert_eq!(other.selected.unwrap().id, ids[1]);

        // Parámetro inválido en la barra y clic: primero se corrige, luego se apila.
        let Json(both) = view_handler(State(state.clone()), view(Some("x"), None, Some(ids[1].as_str())))
            .await
            .unwrap();
        assert_eq!(
            both.history,
            vec![HistoryOp::Replace(ids[0].clone()), HistoryOp::Push(ids[1].clone())]
        );

        let err = view_handler(State(state), view(Some(ids[0].as_str()), None, Some("nope")))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn history_ops_are_tagged_for_the_client() {
        let value = serde_json::to_value(HistoryOp::Push("diagram-2".into())).unwrap();
        assert_eq!(value, json!({ "op": "push", "id": "diagram-2" }));
    }

    #[tokio::test]
    async fn view_of_empty_catalog_has_no_selection() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_for(tmp.path());
        let Json(view) = view_handler(State(state), view(Some(""), None, None)).await.unwrap();
        assert!(view.selected.is_none());
        assert!(view.history.is_empty());
        assert_eq!(view.total, 0);
    }

    #[tokio::test]
    async fn render_fits_to_the_viewport() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("system-architecture.svg"),
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="200"/>"#,
        )
        .unwrap();
        let state = state_for(tmp.path());
        state.reload().await.unwrap();

        let viewport = ViewportParams {
            width: Some(800.0),
            height: Some(800.0),
        };
        let Json(render) = render_handler(State(state.clone()), Path("diagram-1".into()), Query(viewport))
            .await
            .unwrap();
        assert!(render.fitted);
        assert_eq!(render.width, Some(400.0));
        assert_eq!(render.zoom, ZoomView { scale: 2.0, x: 0.0, y: 200.0 });
        assert_eq!(render.download_name, "system-architecture.svg");

        let Json(plain) = render_handler(State(state), Path("diagram-1".into()), Query(ViewportParams::default()))
            .await
            .unwrap();
        assert!(!plain.fitted);
        assert_eq!(plain.zoom.scale, 1.0);
    }

    #[tokio::test]
    async fn zoom_steps_stay_within_bounds() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_for(tmp.path());
        let params = |action, scale| ZoomParams {
            action,
            scale,
            x: 5.0,
            y: 5.0,
            cw: Some(100.0),
            ch: Some(50.0),
            vw: Some(200.0),
            vh: Some(200.0),
        };

        let Json(z) = zoom_handler(State(state.clone()), Query(params(ZoomAction::In, 4.0))).await;
        assert_eq!(z.scale, 5.0);
        let Json(z) = zoom_handler(State(state.clone()), Query(params(ZoomAction::Out, 0.12))).await;
        assert_eq!(z.scale, 0.1);
        let Json(z) = zoom_handler(State(state.clone()), Query(params(ZoomAction::Reset, 3.0))).await;
        assert_eq!(z, ZoomView { scale: 1.0, x: 0.0, y: 0.0 });
        let Json(z) = zoom_handler(State(state.clone()), Query(params(ZoomAction::Fit, 1.0))).await;
        assert_eq!(z, ZoomView { scale: 2.0, x: 0.0, y: 50.0 });
        let Json(z) = zoom_handler(State(state), Query(params(ZoomAction::Center, 1.0))).await;
        assert_eq!(z, ZoomView { scale: 1.0, x: 50.0, y: 75.0 });
    }

    #[test]
    fn zoom_query_parses_actions() {
        let uri: axum::http::Uri = "/api/zoom?action=zoom-in".parse().unwrap();
        assert!(Query::<ZoomParams>::try_from_uri(&uri).is_err());

        let uri: axum::http::Uri = "/api/zoom?action=fit&scale=1.5&vw=10&vh=10".parse().unwrap();
        let Query(params) = Query::<ZoomParams>::try_from_uri(&uri).unwrap();
        assert_eq!(params.action, ZoomAction::Fit);
        assert_eq!(params.scale, 1.5);
        assert_eq!(params.x, 0.0);
        assert!(params.cw.is_none());
    }

    #[tokio::test]
    async fn content_download_and_share() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("user-auth-flow.svg"), "<svg>hola</svg>").unwrap();
        let state = state_for(tmp.path());
        state.reload().await.unwrap();

        let content = content_handler(State(state.clone()), Path("diagram-1".into()))
            .await
            .unwrap();
        assert_eq!(content.headers()[header::CONTENT_TYPE], SVG_CONTENT_TYPE);
        assert_eq!(body_text(content).await, "<svg>hola</svg>");

        let download = download_handler(State(state.clone()), Path("diagram-1".into()))
            .await
            .unwrap();
        let disposition = download.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.contains("filename=\"user-auth-flow.svg\""));
        assert_eq!(body_text(download).await, "<svg>hola</svg>");

        let Json(share) = share_handler(State(state.clone()), Path("diagram-1".into()))
            .await
            .unwrap();
        assert_eq!(share["url"], "http://visor.local/?diagram=diagram-1");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_for(tmp.path());
        let err = content_handler(State(state), Path("diagram-7".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ViewerError::DiagramNotFound(_)));
    }

    #[tokio::test]
    async fn deleted_file_is_a_content_failure() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.svg"), "<svg/>").unwrap();
        let state = state_for(tmp.path());
        state.reload().await.unwrap();
        fs::remove_file(tmp.path().join("a.svg")).unwrap();

        let err = content_handler(State(state), Path("diagram-1".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ViewerError::ContentFetchFailed { .. }));
    }

    #[test]
    fn disposition_escapes_non_ascii() {
        let value = content_disposition("autenticación.svg");
        let text = value.to_str().unwrap();
        assert!(text.starts_with("attachment; filename=\"autenticaci_n.svg\""));
        assert!(text.contains("filename*=UTF-8''autenticaci%C3%B3n.svg"));
    }

    #[test]
    fn disposition_percent_encodes_outside_attr_char() {
        let value = content_disposition("mapa de red*v1~final.svg");
        let text = value.to_str().unwrap();
        assert!(text.contains("filename=\"mapa_de_red*v1~final.svg\""));
        assert!(text.ends_with("filename*=UTF-8''mapa%20de%20red%2Av1~final.svg"));
    }

    const CLIENT: &str = include_str!("../frontend/app.js");

    #[test]
    fn client_inserts_server_text_as_text() {
        let markup: Vec<&str> = CLIENT
            .lines()
            .map(str::trim)
            .filter(|line| line.contains("innerHTML"))
            .collect();
        // Solo el SVG del diagrama se inserta como marcado.
        assert_eq!(markup, ["$('surface').innerHTML = render.svg;"]);
        assert!(!CLIENT.contains("onclick="));
    }

    #[test]
    fn client_uses_view_fields_and_shows_metadata() {
        for field in ["view.visible", "view.visibleCount", "view.history", "d.author", "d.createdAt", "d.category"] {
            assert!(CLIENT.contains(field), "falta {field}");
        }
        assert!(!CLIENT.contains("function visible("));
    }
}
