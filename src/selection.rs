//! Controlador de selección y navegación.
//!
//! Mantiene el diagrama seleccionado sincronizado con el parámetro de
//! navegación (`?diagram=<id>`). Al cargar el catálogo se respeta el parámetro
//! si es válido; si falta o no existe se elige el primer diagrama y se corrige
//! el parámetro con `replace`. Las selecciones del usuario hacen `push`, de modo
//! que "atrás" vuelve a la selección previa.

use std::sync::Arc;

use tracing::debug;

use crate::{catalog::Catalog, error::ViewerError, models::DiagramRecord, search};

/// Clave del parámetro de navegación en la URL.
pub const NAV_PARAM: &str = "diagram";

/// Historial de navegación (la barra de direcciones en un navegador).
pub trait Navigator {
    /// Valor actual del parámetro de navegación.
    fn current(&self) -> Option<String>;
    /// Sustituye la entrada actual sin crear una nueva.
    fn replace(&mut self, id: &str);
    /// Añade una entrada nueva al historial.
    fn push(&mut self, id: &str);
}

/// Historial en memoria con cursor, con la semántica de `history.pushState`.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<Option<String>>,
    cursor: usize,
}

impl MemoryHistory {
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            entries: vec![initial.map(str::to_string)],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retrocede una entrada y devuelve el parámetro resultante.
    pub fn back(&mut self) -> Option<String> {
        self.cursor = self.cursor.saturating_sub(1);
        self.current()
    }

    pub fn forward(&mut self) -> Option<String> {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
        self.current()
    }
}

impl Navigator for MemoryHistory {
    fn current(&self) -> Option<String> {
        self.entries.get(self.cursor).cloned().flatten()
    }

    fn replace(&mut self, id: &str) {
        self.entries[self.cursor] = Some(id.to_string());
    }

    fn push(&mut self, id: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(Some(id.to_string()));
        self.cursor = self.entries.len() - 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    Uninitialized,
    Selected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Unchanged,
    Changed,
}

/// Resultado de resolver un parámetro de navegación contra un catálogo.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub selected: Option<&'a DiagramRecord>,
    /// El parámetro debe reescribirse con el id de `selected`.
    pub corrected: bool,
}

/// Forma pura de la selección inicial: el id del parámetro si existe en el
/// catálogo, si no el primer diagrama.
pub fn resolve<'a>(catalog: &'a Catalog, param: Option<&str>) -> Resolution<'a> {
    if let Some(found) = param.and_then(|id| catalog.get(id)) {
        return Resolution {
            selected: Some(found),
            corrected: false,
        };
    }
    if let Some(id) = param {
        debug!("{}", ViewerError::DiagramNotFound(id.to_string()));
    }
    let first = catalog.first();
    Resolution {
        selected: first,
        corrected: first.is_some(),
    }
}

/// Estado de la sesión de interfaz: catálogo, término de búsqueda y selección.
#[derive(Debug, Clone)]
pub struct SelectionController {
    catalog: Option<Arc<Catalog>>,
    query: String,
    state: SelectionState,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            catalog: None,
            query: String::new(),
            state: SelectionState::Uninitialized,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_deref()
    }

    pub fn selected(&self) -> Option<&DiagramRecord> {
        match &self.state {
            SelectionState::Selected(id) => self.catalog.as_ref()?.get(id),
            SelectionState::Uninitialized => None,
        }
    }

    /// Instala un catálogo recién cargado y fija la selección inicial.
    pub fn load_catalog(&mut self, catalog: Arc<Catalog>, nav: &mut impl Navigator) {
        let param = nav.current();
        let resolution = resolve(&catalog, param.as_deref());
        self.state = match resolution.selected {
            Some(record) => {
                if resolution.corrected {
                    nav.replace(&record.id);
                }
                SelectionState::Selected(record.id.clone())
            }
            None => SelectionState::Uninitialized,
        };
        self.catalog = Some(catalog);
    }

    /// Selección iniciada por el usuario.
    pub fn select(
        &mut self,
        id: &str,
        nav: &mut impl Navigator,
    ) -> Result<SelectOutcome, ViewerError> {
        if matches!(&self.state, SelectionState::Selected(current) if current == id) {
            return Ok(SelectOutcome::Unchanged);
        }
        if self.catalog.as_ref().and_then(|c| c.get(id)).is_none() {
            return Err(ViewerError::DiagramNotFound(id.to_string()));
        }
        self.state = SelectionState::Selected(id.to_string());
        nav.push(id);
        Ok(SelectOutcome::Changed)
    }

    /// Sigue un cambio externo del parámetro (atrás/adelante) sin escribir historial.
    pub fn follow_navigation(&mut self, param: Option<&str>) -> SelectOutcome {
        let Some(id) = param else {
            return SelectOutcome::Unchanged;
        };
        if matches!(&self.state, SelectionState::Selected(current) if current == id) {
            return SelectOutcome::Unchanged;
        }
        match self.catalog.as_ref().and_then(|c| c.get(id)) {
            Some(record) => {
                self.state = SelectionState::Selected(record.id.clone());
                SelectOutcome::Changed
            }
            None => SelectOutcome::Unchanged,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Diagramas visibles con el término de búsqueda actual.
    pub fn visible(&self) -> Vec<&DiagramRecord> {
        match &self.catalog {
            Some(catalog) => search::filter(&catalog.diagrams, &self.query),
            None => Vec::new(),
        }
    }
}
