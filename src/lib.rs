//! Visor de diagramas SVG: catálogo (escaneo de directorio o manifiesto),
//! búsqueda, selección enlazable por URL y visor con zoom.

pub mod api;
pub mod app_state;
pub mod catalog;
pub mod config;
pub mod error;
pub mod metadata;
pub mod models;
pub mod search;
pub mod selection;
pub mod svg;
pub mod viewer;
