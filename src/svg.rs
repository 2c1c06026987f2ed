//! Inspección mínima de documentos SVG: tamaño intrínseco para ajustar la vista.

use roxmltree::{Document, ParsingOptions};

/// Ancho y alto intrínsecos del SVG, en unidades de usuario.
///
/// Usa `width`/`height` del elemento raíz cuando son absolutos y recurre al
/// `viewBox` en caso contrario. `None` si el texto no es un SVG o no declara
/// tamaño.
pub fn dimensions(text: &str) -> Option<(f64, f64)> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let doc = Document::parse_with_options(text, options).ok()?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return None;
    }

    let width = root.attribute("width").and_then(parse_length);
    let height = root.attribute("height").and_then(parse_length);
    if let (Some(w), Some(h)) = (width, height) {
        return Some((w, h));
    }

    let view_box = root.attribute("viewBox").and_then(parse_view_box)?;
    Some((width.unwrap_or(view_box.0), height.unwrap_or(view_box.1)))
}

fn parse_length(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.ends_with('%') {
        return None;
    }
    let number = raw.strip_suffix("px").unwrap_or(raw).trim();
    number.parse::<f64>().ok().filter(|v| *v > 0.0)
}

fn parse_view_box(raw: &str) -> Option<(f64, f64)> {
    let values: Vec<f64> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some((*w, *h)),
        _ => None,
    }
}
