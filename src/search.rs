//! Filtro de búsqueda: coincidencia por subcadena, sin distinguir mayúsculas,
//! sobre título, descripción, categoría, autor y etiquetas. Sin ranking: el
//! subconjunto conserva el orden relativo del catálogo.

use crate::models::DiagramRecord;

pub fn filter<'a>(catalog: &'a [DiagramRecord], query: &str) -> Vec<&'a DiagramRecord> {
    if query.is_empty() {
        return catalog.iter().collect();
    }
    let needle = query.to_lowercase();
    catalog.iter().filter(|d| matches(d, &needle)).collect()
}

/// `needle` debe venir ya en minúsculas.
pub fn matches(diagram: &DiagramRecord, needle: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(needle);
    hit(&diagram.title)
        || hit(&diagram.description)
        || hit(&diagram.category)
        || hit(&diagram.author)
        || diagram.tags.iter().any(|tag| hit(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, title: &str, category: &str, tags: &[&str], author: &str) -> DiagramRecord {
        DiagramRecord {
            id: id.into(),
            title: title.into(),
            description: format!("Diagrama de {title}"),
            category: category.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            path: format!("/diagrams/{id}.svg"),
            filename: format!("{id}.svg"),
            created_at: None,
            size: None,
            author: author.into(),
        }
    }

    fn catalog() -> Vec<DiagramRecord> {
        vec![
            record("a", "User Auth Flow", "Autenticación", &["JWT", "Seguridad"], ""),
            record("b", "Orders Database", "Base de Datos", &["SQL"], "Raul"),
            record("c", "Api Gateway", "APIs", &["REST"], ""),
        ]
    }

    fn ids(found: &[&DiagramRecord]) -> Vec<String> {
        found.iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let c = catalog();
        assert_eq!(ids(&filter(&c, "")), ["a", "b", "c"]);
    }

    #[test]
    fn matches_each_field_case_insensitively() {
        let c = catalog();
        assert_eq!(ids(&filter(&c, "GATEWAY")), ["c"]);
        assert_eq!(ids(&filter(&c, "jwt")), ["a"]);
        assert_eq!(ids(&filter(&c, "base de")), ["b"]);
        assert_eq!(ids(&filter(&c, "raul")), ["b"]);
        assert_eq!(ids(&filter(&c, "diagrama de")), ["a", "b", "c"]);
        assert_eq!(ids(&filter(&c, "autenticaci")), ["a"]);
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter(&catalog(), "kubernetes").is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let c = catalog();
        for query in ["", "a", "sql", "zzz", "Diagrama"] {
            let once: Vec<DiagramRecord> = filter(&c, query).into_iter().cloned().collect();
            let twice = filter(&once, query);
            assert_eq!(ids(&twice), ids(&filter(&c, query)));
        }
    }
}
