//! Derivación de metadatos de presentación a partir del nombre de fichero.
//!
//! La categoría se decide con una tabla ordenada de reglas: se evalúan en orden
//! y gana la primera cuya palabra clave aparezca en el nombre (en minúsculas).

use std::path::Path;

pub const DEFAULT_CATEGORY: &str = "General";

const AUTH_DESCRIPTION: &str = "Diagrama que ilustra el flujo de autenticación JWT, incluyendo el proceso de login, generación de tokens y validación en el servidor.";

/// Regla de categorización: si alguna `keyword` aparece en el nombre, se
/// asignan `category` y `tags`. Sin `description` propia se usa la genérica.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub keywords: &'static [&'static str],
    pub category: &'static str,
    pub tags: &'static [&'static str],
    pub description: Option<&'static str>,
}

impl CategoryRule {
    pub fn matches(&self, lowered_name: &str) -> bool {
        self.keywords.iter().any(|k| lowered_name.contains(k))
    }
}

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        keywords: &["jwt", "auth"],
        category: "Autenticación",
        tags: &["JWT", "Autenticación", "Seguridad", "API"],
        description: Some(AUTH_DESCRIPTION),
    },
    CategoryRule {
        keywords: &["api"],
        category: "APIs",
        tags: &["API", "REST", "Backend"],
        description: None,
    },
    CategoryRule {
        keywords: &["db", "database"],
        category: "Base de Datos",
        tags: &["Database", "SQL", "Backend"],
        description: None,
    },
    CategoryRule {
        keywords: &["flow", "workflow"],
        category: "Flujos de Trabajo",
        tags: &["Workflow", "Process", "Flow"],
        description: None,
    },
    CategoryRule {
        keywords: &["architecture", "arch"],
        category: "Arquitectura",
        tags: &["Architecture", "System Design", "Infrastructure"],
        description: None,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedMetadata {
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub description: String,
}

/// Deriva título, categoría, etiquetas y descripción. Total: cualquier
/// cadena produce un resultado.
pub fn derive(filename: &str) -> DerivedMetadata {
    let stem = file_stem(filename);
    let title = title_from_stem(stem);
    let lowered = stem.to_lowercase();

    match CATEGORY_RULES.iter().find(|rule| rule.matches(&lowered)) {
        Some(rule) => DerivedMetadata {
            description: rule
                .description
                .map(str::to_string)
                .unwrap_or_else(|| generic_description(&title)),
            category: rule.category.to_string(),
            tags: rule.tags.iter().map(|t| t.to_string()).collect(),
            title,
        },
        None => DerivedMetadata {
            description: generic_description(&title),
            category: DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
            title,
        },
    }
}

/// Título legible: separa por `-` y `_`, capitaliza cada palabra y une con espacios.
pub fn title_from_stem(stem: &str) -> String {
    stem.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn generic_description(title: &str) -> String {
    format!("Diagrama de {title}")
}
