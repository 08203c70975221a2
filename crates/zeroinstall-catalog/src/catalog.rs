//! Catalog input: the list of servers to validate.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Opaque server identifier, used as the persistence key.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub repository_url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    entries: Vec<CatalogEntry>,
}

/// Parse a catalog from TOML (`[[entries]]`) or a JSON array.
pub fn parse_catalog(s: &str, json: bool) -> Result<Vec<CatalogEntry>> {
    let entries: Vec<CatalogEntry> = if json {
        serde_json::from_str(s)?
    } else {
        toml::from_str::<CatalogFile>(s)?.entries
    };

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(entries.len());
    for (i, e) in entries.into_iter().enumerate() {
        if e.id.trim().is_empty() {
            return Err(CatalogError::Catalog(format!("entry {} has an empty id", i + 1)));
        }
        if !seen.insert(e.id.clone()) {
            tracing::warn!("duplicate catalog id '{}' ignored", e.id);
            continue;
        }
        out.push(e);
    }
    Ok(out)
}

pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let content = std::fs::read_to_string(path)?;
    let json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        || content.trim_start().starts_with('[');
    parse_catalog(&content, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toml_entries_in_order() {
        let toml = r#"
[[entries]]
id = "a1"
name = "github/github-mcp-server"
repository_url = "https://github.com/github/github-mcp-server"
stars = 12000

[[entries]]
id = "b2"
name = "demo"
"#;
        let entries = parse_catalog(toml, false).expect("parse ok");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "a1");
        assert_eq!(entries[0].stars, Some(12000));
        assert_eq!(entries[1].repository_url, "");
    }

    #[test]
    fn parses_json_array_and_drops_duplicates() {
        let json = r#"[{"id":"x","name":"one"},{"id":"x","name":"two"},{"id":"y","name":"three","language":"Rust"}]"#;
        let entries = parse_catalog(json, true).expect("parse ok");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "one");
        assert_eq!(entries[1].language.as_deref(), Some("Rust"));
    }

    #[test]
    fn empty_id_is_rejected() {
        let err = parse_catalog(r#"[{"id":" ","name":"n"}]"#, true).unwrap_err();
        assert!(matches!(err, CatalogError::Catalog(_)));
    }

    #[test]
    fn loads_from_file_by_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.txt");
        std::fs::write(&path, r#"[{"id":"z","name":"n"}]"#).expect("write");
        let entries = load_catalog(&path).expect("load");
        assert_eq!(entries[0].id, "z");
    }
}
