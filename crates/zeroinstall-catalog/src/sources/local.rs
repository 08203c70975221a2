//! Documents from a local directory tree: `<root>/<entry id>/<file>`.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use super::{DocumentSet, DocumentSource};
use crate::catalog::CatalogEntry;
use crate::error::{CatalogError, Result};

pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/<id>`, or an error when the id would leave `root`.
    pub fn entry_dir(&self, entry_id: &str) -> Result<PathBuf> {
        let rel = Path::new(entry_id);
        let confined = !entry_id.trim().is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !confined {
            return Err(CatalogError::Source(format!(
                "entry id '{}' is not a relative path below the docs directory",
                entry_id
            )));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl DocumentSource for LocalSource {
    async fn fetch(&self, entry: &CatalogEntry) -> Result<DocumentSet> {
        let dir = self.entry_dir(&entry.id)?;
        let mut docs = DocumentSet::new();
        if !dir.is_dir() {
            tracing::debug!("no local docs at {}", dir.display());
            return Ok(docs);
        }
        let mut rd = tokio::fs::read_dir(&dir).await?;
        while let Some(item) = rd.next_entry().await? {
            let path = item.path();
            if !item.file_type().await?.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    docs.insert(name.to_string(), text);
                }
                Err(e) => tracing::debug!("skipping {}: {}", path.display(), e),
            }
        }
        Ok(docs)
    }

    fn name(&self) -> &str {
        "local"
    }
}
