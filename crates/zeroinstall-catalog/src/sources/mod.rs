//! Document sources: where an entry's documentation comes from.

pub mod combine;
pub mod github;
pub mod local;

pub use combine::*;
pub use github::GithubSource;
pub use local::LocalSource;

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

use crate::catalog::CatalogEntry;
use crate::error::Result;

/// Document name -> text.
pub type DocumentSet = BTreeMap<String, String>;

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// All documents for `entry`; an empty set is a valid answer.
    async fn fetch(&self, entry: &CatalogEntry) -> Result<DocumentSet>;

    fn name(&self) -> &str;
}

/// In-memory documents keyed by entry id.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    docs: HashMap<String, DocumentSet>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(
        mut self,
        entry_id: impl Into<String>,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.docs
            .entry(entry_id.into())
            .or_default()
            .insert(name.into(), text.into());
        self
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch(&self, entry: &CatalogEntry) -> Result<DocumentSet> {
        Ok(self.docs.get(&entry.id).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "static"
    }
}
