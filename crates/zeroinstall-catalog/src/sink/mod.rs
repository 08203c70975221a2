//! Persistence sinks. One entry's rows are written all-or-nothing.

pub mod json_dir;
pub mod memory;
pub mod records;

pub use json_dir::JsonDirSink;
pub use memory::MemorySink;
pub use records::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::Decision;

#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Replace everything stored for `entry_id` with the rows of `decision`.
    async fn upsert(&self, entry_id: &str, decision: &Decision) -> Result<EntryRecord>;

    /// When the entry was last written, if ever.
    async fn last_validated(&self, entry_id: &str) -> Result<Option<DateTime<Utc>>>;
}
