//! One JSON document per entry under a directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::{EntryRecord, PersistenceSink};
use crate::error::{CatalogError, Result};
use crate::model::Decision;

pub struct JsonDirSink {
    dir: PathBuf,
}

/// File stem for an entry id. Bytes outside `[A-Za-z0-9._-]` become `%XX`,
/// so distinct ids never share a file.
pub fn file_stem(entry_id: &str) -> String {
    let mut stem = String::with_capacity(entry_id.len());
    for b in entry_id.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-') {
            stem.push(char::from(b));
        } else {
            stem.push_str(&format!("%{:02X}", b));
        }
    }
    // "." and ".." are not usable as file stems on their own
    if stem.bytes().all(|b| b == b'.') {
        stem = stem.replace('.', "%2E");
    }
    stem
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl JsonDirSink {
    /// Creates `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn record_path(&self, entry_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(entry_id)))
    }

    pub fn read(&self, entry_id: &str) -> Result<Option<EntryRecord>> {
        let path = self.record_path(entry_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let record: EntryRecord = serde_json::from_str(&content)?;
        if record.entry_id != entry_id {
            tracing::warn!(
                "{} holds entry '{}', not '{}'",
                path.display(),
                record.entry_id,
                entry_id
            );
            return Ok(None);
        }
        Ok(Some(record))
    }
}

#[async_trait]
impl PersistenceSink for JsonDirSink {
    async fn upsert(&self, entry_id: &str, decision: &Decision) -> Result<EntryRecord> {
        let record = EntryRecord::from_decision(entry_id, decision, Utc::now());
        let bytes = serde_json::to_vec_pretty(&record)?;
        let dir = self.dir.clone();
        let path = self.record_path(entry_id);
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &bytes))
            .await
            .map_err(|e| CatalogError::Persistence {
                entry_id: entry_id.to_string(),
                message: e.to_string(),
            })?
            .map_err(|e| CatalogError::Persistence {
                entry_id: entry_id.to_string(),
                message: e.to_string(),
            })?;
        Ok(record)
    }

    async fn last_validated(&self, entry_id: &str) -> Result<Option<DateTime<Utc>>> {
        match self.read(entry_id) {
            Ok(record) => Ok(record.map(|r| r.validated_at)),
            Err(CatalogError::Json(e)) => {
                tracing::warn!("unreadable record for {}: {}", entry_id, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::normalize;
    use crate::model::{MethodDraft, MethodOrigin, ValidationTrail};
    use crate::normalize::FlagKnowledge;
    use crate::sink::EntryStatus;

    #[test]
    fn file_stems_are_safe_and_distinct() {
        assert_eq!(file_stem("github/github-mcp-server"), "github%2Fgithub-mcp-server");
        assert_eq!(file_stem("abc-123.v2"), "abc-123.v2");
        assert_eq!(file_stem("a_b"), "a_b");
        assert_ne!(file_stem("a/b"), file_stem("a_b"));
        assert_ne!(file_stem("a%2Fb"), file_stem("a/b"));
        assert_eq!(file_stem(".."), "%2E%2E");
        assert_eq!(file_stem("日"), "%E6%97%A5");
    }

    #[tokio::test]
    async fn similar_ids_keep_separate_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = JsonDirSink::new(dir.path()).expect("sink");
        let d = Decision::delete("gone", ValidationTrail::new());
        sink.upsert("a/b", &d).await.expect("upsert");

        assert!(sink.last_validated("a_b").await.expect("lookup").is_none());
        assert!(sink.read("a_b").expect("read").is_none());
        assert!(sink.last_validated("a/b").await.expect("lookup").is_some());
    }

    #[tokio::test]
    async fn record_for_another_id_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = JsonDirSink::new(dir.path()).expect("sink");
        let d = Decision::delete("gone", ValidationTrail::new());
        sink.upsert("x", &d).await.expect("upsert");
        fs::rename(sink.record_path("x"), sink.record_path("y")).expect("rename");
        assert!(sink.read("y").expect("read").is_none());
        assert!(sink.last_validated("y").await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn writes_and_reads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = JsonDirSink::new(dir.path().join("records")).expect("sink");
        let mut d = MethodDraft::with_command(MethodOrigin::ConfigBlock, "uvx mcp-server-time");
        d.deployment_score = Some(10);
        let m = normalize(&d, &FlagKnowledge::builtin());
        let decision = Decision::keep(vec![m], ValidationTrail::new());

        let written = sink.upsert("srv/1", &decision).await.expect("upsert");
        assert_eq!(written.status, EntryStatus::Active);
        let read = sink.read("srv/1").expect("read").expect("record");
        assert_eq!(read, written);
        assert!(sink.last_validated("srv/1").await.expect("lookup").is_some());
        assert!(sink.last_validated("missing").await.expect("lookup").is_none());

        // no temp files left behind
        let names: Vec<_> = fs::read_dir(dir.path().join("records"))
            .expect("read_dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_record_counts_as_never_validated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = JsonDirSink::new(dir.path()).expect("sink");
        fs::write(sink.record_path("x"), "{not json").expect("write");
        assert!(sink.last_validated("x").await.expect("lookup").is_none());
    }
}
