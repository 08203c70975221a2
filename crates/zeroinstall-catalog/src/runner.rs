//! Sequential run over the catalog.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::catalog::CatalogEntry;
use crate::model::Action;
use crate::pipeline::Pipeline;
use crate::sink::PersistenceSink;

#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Process at most this many entries; 0 means all.
    pub limit: usize,
    /// Revalidate entries even when their record is fresh.
    pub force: bool,
    pub revalidate_after_days: i64,
    /// Sleep `pace_delay` after every `pace_every` processed entries; 0 disables.
    pub pace_every: usize,
    pub pace_delay: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            limit: 0,
            force: false,
            revalidate_after_days: 5,
            pace_every: 5,
            pace_delay: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub kept: usize,
    pub deleted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.kept + self.deleted + self.failed
    }
}

async fn is_fresh(sink: &dyn PersistenceSink, entry_id: &str, days: i64) -> bool {
    match sink.last_validated(entry_id).await {
        Ok(Some(at)) => Utc::now() - at < ChronoDuration::days(days),
        Ok(None) => false,
        Err(e) => {
            warn!("cannot read last validation for {}: {}", entry_id, e);
            false
        }
    }
}

/// Process `entries` in order, one at a time. `cancel` is checked between
/// entries; the entry in flight always completes.
pub async fn run(
    entries: &[CatalogEntry],
    settings: &RunSettings,
    pipeline: &Pipeline,
    sink: Arc<dyn PersistenceSink>,
    cancel: Arc<AtomicBool>,
) -> RunSummary {
    let run_id = Uuid::new_v4();
    let entries = if settings.limit > 0 && settings.limit < entries.len() {
        &entries[..settings.limit]
    } else {
        entries
    };
    info!("run {} starting: {} entries", run_id, entries.len());

    let mut summary = RunSummary::default();
    let mut processed = 0usize;
    for (i, entry) in entries.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            info!("interrupted before entry {}/{}", i + 1, entries.len());
            summary.interrupted = true;
            break;
        }
        if !settings.force
            && is_fresh(sink.as_ref(), &entry.id, settings.revalidate_after_days).await
        {
            info!("skipping {}: validated within {} days", entry.name, settings.revalidate_after_days);
            summary.skipped += 1;
            continue;
        }

        let span = info_span!("entry", run = %run_id, id = %entry.id, name = %entry.name);
        async {
            info!("[{}/{}] validating", i + 1, entries.len());
            let decision = pipeline.process_entry(entry).await;
            match sink.upsert(&entry.id, &decision).await {
                Ok(_) => match decision.action {
                    Action::Keep => summary.kept += 1,
                    Action::Delete => summary.deleted += 1,
                },
                Err(e) => {
                    warn!("persisting decision failed: {}", e);
                    summary.failed += 1;
                }
            }
        }
        .instrument(span)
        .await;

        processed += 1;
        if settings.pace_every > 0
            && processed % settings.pace_every == 0
            && i + 1 < entries.len()
            && !settings.pace_delay.is_zero()
        {
            info!("pacing: sleeping {:?}", settings.pace_delay);
            tokio::time::sleep(settings.pace_delay).await;
        }
    }

    info!(
        "run {} finished: kept={} deleted={} failed={} skipped={} interrupted={}",
        run_id, summary.kept, summary.deleted, summary.failed, summary.skipped, summary.interrupted
    );
    summary
}
