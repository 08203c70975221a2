use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, bail};
use env_flags::env_flags;

use zeroinstall_catalog::catalog::load_catalog;
use zeroinstall_catalog::config::{PipelineCfg, expand_home, load_user_config};
use zeroinstall_catalog::known_remotes::build_known_remotes;
use zeroinstall_catalog::logging::{LoggingSettings, init_tracing};
use zeroinstall_catalog::normalize::FlagKnowledge;
use zeroinstall_catalog::pipeline::Pipeline;
use zeroinstall_catalog::proposer::{CandidateProposer, NullProposer, OllamaProposer};
use zeroinstall_catalog::runner::{RunSettings, run};
use zeroinstall_catalog::sink::{JsonDirSink, PersistenceSink};
use zeroinstall_catalog::sources::{DocumentSource, GithubSource, LocalSource};

env_flags! {
    /// Catalog home directory. Defaults to $HOME/.zeroinstall-catalog
    CATALOG_HOME: &str = "";
    /// Catalog file (TOML `[[entries]]` or JSON array). Defaults to <home>/catalog.toml
    CATALOG_FILE: &str = "";
    /// Where entry records are written. Defaults to <home>/records
    OUTPUT_DIR: &str = "";
    /// Document source: "github" or "local"
    DOCS_SOURCE: &str = "github";
    /// Root of per-entry document directories for the local source
    DOCS_DIR: &str = "";
    /// Optional GitHub token for the github source
    GITHUB_TOKEN: &str = "";
    /// Timeout for each document request
    FETCH_TIMEOUT_SECS: u64 = 30;
    /// Candidate proposer: "ollama" or "none"
    PROPOSER: &str = "ollama";
    OLLAMA_BASE: &str = "http://localhost:11434";
    OLLAMA_MODEL: &str = "qwen3:30b";
    /// Timeout for one proposer call
    PROPOSER_TIMEOUT_SECS: u64 = 180;
    /// Process at most this many entries (0 = all)
    LIMIT: usize = 0;
    /// Revalidate entries even if validated recently
    FORCE: bool = false;
    REVALIDATE_AFTER_DAYS: i64 = 5;
    /// Sleep PACE_DELAY_MS after every PACE_EVERY entries
    PACE_EVERY: usize = 5;
    PACE_DELAY_MS: u64 = 2000;
}

fn env_set(k: &str) -> bool {
    std::env::var_os(k).is_some()
}

/// Explicit env var, then config file, then the flag's default.
fn pick<T: Clone>(key: &str, env_value: T, cfg_value: Option<T>) -> T {
    if env_set(key) {
        return env_value;
    }
    cfg_value.unwrap_or(env_value)
}

fn pick_str(key: &str, env_value: &str, cfg_value: Option<&String>) -> String {
    pick(key, env_value.to_string(), cfg_value.cloned())
}

fn catalog_home() -> PathBuf {
    if !(*CATALOG_HOME).is_empty() {
        expand_home(*CATALOG_HOME)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".zeroinstall-catalog")
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".zeroinstall-catalog")
    }
}

fn or_default_path(value: String, default: PathBuf) -> PathBuf {
    if value.is_empty() {
        default
    } else {
        expand_home(&value)
    }
}

fn build_source(p: &PipelineCfg) -> anyhow::Result<Arc<dyn DocumentSource>> {
    let kind = pick_str("DOCS_SOURCE", *DOCS_SOURCE, p.docs_source.as_ref());
    match kind.as_str() {
        "github" => {
            let token = (!(*GITHUB_TOKEN).is_empty()).then(|| (*GITHUB_TOKEN).to_string());
            let timeout = pick("FETCH_TIMEOUT_SECS", *FETCH_TIMEOUT_SECS, p.fetch_timeout_secs);
            let source = GithubSource::new(token, Duration::from_secs(timeout))
                .context("building github client")?;
            Ok(Arc::new(source))
        }
        "local" => {
            let dir = pick_str("DOCS_DIR", *DOCS_DIR, p.docs_dir.as_ref());
            if dir.is_empty() {
                bail!("DOCS_SOURCE=local requires DOCS_DIR");
            }
            Ok(Arc::new(LocalSource::new(expand_home(&dir))))
        }
        other => bail!("unknown DOCS_SOURCE '{}' (expected github or local)", other),
    }
}

fn build_proposer(p: &PipelineCfg) -> anyhow::Result<Arc<dyn CandidateProposer>> {
    let kind = pick_str("PROPOSER", *PROPOSER, p.proposer.as_ref());
    match kind.as_str() {
        "ollama" => {
            let base = pick_str("OLLAMA_BASE", *OLLAMA_BASE, p.ollama_base.as_ref());
            let model = pick_str("OLLAMA_MODEL", *OLLAMA_MODEL, p.ollama_model.as_ref());
            let timeout = pick(
                "PROPOSER_TIMEOUT_SECS",
                *PROPOSER_TIMEOUT_SECS,
                p.proposer_timeout_secs,
            );
            tracing::info!("proposer: ollama {} (model={})", base, model);
            let proposer = OllamaProposer::new(base, model, Duration::from_secs(timeout))
                .context("building ollama client")?;
            Ok(Arc::new(proposer))
        }
        "none" => Ok(Arc::new(NullProposer)),
        other => bail!("unknown PROPOSER '{}' (expected ollama or none)", other),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let home = catalog_home();
    let user_cfg = match load_user_config(&home) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ignoring unreadable config in {}: {}", home.display(), e);
            None
        }
    };

    init_tracing(&LoggingSettings::resolve(&home, user_cfg.as_ref()));
    tracing::info!("catalog_home={}", home.display());

    let user_cfg = user_cfg.unwrap_or_default();
    let p = user_cfg.pipeline.unwrap_or_default();

    let kb = Arc::new(FlagKnowledge::builtin().with_overrides(&user_cfg.flags));
    let known_remotes = Arc::new(build_known_remotes(&user_cfg.known_remotes));
    tracing::debug!("known remotes: {}", known_remotes.len());

    let catalog_file = or_default_path(
        pick_str("CATALOG_FILE", *CATALOG_FILE, p.catalog_file.as_ref()),
        home.join("catalog.toml"),
    );
    let entries = load_catalog(&catalog_file)
        .with_context(|| format!("loading catalog {}", catalog_file.display()))?;
    tracing::info!("loaded {} catalog entries from {}", entries.len(), catalog_file.display());

    let output_dir = or_default_path(
        pick_str("OUTPUT_DIR", *OUTPUT_DIR, p.output_dir.as_ref()),
        home.join("records"),
    );
    let sink: Arc<dyn PersistenceSink> = Arc::new(
        JsonDirSink::new(&output_dir)
            .with_context(|| format!("creating output dir {}", output_dir.display()))?,
    );

    let pipeline = Pipeline::new(kb, known_remotes, build_source(&p)?, build_proposer(&p)?);
    let settings = RunSettings {
        limit: pick("LIMIT", *LIMIT, p.limit),
        force: pick("FORCE", *FORCE, p.force),
        revalidate_after_days: pick("REVALIDATE_AFTER_DAYS", *REVALIDATE_AFTER_DAYS, p.revalidate_after_days),
        pace_every: pick("PACE_EVERY", *PACE_EVERY, p.pace_every),
        pace_delay: Duration::from_millis(pick("PACE_DELAY_MS", *PACE_DELAY_MS, p.pace_delay_ms)),
    };

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; stopping after the current entry");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let summary = run(&entries, &settings, &pipeline, sink, cancel).await;
    println!(
        "kept={} deleted={} failed={} skipped={}{}",
        summary.kept,
        summary.deleted,
        summary.failed,
        summary.skipped,
        if summary.interrupted { " (interrupted)" } else { "" }
    );
    Ok(())
}
