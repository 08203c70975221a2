//! Tracing setup: stderr plus an optional daily-rolling file.

use env_flags::env_flags;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, Layer, Registry, prelude::*};

use crate::config::UserConfig;

pub const LOG_FILE_NAME: &str = "zeroinstall-catalog.log";

static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    Json,
    Compact,
    Pretty,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub filter: String,
    pub style: LogStyle,
    pub to_file: bool,
    pub dir: PathBuf,
}

impl LoggingSettings {
    /// Env flags win when set, then `[logging]` from the config file, then defaults.
    pub fn resolve(home: &Path, user_cfg: Option<&UserConfig>) -> Self {
        env_flags! {
            /// Tracing filter, e.g. "info", "debug", or targets format.
            RUST_LOG: &str = "info";
            /// Preferred filter env. If set, overrides RUST_LOG.
            TRACING_FILTER: &str = "";
            /// Pretty formatting for logs (ignored if TRACING_JSON=true).
            TRACING_PRETTY: bool = false;
            /// Compact single-line formatting for logs (ignored if TRACING_JSON=true)
            TRACING_COMPACT: bool = true;
            /// JSON formatting for logs
            TRACING_JSON: bool = false;
            /// If true, also log to file under <CATALOG_HOME>/logs or LOG_DIR
            LOG_TO_FILE: bool = true;
            /// Optional explicit log directory. Defaults to <CATALOG_HOME>/logs
            LOG_DIR: &str = "";
        }

        let env_set = |k: &str| std::env::var_os(k).is_some();

        let mut filter = if !(*TRACING_FILTER).is_empty() {
            (*TRACING_FILTER).to_string()
        } else {
            (*RUST_LOG).to_string()
        };
        let mut json = *TRACING_JSON;
        let mut compact = *TRACING_COMPACT;
        let mut pretty = *TRACING_PRETTY;
        let mut to_file = *LOG_TO_FILE;
        let mut dir = if !(*LOG_DIR).is_empty() {
            Some(PathBuf::from((*LOG_DIR).to_string()))
        } else {
            None
        };

        if let Some(cfg) = user_cfg.and_then(|c| c.logging.as_ref()) {
            if !(env_set("TRACING_FILTER") || env_set("RUST_LOG"))
                && let Some(level) = cfg.level.as_ref()
            {
                filter = level.clone();
            }
            if !env_set("TRACING_JSON")
                && let Some(v) = cfg.json
            {
                json = v;
            }
            if !env_set("TRACING_COMPACT")
                && let Some(v) = cfg.compact
            {
                compact = v;
            }
            if !env_set("TRACING_PRETTY")
                && let Some(v) = cfg.pretty
            {
                pretty = v;
            }
            if !env_set("LOG_TO_FILE")
                && let Some(v) = cfg.to_file
            {
                to_file = v;
            }
            if !env_set("LOG_DIR")
                && let Some(d) = cfg.dir.as_ref()
            {
                dir = Some(crate::config::expand_home(d));
            }
        }

        Self {
            filter,
            style: pick_style(json, compact, pretty),
            to_file,
            dir: dir.unwrap_or_else(|| home.join("logs")),
        }
    }
}

/// JSON beats compact beats pretty; none of them means the full format.
pub fn pick_style(json: bool, compact: bool, pretty: bool) -> LogStyle {
    if json {
        LogStyle::Json
    } else if compact {
        LogStyle::Compact
    } else if pretty {
        LogStyle::Pretty
    } else {
        LogStyle::Full
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn styled<W>(style: LogStyle, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let base = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);
    match style {
        LogStyle::Json => base.json().boxed(),
        LogStyle::Compact => base.compact().boxed(),
        LogStyle::Pretty => base.pretty().boxed(),
        LogStyle::Full => base.boxed(),
    }
}

/// Install the global subscriber. Safe to call twice; the second call is a no-op.
pub fn init_tracing(settings: &LoggingSettings) {
    let filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the run summary, logs go to stderr
    let mut layers: Vec<BoxedLayer> = vec![styled(settings.style, std::io::stderr, true)];
    let mut dir_error = None;
    if settings.to_file {
        match std::fs::create_dir_all(&settings.dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(&settings.dir, LOG_FILE_NAME);
                let (nb, guard) = tracing_appender::non_blocking(appender);
                let _ = FILE_GUARD.set(guard);
                layers.push(styled(settings.style, nb, false));
            }
            Err(e) => dir_error = Some(e),
        }
    }

    let subscriber = tracing_subscriber::registry().with(layers).with(filter);
    if let Err(e) = subscriber.try_init() {
        tracing::debug!("tracing already set: {:?}", e);
    }
    if let Some(e) = dir_error {
        tracing::warn!("failed to create log dir {}: {}", settings.dir.display(), e);
    }
}
