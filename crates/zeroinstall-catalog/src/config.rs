use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::known_remotes::RawKnownRemote;

#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    pub logging: Option<LoggingCfg>,
    pub pipeline: Option<PipelineCfg>,
    /// Extra flag knowledge per launcher (`docker`, `npx`, `uvx`, `unknown`, `config`).
    #[serde(default)]
    pub flags: BTreeMap<String, ToolFlagsCfg>,
    #[serde(default)]
    pub known_remotes: Vec<RawKnownRemote>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingCfg {
    pub to_file: Option<bool>,
    pub dir: Option<String>,
    pub json: Option<bool>,
    pub compact: Option<bool>,
    pub pretty: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PipelineCfg {
    pub catalog_file: Option<String>,
    pub output_dir: Option<String>,
    pub docs_source: Option<String>, // "github" | "local"
    pub docs_dir: Option<String>,
    pub fetch_timeout_secs: Option<u64>,

    pub proposer: Option<String>, // "ollama" | "none"
    pub ollama_base: Option<String>,
    pub ollama_model: Option<String>,
    pub proposer_timeout_secs: Option<u64>,

    pub limit: Option<usize>,
    pub force: Option<bool>,
    pub revalidate_after_days: Option<i64>,
    pub pace_every: Option<usize>,
    pub pace_delay_ms: Option<u64>,
}

/// `[flags.<tool>]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolFlagsCfg {
    pub boolean: Option<Vec<String>>,
    pub value: Option<Vec<String>>,
    pub operational: Option<Vec<String>>,
}

pub fn load_user_config(home: &Path) -> Result<Option<UserConfig>> {
    let path = home.join("config.toml");
    if !path.exists() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)?;
    let cfg: UserConfig = toml::from_str(&s)?;
    Ok(Some(cfg))
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}
