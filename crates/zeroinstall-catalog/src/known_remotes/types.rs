use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::model::MethodType;

/// Hosted endpoint for one well-known server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownRemote {
    /// Lowercased identity, usually `owner/repo`.
    pub server: String,
    pub url: String,
    pub method_type: MethodType,
    pub env_vars: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
}

/// Read-only registry, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct KnownRemotes {
    pub by_identity: HashMap<String, KnownRemote>,
}

/// `[[known_remotes]]` table in `config.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawKnownRemote {
    pub server: String,
    pub url: String,
    #[serde(default, rename = "type")]
    pub method_type: Option<String>,
    #[serde(default)]
    pub env_var: Option<String>,
    #[serde(default)]
    pub env_description: Option<String>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>, // additional identities for the same endpoint
}
