use std::collections::{BTreeMap, HashMap};

use super::default::default_known_remotes;
use super::{KnownRemote, KnownRemotes, RawKnownRemote};
use crate::model::MethodType;

pub fn load_default() -> KnownRemotes {
    KnownRemotes {
        by_identity: default_known_remotes(),
    }
}

/// Defaults plus `[[known_remotes]]` entries; config entries replace defaults
/// with the same identity.
pub fn build_known_remotes(raw: &[RawKnownRemote]) -> KnownRemotes {
    let mut by_identity = default_known_remotes();
    for e in raw {
        let Some(remote) = from_raw(e) else {
            tracing::warn!("known remote '{}' ignored: url must be http(s)", e.server);
            continue;
        };
        for alias in e.aliases.iter().flatten() {
            insert_remote(&mut by_identity, alias, &remote);
        }
        insert_remote(&mut by_identity, &e.server, &remote);
    }
    KnownRemotes { by_identity }
}

fn from_raw(e: &RawKnownRemote) -> Option<KnownRemote> {
    let url = e.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return None;
    }
    let method_type = e
        .method_type
        .as_deref()
        .and_then(MethodType::parse)
        .filter(|t| t.is_remote())
        .unwrap_or(MethodType::Http);
    let mut env_vars = BTreeMap::new();
    if let Some(var) = e.env_var.as_ref().filter(|v| !v.trim().is_empty()) {
        let description = e
            .env_description
            .clone()
            .unwrap_or_else(|| format!("API token for {} authentication", e.server));
        env_vars.insert(var.trim().to_string(), description);
    }
    let headers = match &e.headers {
        Some(h) => h.clone(),
        None => env_vars
            .keys()
            .next()
            .map(|var| {
                BTreeMap::from([("Authorization".to_string(), format!("Bearer ${{{}}}", var))])
            })
            .unwrap_or_default(),
    };
    Some(KnownRemote {
        server: e.server.to_ascii_lowercase(),
        url: url.to_string(),
        method_type,
        env_vars,
        headers,
    })
}

fn insert_remote(map: &mut HashMap<String, KnownRemote>, identity: &str, remote: &KnownRemote) {
    map.insert(identity.trim().to_ascii_lowercase(), remote.clone());
}

/// `owner/repo` of a GitHub-style repository URL, lowercased.
pub fn repo_identity(repository_url: &str) -> Option<String> {
    let rest = repository_url
        .trim()
        .trim_end_matches('/')
        .trim_end_matches(".git")
        .split("://")
        .last()?;
    let mut parts = rest.split('/').skip(1);
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    Some(format!("{}/{}", owner, repo).to_ascii_lowercase())
}

impl KnownRemotes {
    /// Look up by entry name first, then by the repository's `owner/repo`.
    pub fn lookup(&self, name: &str, repository_url: &str) -> Option<&KnownRemote> {
        self.by_identity
            .get(&name.trim().to_ascii_lowercase())
            .or_else(|| {
                repo_identity(repository_url).and_then(|id| self.by_identity.get(&id))
            })
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }
}
