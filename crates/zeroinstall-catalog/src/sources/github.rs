//! GitHub contents/tree API source.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

use super::{DocumentSet, DocumentSource};
use crate::catalog::CatalogEntry;
use crate::error::{CatalogError, Result};

const API_BASE: &str = "https://api.github.com";
const README_VARIANTS: [&str; 3] = ["README.md", "readme.md", "Readme.md"];
const EXAMPLE_PATHS: [&str; 5] = [
    "examples/claude_desktop_config.json",
    "examples/config.json",
    "docs/installation.md",
    "docs/setup.md",
    "docs/mcp.md",
];
const DOC_PATH_KEYWORDS: [&str; 6] = ["setup", "install", "config", "usage", "guide", "doc"];
pub const MAX_TREE_DOCUMENTS: usize = 30;

static GITHUB_REPO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"github\.com/([^/]+)/([^/\s\)#]+)").expect("github repo regex")
});

/// `(owner, repo)` from a GitHub URL.
pub fn parse_github_repo(url: &str) -> Option<(String, String)> {
    let caps = GITHUB_REPO.captures(url)?;
    let owner = caps[1].to_string();
    let repo = caps[2].trim_end_matches(".git").to_string();
    if repo.is_empty() {
        return None;
    }
    Some((owner, repo))
}

/// Markdown files likely to describe setup or MCP usage.
pub fn is_doc_candidate(path: &str) -> bool {
    let path_lower = path.to_ascii_lowercase();
    let filename = path_lower.rsplit('/').next().unwrap_or(&path_lower);
    if !filename.ends_with(".md") {
        return false;
    }
    path_lower.contains("mcp")
        || filename.starts_with("claude")
        || DOC_PATH_KEYWORDS.iter().any(|k| path_lower.contains(k))
}

/// Decode a contents-API payload; only base64 content is accepted.
pub fn decode_contents(payload: &JsonValue) -> Option<String> {
    if payload.get("encoding").and_then(JsonValue::as_str) != Some("base64") {
        return None;
    }
    let raw: String = payload
        .get("content")?
        .as_str()?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = STANDARD.decode(raw.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

/// Candidate paths from a recursive tree listing, in listing order.
pub fn doc_paths_from_tree(tree: &JsonValue) -> Vec<String> {
    let Some(items) = tree.get("tree").and_then(JsonValue::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| item.get("type").and_then(JsonValue::as_str) == Some("blob"))
        .filter_map(|item| item.get("path").and_then(JsonValue::as_str))
        .filter(|p| is_doc_candidate(p))
        .take(MAX_TREE_DOCUMENTS)
        .map(str::to_string)
        .collect()
}

pub struct GithubSource {
    http: Client,
    api_base: String,
    token: Option<String>,
}

impl GithubSource {
    pub fn new(token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zeroinstall-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_base: API_BASE.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Option<JsonValue>> {
        let mut req = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        if !resp.status().is_success() {
            tracing::debug!("GET {} -> {}", url, resp.status());
            return Ok(None);
        }
        Ok(Some(resp.json().await?))
    }

    async fn download_file(&self, owner: &str, repo: &str, path: &str) -> Option<String> {
        let url = format!("{}/repos/{}/{}/contents/{}", self.api_base, owner, repo, path);
        match self.get_json(&url).await {
            Ok(Some(payload)) => decode_contents(&payload),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!("download {} failed: {}", path, e);
                None
            }
        }
    }

    async fn find_doc_files(&self, owner: &str, repo: &str) -> Vec<String> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/HEAD?recursive=1",
            self.api_base, owner, repo
        );
        match self.get_json(&url).await {
            Ok(Some(tree)) => doc_paths_from_tree(&tree),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::debug!("tree listing for {}/{} failed: {}", owner, repo, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl DocumentSource for GithubSource {
    async fn fetch(&self, entry: &CatalogEntry) -> Result<DocumentSet> {
        let Some((owner, repo)) = parse_github_repo(&entry.repository_url) else {
            if entry.repository_url.trim().is_empty() {
                return Ok(DocumentSet::new());
            }
            return Err(CatalogError::Source(format!(
                "not a GitHub repository url: {}",
                entry.repository_url
            )));
        };
        let mut docs = DocumentSet::new();

        for name in README_VARIANTS {
            if let Some(content) = self.download_file(&owner, &repo, name).await {
                docs.insert("README.md".to_string(), content);
                break;
            }
        }
        for path in self.find_doc_files(&owner, &repo).await {
            if let Some(content) = self.download_file(&owner, &repo, &path).await {
                docs.insert(path, content);
            }
        }
        for path in EXAMPLE_PATHS {
            if docs.contains_key(path) {
                continue;
            }
            if let Some(content) = self.download_file(&owner, &repo, path).await {
                docs.insert(path.to_string(), content);
            }
        }

        tracing::debug!("fetched {} document(s) for {}/{}", docs.len(), owner, repo);
        Ok(docs)
    }

    fn name(&self) -> &str {
        "github"
    }
}
