//! Ollama `/api/generate` proposer.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{CandidateProposer, ProposalRequest, parse_output_text};
use crate::error::{CatalogError, Result};
use crate::model::ProposerOutput;

pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

const PROMPT_RULES: &str = r#"You analyse documentation of an MCP server and list the ways to run it WITHOUT any local installation.

Only these count as zero-installation:
- npx -y <package> (npm registry, fetched on demand)
- uvx <package> (PyPI, fetched on demand)
- docker run <image> (container pulled on demand)
- https://... (hosted remote endpoint)

Anything needing npm install, pip install, git clone, a build step or a local binary is NOT zero-installation.

Answer with one JSON object:
{
  "has_mcp_support": "YES" | "NO",
  "raw_commands": ["<exact command lines found>"],
  "config_examples": ["<JSON configuration blocks found, verbatim>"],
  "methods": [
    {"name": "...", "command": "...", "type": "stdio" | "http" | "sse",
     "is_valid": "YES" | "NO", "deployment_ease": 1-10, "issues": "...",
     "env_vars": {"VAR": "description"}, "parameters": ["--flag"]}
  ],
  "has_remote_option": "YES" | "NO",
  "urls": [{"url": "https://...", "description": "..."}]
}"#;

pub fn build_prompt(request: &ProposalRequest) -> String {
    format!(
        "{}\n\nServer: {}\n\nDocumentation:\n{}\n",
        PROMPT_RULES, request.server_name, request.context
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    format: &'a str,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

pub struct OllamaProposer {
    endpoint: String,
    model: String,
    http: Client,
    timeout: Duration,
}

impl OllamaProposer {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            http,
            timeout,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> CatalogError {
        if e.is_timeout() {
            warn!("ollama request timed out after {:?}", self.timeout);
            CatalogError::ProposerTimeout(self.timeout)
        } else if e.is_connect() {
            CatalogError::Proposer(format!("cannot connect to ollama at {}: {}", self.endpoint, e))
        } else {
            CatalogError::Proposer(format!("request failed: {}", e))
        }
    }
}

#[async_trait]
impl CandidateProposer for OllamaProposer {
    async fn propose(&self, request: &ProposalRequest) -> Result<ProposerOutput> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = GenerateRequest {
            model: &self.model,
            prompt: build_prompt(request),
            stream: false,
            format: "json",
            options: GenerateOptions { temperature: 0.1 },
        };
        debug!(
            "sending ollama request: model={}, prompt_length={}",
            self.model,
            body.prompt.len()
        );

        let start = Instant::now();
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Proposer(format!("HTTP {}: {}", status, text)));
        }
        let parsed: GenerateResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::ProposerTimeout(self.timeout)
            } else {
                CatalogError::Proposer(format!("invalid response body: {}", e))
            }
        })?;
        if !parsed.done {
            warn!("ollama response indicates incomplete generation");
        }
        info!(
            "ollama generation completed in {:.2}s (model={})",
            start.elapsed().as_secs_f64(),
            self.model
        );
        Ok(parse_output_text(&parsed.response))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
