//! Canonical method records and the loosely-populated drafts they are built from.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport used to talk to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodType {
    Stdio,
    Http,
    Sse,
}

impl MethodType {
    /// Lenient parse of a transport name; unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Some(Self::Stdio),
            "http" | "streamable-http" | "streamable_http" | "streamablehttp" => Some(Self::Http),
            "sse" => Some(Self::Sse),
            _ => None,
        }
    }

    pub fn is_remote(self) -> bool {
        matches!(self, Self::Http | Self::Sse)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
            Self::Sse => "sse",
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry a method pulls its artifact from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Registry {
    Npm,
    Pypi,
    Docker,
    Remote,
    Unknown,
}

impl Registry {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npm" => Some(Self::Npm),
            "pypi" => Some(Self::Pypi),
            "docker" => Some(Self::Docker),
            "remote" => Some(Self::Remote),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Execution hint implied by the registry.
    pub fn runtime(self) -> Runtime {
        match self {
            Self::Npm => Runtime::Npx,
            Self::Pypi => Runtime::Uvx,
            Self::Docker => Runtime::Docker,
            Self::Remote => Runtime::Http,
            Self::Unknown => Runtime::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pypi => "pypi",
            Self::Docker => "docker",
            Self::Remote => "remote",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    Npx,
    Uvx,
    Docker,
    Http,
    Unknown,
}

impl Runtime {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Npx => "npx",
            Self::Uvx => "uvx",
            Self::Docker => "docker",
            Self::Http => "http",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a draft came from; decides which classification path applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodOrigin {
    /// Structured server configuration embedded in documentation.
    ConfigBlock,
    /// Anything produced by the candidate proposer.
    Proposer,
    /// Synthesized from the known-remote registry.
    KnownRemote,
}

/// The proposer's own opinion about a method. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OracleVerdict {
    pub is_valid: Option<bool>,
    pub score: Option<u8>,
    pub issues: Option<String>,
}

/// A partially-populated method as extracted from evidence.
///
/// Drafts are never persisted; `infer::normalize` turns them into a [`Method`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDraft {
    pub origin: MethodOrigin,
    pub name: Option<String>,
    pub command: Option<String>,
    pub method_type: Option<MethodType>,
    pub registry: Option<Registry>,
    pub package: Option<String>,
    pub parameters: Vec<String>,
    pub env_vars: BTreeMap<String, String>,
    /// Raw `env` block from a configuration entry, used for placeholder detection.
    pub env: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub deployment_score: Option<u8>,
    pub description: Option<String>,
    pub verdict: Option<OracleVerdict>,
}

impl MethodDraft {
    pub fn new(origin: MethodOrigin) -> Self {
        Self {
            origin,
            name: None,
            command: None,
            method_type: None,
            registry: None,
            package: None,
            parameters: Vec::new(),
            env_vars: BTreeMap::new(),
            env: BTreeMap::new(),
            headers: BTreeMap::new(),
            deployment_score: None,
            description: None,
            verdict: None,
        }
    }

    pub fn with_command(origin: MethodOrigin, command: impl Into<String>) -> Self {
        let mut d = Self::new(origin);
        d.command = Some(command.into());
        d
    }

    /// Command text with surrounding whitespace removed (empty when absent).
    pub fn command_str(&self) -> &str {
        self.command.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Canonical, fully-populated invocation method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub command: String,
    #[serde(rename = "type")]
    pub method_type: MethodType,
    pub registry: Registry,
    pub runtime: Runtime,
    pub package: String,
    pub parameters: Vec<String>,
    pub env_vars: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    pub deployment_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip)]
    pub origin: Option<MethodOrigin>,
}

impl Method {
    /// Re-open a canonical method as a fully-specified draft.
    pub fn to_draft(&self) -> MethodDraft {
        MethodDraft {
            origin: self.origin.unwrap_or(MethodOrigin::Proposer),
            name: Some(self.name.clone()),
            command: Some(self.command.clone()),
            method_type: Some(self.method_type),
            registry: Some(self.registry),
            package: Some(self.package.clone()),
            parameters: self.parameters.clone(),
            env_vars: self.env_vars.clone(),
            env: BTreeMap::new(),
            headers: self.headers.clone().unwrap_or_default(),
            deployment_score: Some(self.deployment_score),
            description: self.description.clone(),
            verdict: None,
        }
    }

    /// Short label used in trail lines and logs.
    pub fn label(&self) -> String {
        let icon = match self.registry {
            Registry::Remote => "remote",
            Registry::Npm => "npm",
            Registry::Docker => "docker",
            Registry::Pypi => "pypi",
            Registry::Unknown => "other",
        };
        format!("[{}] {} ({})", icon, self.name, self.method_type)
    }
}
