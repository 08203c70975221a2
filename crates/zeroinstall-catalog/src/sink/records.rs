//! Normalized rows derived from a decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::infer::policy::is_secret_name;
use crate::model::{Action, Decision, Method, MethodType, Registry, Runtime};

pub const DEFAULT_VERSION: &str = "latest";
const NOTHING_PERSISTABLE: &str = "No valid installation commands found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Active,
    Tombstone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentKind {
    Positional,
    Named,
    Url,
    Header,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentRecord {
    pub kind: ArgumentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVarRecord {
    pub name: String,
    pub description: String,
    pub is_required: bool,
    pub is_secret: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub registry: Registry,
    pub package: String,
    pub version: String,
    pub runtime: Runtime,
    pub transport: MethodType,
    pub command: String,
    pub env_vars: Vec<EnvVarRecord>,
    pub arguments: Vec<ArgumentRecord>,
}

/// Everything stored for one catalog entry; replaced wholesale on upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub entry_id: String,
    pub status: EntryStatus,
    /// Reason plus rendered trail, present on tombstones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub packages: Vec<PackageRecord>,
    pub validated_at: DateTime<Utc>,
}

fn positional(value: impl Into<String>, description: Option<String>) -> ArgumentRecord {
    ArgumentRecord {
        kind: ArgumentKind::Positional,
        name: None,
        value: value.into(),
        description,
    }
}

fn arguments_for(method: &Method) -> Vec<ArgumentRecord> {
    if method.method_type == MethodType::Http {
        let mut args = vec![ArgumentRecord {
            kind: ArgumentKind::Url,
            name: Some("endpoint".to_string()),
            value: method.command.clone(),
            description: Some("API endpoint URL".to_string()),
        }];
        for (name, value) in method.headers.iter().flatten() {
            args.push(ArgumentRecord {
                kind: ArgumentKind::Header,
                name: Some(name.clone()),
                value: value.clone(),
                description: Some(format!("HTTP header: {}", name)),
            });
        }
        return args;
    }

    if method.registry == Registry::Docker {
        let mut values: Vec<String> = ["run", "-i", "--rm"].iter().map(|s| s.to_string()).collect();
        for var in method.env_vars.keys() {
            values.push("-e".to_string());
            values.push(var.clone());
        }
        values.push(method.package.clone());
        return values
            .into_iter()
            .enumerate()
            .map(|(i, v)| positional(v, Some(format!("Docker argument {}", i + 1))))
            .collect();
    }

    method
        .parameters
        .iter()
        .map(|p| match p.split_once('=') {
            Some((name, value)) => ArgumentRecord {
                kind: ArgumentKind::Named,
                name: Some(name.to_string()),
                value: value.to_string(),
                description: None,
            },
            None => positional(p.clone(), None),
        })
        .collect()
}

impl PackageRecord {
    /// `None` for methods that cannot be executed later (no command, unknown registry).
    pub fn from_method(method: &Method) -> Option<Self> {
        let command = method.command.trim();
        if command.is_empty() || method.registry == Registry::Unknown {
            return None;
        }
        let env_vars = method
            .env_vars
            .iter()
            .map(|(name, description)| EnvVarRecord {
                name: name.clone(),
                description: description.clone(),
                is_required: true,
                is_secret: is_secret_name(name),
            })
            .collect();
        Some(Self {
            registry: method.registry,
            package: method.package.clone(),
            version: DEFAULT_VERSION.to_string(),
            runtime: method.runtime,
            transport: method.method_type,
            command: command.to_string(),
            env_vars,
            arguments: arguments_for(method),
        })
    }
}

fn tombstone_comment(reason: &str, decision: &Decision) -> String {
    if decision.trail.is_empty() {
        format!("AI Decision: {}", reason)
    } else {
        format!(
            "AI Decision: {}\n\nValidation Details:\n{}",
            reason,
            decision.trail.render()
        )
    }
}

impl EntryRecord {
    pub fn from_decision(entry_id: &str, decision: &Decision, validated_at: DateTime<Utc>) -> Self {
        let tombstone = |reason: &str| Self {
            entry_id: entry_id.to_string(),
            status: EntryStatus::Tombstone,
            comment: Some(tombstone_comment(reason, decision)),
            packages: Vec::new(),
            validated_at,
        };
        match decision.action {
            Action::Delete => tombstone(&decision.reason),
            Action::Keep => {
                let packages: Vec<PackageRecord> = decision
                    .methods
                    .iter()
                    .filter_map(PackageRecord::from_method)
                    .collect();
                if packages.is_empty() {
                    tracing::debug!("entry {}: nothing persistable, writing tombstone", entry_id);
                    return tombstone(NOTHING_PERSISTABLE);
                }
                Self {
                    entry_id: entry_id.to_string(),
                    status: EntryStatus::Active,
                    comment: None,
                    packages,
                    validated_at,
                }
            }
        }
    }
}
