//! Whitespace tokenizer that separates positional arguments, operational
//! flags, and user-configurable parameters.
//!
//! Tokenization is whitespace-only: quoted arguments containing spaces are
//! split like any other text.

use super::flags::{FlagKnowledge, ToolKind};

/// A configurable flag and its value, if it took one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigParam {
    pub flag: String,
    pub value: Option<String>,
}

impl ConfigParam {
    /// `--flag` or `--flag=value`.
    pub fn render(&self) -> String {
        match &self.value {
            Some(v) => format!("{}={}", self.flag, v),
            None => self.flag.clone(),
        }
    }
}

/// Result of walking one command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub tool: ToolKind,
    /// Every token in order, with `--flag=value` split into two entries.
    pub args: Vec<String>,
    /// Configurable parameters in first-seen order; a repeated flag keeps its
    /// first position and its last value.
    pub params: Vec<ConfigParam>,
}

impl ParsedCommand {
    pub fn parameter_strings(&self) -> Vec<String> {
        self.params.iter().map(ConfigParam::render).collect()
    }
}

fn record(params: &mut Vec<ConfigParam>, flag: &str, value: Option<String>) {
    if let Some(existing) = params.iter_mut().find(|p| p.flag == flag) {
        existing.value = value;
        return;
    }
    params.push(ConfigParam {
        flag: flag.to_string(),
        value,
    });
}

/// Parse `command` against the knowledge base without executing anything.
pub fn parse_command(command: &str, kb: &FlagKnowledge) -> ParsedCommand {
    let parts: Vec<&str> = command.split_whitespace().collect();
    let tool = ToolKind::detect(&parts);
    let mut args = Vec::with_capacity(parts.len());
    let mut params = Vec::new();

    let mut i = 0;
    while i < parts.len() {
        let part = parts[i];
        if !part.starts_with('-') || part == "-" {
            args.push(part.to_string());
            i += 1;
            continue;
        }

        if let Some((flag, value)) = part.split_once('=') {
            args.push(flag.to_string());
            args.push(value.to_string());
            if !kb.is_operational(tool, flag) {
                record(&mut params, flag, Some(value.to_string()));
            }
            i += 1;
            continue;
        }

        args.push(part.to_string());
        let next = parts.get(i + 1).filter(|n| !n.starts_with('-'));
        match next {
            Some(value) if kb.takes_value(tool, part) => {
                args.push(value.to_string());
                if !kb.is_operational(tool, part) {
                    record(&mut params, part, Some(value.to_string()));
                }
                i += 2;
            }
            // boolean, or a value flag with nothing to consume
            _ => {
                if !kb.is_operational(tool, part) {
                    record(&mut params, part, None);
                }
                i += 1;
            }
        }
    }

    ParsedCommand { tool, args, params }
}

/// Configurable parameters of `command` as `--flag` / `--flag=value` strings.
pub fn extract_parameters(command: &str, kb: &FlagKnowledge) -> Vec<String> {
    if command.trim().is_empty() {
        return Vec::new();
    }
    parse_command(command, kb).parameter_strings()
}
