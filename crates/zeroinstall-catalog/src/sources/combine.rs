//! Folding a document set into one bounded context string.

use super::DocumentSet;

pub const PRIORITY_DOCUMENT: &str = "README.md";
/// Per-document budget for everything except the README.
pub const MAX_DOCUMENT_CHARS: usize = 5_000;
/// Budget for the text handed to the candidate proposer.
pub const MAX_PROPOSER_CONTEXT_CHARS: usize = 50_000;

/// First `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// README first and untruncated, then the rest in name order, each under a
/// `=== name ===` header.
pub fn combine_documentation(docs: &DocumentSet) -> String {
    let mut combined = String::new();
    if let Some(readme) = docs.get(PRIORITY_DOCUMENT) {
        combined.push_str(&format!("\n=== {} ===\n{}\n", PRIORITY_DOCUMENT, readme));
    }
    for (name, content) in docs {
        if name == PRIORITY_DOCUMENT {
            continue;
        }
        combined.push_str(&format!(
            "\n=== {} ===\n{}\n",
            name,
            truncate_chars(content, MAX_DOCUMENT_CHARS)
        ));
    }
    combined
}
