//! Prefix rewriting for identifiers and the references inside documents.

use regex::Captures;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::extract::ReferencePattern;

/// Separator placed between the prefix and the rest of an identifier.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Identifier transformation applied to every artifact in a clone run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub old_prefix: String,
    pub new_prefix: String,
    pub separator: String,
}

impl RewriteRule {
    pub fn new(old_prefix: impl Into<String>, new_prefix: impl Into<String>) -> Self {
        Self {
            old_prefix: old_prefix.into(),
            new_prefix: new_prefix.into(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

/// How references inside a document are located for rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplaceMode {
    /// Rewrite only marker-prefixed references whose identifier matches exactly.
    #[default]
    Anchored,
    /// Replace every substring occurrence of each identifier, in discovery order.
    Literal,
}

impl ReplaceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplaceMode::Anchored => "anchored",
            ReplaceMode::Literal => "literal",
        }
    }
}

/// Rename one identifier.
///
/// Strips `old_prefix` once if present, then one leading `separator` if the
/// remainder starts with it, then prepends `new_prefix + separator`. Not
/// idempotent: feeding the output back in prefixes it again.
pub fn rewrite_identifier(id: &str, rule: &RewriteRule) -> String {
    let without_prefix = id.strip_prefix(rule.old_prefix.as_str()).unwrap_or(id);
    let remainder = without_prefix
        .strip_prefix(rule.separator.as_str())
        .unwrap_or(without_prefix);

    format!("{}{}{}", rule.new_prefix, rule.separator, remainder)
}

/// Replace every occurrence of each referenced identifier with its renamed form.
///
/// Plain substring replacement applied in the order of `referenced_ids`; an id
/// that is a substring of another id or of unrelated text is replaced there too.
pub fn rewrite_references_in_document(
    document: &str,
    rule: &RewriteRule,
    referenced_ids: &[String],
) -> String {
    let mut rewritten = document.to_string();
    for id in referenced_ids {
        let renamed = rewrite_identifier(id, rule);
        rewritten = rewritten.replace(id.as_str(), &renamed);
    }
    rewritten
}

/// Rewrite only marker-prefixed references naming one of `referenced_ids`.
pub fn rewrite_anchored_references(
    document: &str,
    rule: &RewriteRule,
    referenced_ids: &[String],
    pattern: &ReferencePattern,
) -> String {
    if referenced_ids.is_empty() {
        return document.to_string();
    }

    let renames: HashMap<&str, String> = referenced_ids
        .iter()
        .map(|id| (id.as_str(), rewrite_identifier(id, rule)))
        .collect();

    pattern
        .anchored()
        .replace_all(document, |caps: &Captures| match renames.get(&caps[2]) {
            Some(renamed) => format!("{}{}", &caps[1], renamed),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Rewrite references using the selected strategy.
pub fn rewrite_references(
    document: &str,
    rule: &RewriteRule,
    referenced_ids: &[String],
    pattern: &ReferencePattern,
    mode: ReplaceMode,
) -> String {
    match mode {
        ReplaceMode::Anchored => {
            rewrite_anchored_references(document, rule, referenced_ids, pattern)
        }
        ReplaceMode::Literal => rewrite_references_in_document(document, rule, referenced_ids),
    }
}
