//! Reference extraction: find the saved searches a document depends on.
//!
//! A reference is the marker token (`savedsearch` by default), one whitespace
//! run, then an identifier made of lowercase letters, digits, `_` and `-`.

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

/// Marker token used by Splunk XML to pull in a saved search.
pub const DEFAULT_MARKER: &str = "savedsearch";

const IDENTIFIER_CLASS: &str = "[a-z0-9_-]+";

/// A non-fatal problem found while scanning a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloneWarning {
    /// Warning category.
    pub kind: String,
    /// Identifier of the document being scanned.
    pub id: String,
    /// Human-readable description.
    pub message: String,
}

/// Compiled reference pattern for one marker token.
#[derive(Debug, Clone)]
pub struct ReferencePattern {
    marker: String,
    /// Whole reference, used for extraction.
    reference: Regex,
    /// Same reference with (marker + whitespace, identifier) groups, used for anchored rewriting.
    anchored: Regex,
}

impl ReferencePattern {
    pub fn new(marker: &str) -> Result<Self> {
        if marker.trim().is_empty() {
            return Err(Error::config_invalid_value(
                "reference_marker",
                Some(marker.to_string()),
                "Reference marker cannot be empty",
            ));
        }

        let escaped = regex::escape(marker);
        let reference = compile(&format!(r"{}\s+{}", escaped, IDENTIFIER_CLASS))?;
        let anchored = compile(&format!(r"({}\s+)({})", escaped, IDENTIFIER_CLASS))?;

        Ok(Self {
            marker: marker.to_string(),
            reference,
            anchored,
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub(crate) fn anchored(&self) -> &Regex {
        &self.anchored
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        Error::internal_unexpected(format!("Invalid reference pattern '{}': {}", pattern, e))
    })
}

/// Result of scanning one document.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Referenced identifiers, first-seen order, no duplicates.
    pub references: Vec<String>,
    pub warnings: Vec<CloneWarning>,
}

/// Split a matched reference into its identifier.
///
/// Returns `None` when the marker is missing or nothing follows it.
pub fn parse_reference_match(matched: &str, marker: &str) -> Option<String> {
    let (_, after) = matched.split_once(marker)?;
    let id = after.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Scan `document` for references, collecting malformed matches as warnings.
///
/// `context_id` names the document being scanned and is only used for
/// reporting. A document that references itself is returned as-is.
pub fn scan_references(document: &str, context_id: &str, pattern: &ReferencePattern) -> Extraction {
    let mut extraction = Extraction::default();

    for found in pattern.reference.find_iter(document) {
        // Every match carries the marker and a name; this only fires if the regex and parser drift apart.
        let Some(id) = parse_reference_match(found.as_str(), &pattern.marker) else {
            log_status!(
                "clone",
                "Skipping malformed reference '{}' in {}",
                found.as_str(),
                context_id
            );
            extraction.warnings.push(CloneWarning {
                kind: "malformed_reference".to_string(),
                id: context_id.to_string(),
                message: format!("Could not parse reference name from '{}'", found.as_str()),
            });
            continue;
        };

        if extraction.references.contains(&id) {
            continue;
        }

        extraction.references.push(id);
    }

    extraction
}

/// Referenced identifiers of `document`, first-seen order, duplicates removed.
pub fn extract_references(document: &str, context_id: &str, pattern: &ReferencePattern) -> Vec<String> {
    scan_references(document, context_id, pattern).references
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> ReferencePattern {
        ReferencePattern::new(DEFAULT_MARKER).unwrap()
    }

    #[test]
    fn leaf_document_has_no_references() {
        let doc = "<dashboard><label>Overview</label><query>index=main | stats count</query></dashboard>";
        assert!(extract_references(doc, "dash_root", &pattern()).is_empty());
    }

    #[test]
    fn extracts_in_first_seen_order() {
        let doc = "<query>| savedsearch prod_dashboard_name</query>\n\
                   <query>| savedsearch prod_report_1</query>\n\
                   <query>| savedsearch prodreport_2</query>";
        assert_eq!(
            extract_references(doc, "prod_dashboard", &pattern()),
            vec!["prod_dashboard_name", "prod_report_1", "prodreport_2"]
        );
    }

    #[test]
    fn duplicates_keep_first_position() {
        let doc = "savedsearch b_1 savedsearch a_1 savedsearch b_1 savedsearch a_1 savedsearch c";
        assert_eq!(
            extract_references(doc, "root", &pattern()),
            vec!["b_1", "a_1", "c"]
        );
    }

    #[test]
    fn identifier_stops_at_first_foreign_character() {
        let doc = "<query>savedsearch prod_x-1</query> savedsearch prod_y\" savedsearch prod_z";
        assert_eq!(
            extract_references(doc, "root", &pattern()),
            vec!["prod_x-1", "prod_y", "prod_z"]
        );
    }

    #[test]
    fn whitespace_run_between_marker_and_identifier() {
        let doc = "savedsearch\t  prod_tabbed\nsavedsearch\nprod_newline";
        assert_eq!(
            extract_references(doc, "root", &pattern()),
            vec!["prod_tabbed", "prod_newline"]
        );
    }

    #[test]
    fn marker_without_identifier_is_ignored() {
        let doc = "savedsearch | stats count\nsavedsearch UPPER\n<query>savedsearch</query>";
        assert!(extract_references(doc, "root", &pattern()).is_empty());
    }

    #[test]
    fn dedup_is_case_sensitive_exact_match() {
        let doc = "savedsearch report savedsearch report-a savedsearch report";
        assert_eq!(
            extract_references(doc, "root", &pattern()),
            vec!["report", "report-a"]
        );
    }

    #[test]
    fn self_reference_is_not_filtered() {
        let doc = "savedsearch prod_loop";
        assert_eq!(extract_references(doc, "prod_loop", &pattern()), vec!["prod_loop"]);
    }

    #[test]
    fn custom_marker_is_escaped() {
        let pattern = ReferencePattern::new("ref.search").unwrap();
        let doc = "ref.search alpha refxsearch beta";
        assert_eq!(extract_references(doc, "root", &pattern), vec!["alpha"]);
    }

    #[test]
    fn empty_marker_is_rejected() {
        let err = ReferencePattern::new("  ").unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }

    #[test]
    fn parse_reference_match_trims_identifier() {
        assert_eq!(
            parse_reference_match("savedsearch   prod_a ", "savedsearch"),
            Some("prod_a".to_string())
        );
    }

    #[test]
    fn parse_reference_match_rejects_malformed() {
        assert_eq!(parse_reference_match("search prod_a", "savedsearch"), None);
        assert_eq!(parse_reference_match("savedsearch   ", "savedsearch"), None);
    }

    #[test]
    fn scan_reports_no_warnings_for_well_formed_document() {
        let extraction = scan_references("savedsearch a savedsearch b", "root", &pattern());
        assert_eq!(extraction.references, vec!["a", "b"]);
        assert!(extraction.warnings.is_empty());
    }
}
