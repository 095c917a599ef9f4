//! Dashboard cloning: copy a dashboard and every saved search it reaches
//! under a new naming prefix.
//!
//! - `extract` finds `savedsearch <name>` references in a document
//! - `rewrite` renames identifiers and the references that point at them
//! - `walker` drives the read → rewrite → write loop over the reference graph

mod extract;
mod rewrite;
mod walker;

pub use extract::{
    extract_references, parse_reference_match, scan_references, CloneWarning, Extraction,
    ReferencePattern, DEFAULT_MARKER,
};
pub use rewrite::{
    rewrite_anchored_references, rewrite_identifier, rewrite_references,
    rewrite_references_in_document, ReplaceMode, RewriteRule, DEFAULT_SEPARATOR,
};
pub use walker::{
    run_clone, CloneOptions, CloneReport, ClonedDocument, Cloner, TraversalMode, Worklist,
    DEFAULT_MAX_DOCUMENTS,
};
