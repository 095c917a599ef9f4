//! Worklist-driven traversal of the reference graph.
//!
//! Starting from the root identifier, each document is read, scanned for
//! references, renamed, rewritten and written to the target store. Newly
//! referenced identifiers are appended to the worklist and processed in
//! breadth-first order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::extract::{scan_references, CloneWarning, ReferencePattern, DEFAULT_MARKER};
use super::rewrite::{rewrite_identifier, rewrite_references, ReplaceMode, RewriteRule};
use crate::error::{Error, Result};
use crate::store::ArtifactStore;
use crate::utils::validation;

/// Upper bound on documents processed by a legacy traversal.
pub const DEFAULT_MAX_DOCUMENTS: usize = 10_000;

/// Whether identifiers already enqueued are enqueued again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalMode {
    /// Enqueue each identifier once per run. Cycles terminate.
    #[default]
    Deduplicated,
    /// Enqueue every reference found, re-processing shared artifacts.
    /// Bounded by `max_documents`.
    Legacy,
}

impl TraversalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraversalMode::Deduplicated => "deduplicated",
            TraversalMode::Legacy => "legacy",
        }
    }
}

/// Everything a clone run needs besides its stores.
#[derive(Debug, Clone)]
pub struct CloneOptions {
    pub rule: RewriteRule,
    pub marker: String,
    pub traversal: TraversalMode,
    pub replace: ReplaceMode,
    pub max_documents: usize,
}

impl CloneOptions {
    pub fn new(rule: RewriteRule) -> Self {
        Self {
            rule,
            marker: DEFAULT_MARKER.to_string(),
            traversal: TraversalMode::default(),
            replace: ReplaceMode::default(),
            max_documents: DEFAULT_MAX_DOCUMENTS,
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_traversal(mut self, traversal: TraversalMode) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn with_replace(mut self, replace: ReplaceMode) -> Self {
        self.replace = replace;
        self
    }

    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = max_documents;
        self
    }
}

/// Append-only queue with a cursor; items before the cursor are processed.
#[derive(Debug)]
pub struct Worklist {
    items: Vec<String>,
    cursor: usize,
    /// Present only when identifiers are enqueued once.
    enqueued: Option<HashSet<String>>,
}

impl Worklist {
    pub fn new(root: &str, mode: TraversalMode) -> Self {
        let enqueued = match mode {
            TraversalMode::Deduplicated => Some(HashSet::from([root.to_string()])),
            TraversalMode::Legacy => None,
        };

        Self {
            items: vec![root.to_string()],
            cursor: 0,
            enqueued,
        }
    }

    /// Take the next unprocessed identifier and advance the cursor.
    pub fn next_pending(&mut self) -> Option<String> {
        let id = self.items.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(id)
    }

    pub fn has_pending(&self) -> bool {
        self.cursor < self.items.len()
    }

    /// Append identifiers; returns how many were actually enqueued.
    pub fn extend(&mut self, ids: &[String]) -> usize {
        let before = self.items.len();
        match self.enqueued.as_mut() {
            Some(seen) => {
                for id in ids {
                    if seen.insert(id.clone()) {
                        self.items.push(id.clone());
                    }
                }
            }
            None => self.items.extend(ids.iter().cloned()),
        }
        self.items.len() - before
    }

    pub fn processed(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<String> {
        self.items
    }
}

/// One document written by a clone run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClonedDocument {
    pub id: String,
    pub new_id: String,
    /// Referenced identifiers, in discovery order.
    pub references: Vec<String>,
    /// How many of those references were newly enqueued.
    pub enqueued: usize,
    /// Whether the source document was copied to the backup store.
    pub backup: bool,
}

/// Outcome of a successful clone run.
#[derive(Debug, Clone, Serialize)]
pub struct CloneReport {
    pub root: String,
    pub new_root: String,
    pub rule: RewriteRule,
    pub traversal: TraversalMode,
    pub replace: ReplaceMode,
    /// Every identifier ever enqueued, in order.
    pub discovered: Vec<String>,
    pub documents: Vec<ClonedDocument>,
    pub warnings: Vec<CloneWarning>,
}

/// Drives one clone run from a source store into a target store.
pub struct Cloner<'a> {
    source: &'a dyn ArtifactStore,
    target: &'a dyn ArtifactStore,
    backup: Option<&'a dyn ArtifactStore>,
    options: CloneOptions,
    pattern: ReferencePattern,
}

impl<'a> Cloner<'a> {
    pub fn new(
        source: &'a dyn ArtifactStore,
        target: &'a dyn ArtifactStore,
        options: CloneOptions,
    ) -> Result<Self> {
        let pattern = ReferencePattern::new(&options.marker)?;

        Ok(Self {
            source,
            target,
            backup: None,
            options,
            pattern,
        })
    }

    /// Copy every source document, unchanged, into `backup` before rewriting it.
    pub fn with_backup(mut self, backup: &'a dyn ArtifactStore) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn options(&self) -> &CloneOptions {
        &self.options
    }

    /// Clone the graph reachable from `root`.
    ///
    /// Stops at the first read or write failure; documents already written
    /// stay in the target store.
    pub fn run(&self, root: &str) -> Result<CloneReport> {
        let root = validation::require_identifier(root, "dashboard")?;
        let rule = &self.options.rule;
        // Referenced names are restricted by the pattern; only the prefix and separator can break out.
        let new_root = rewrite_identifier(root, rule);
        validation::require_identifier(&new_root, "new_prefix")?;

        log_status!(
            "clone",
            "Cloning {} from {} into {} ({} -> {})",
            root,
            self.source.describe(),
            self.target.describe(),
            rule.old_prefix,
            rule.new_prefix
        );

        let mut worklist = Worklist::new(root, self.options.traversal);
        let mut documents = Vec::new();
        let mut warnings = Vec::new();

        while worklist.has_pending() {
            if self.options.traversal == TraversalMode::Legacy
                && worklist.processed() >= self.options.max_documents
            {
                return Err(Error::clone_traversal_limit(
                    root,
                    self.options.max_documents,
                    worklist.len(),
                ));
            }

            let Some(id) = worklist.next_pending() else {
                break;
            };

            let document = self.source.read(&id)?;

            if let Some(backup) = self.backup {
                backup.write(&id, &document)?;
            }

            let extraction = scan_references(&document, &id, &self.pattern);
            warnings.extend(extraction.warnings);
            let references = extraction.references;

            log_status!(
                "clone",
                "{} references [{}]",
                id,
                references.join(", ")
            );

            let enqueued = worklist.extend(&references);

            let new_id = rewrite_identifier(&id, rule);
            let rewritten = rewrite_references(
                &document,
                rule,
                &references,
                &self.pattern,
                self.options.replace,
            );

            self.target.write(&new_id, &rewritten)?;

            documents.push(ClonedDocument {
                id,
                new_id,
                references,
                enqueued,
                backup: self.backup.is_some(),
            });
        }

        let discovered = worklist.into_items();

        log_status!(
            "clone",
            "Done: {} documents written, {} identifiers discovered",
            documents.len(),
            discovered.len()
        );

        Ok(CloneReport {
            root: root.to_string(),
            new_root,
            rule: rule.clone(),
            traversal: self.options.traversal,
            replace: self.options.replace,
            discovered,
            documents,
            warnings,
        })
    }
}

/// Clone `root` from `source` into `target` without a backup stage.
pub fn run_clone(
    source: &dyn ArtifactStore,
    target: &dyn ArtifactStore,
    root: &str,
    options: CloneOptions,
) -> Result<CloneReport> {
    Cloner::new(source, target, options)?.run(root)
}
