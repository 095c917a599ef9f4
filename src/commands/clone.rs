use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dashclone::backup;
use dashclone::clone::{CloneOptions, CloneReport, Cloner, ReplaceMode, RewriteRule, TraversalMode};
use dashclone::defaults::{self, Defaults};
use dashclone::http::RemoteStore;
use dashclone::io;
use dashclone::validation;
use dashclone::{ArtifactStore, LocalStore, MemoryStore};

use super::CmdResult;

#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Name of the dashboard to clone from
    #[arg(short, long)]
    pub dashboard: String,

    /// Prefix of the current dashboard and its saved searches
    #[arg(short = 'r', long = "old-prefix", default_value = "")]
    pub old_prefix: String,

    /// Prefix for the cloned dashboard and saved searches (e.g. a feature ID)
    #[arg(short = 'f', long = "new-prefix")]
    pub new_prefix: String,

    /// Separator between prefix and name (default from config, "_")
    #[arg(long)]
    pub separator: Option<String>,

    /// Marker token that introduces a saved search reference
    #[arg(long)]
    pub marker: Option<String>,

    /// Directory containing the source artifacts
    #[arg(long, conflicts_with = "source_url")]
    pub source_dir: Option<String>,

    /// Base URL to fetch source artifacts from
    #[arg(long)]
    pub source_url: Option<String>,

    /// Directory receiving the cloned artifacts
    #[arg(long, conflicts_with = "target_url")]
    pub target_dir: Option<String>,

    /// Base URL to publish cloned artifacts to
    #[arg(long)]
    pub target_url: Option<String>,

    /// Parent directory for the timestamped backup of source artifacts
    #[arg(long)]
    pub backup_dir: Option<String>,

    /// Skip backing up source artifacts
    #[arg(long)]
    pub no_backup: bool,

    /// Replace artifacts that already exist in the target directory
    #[arg(long)]
    pub overwrite: bool,

    /// Re-process artifacts each time they are referenced (no global dedup); implies --overwrite
    #[arg(long)]
    pub legacy_traversal: bool,

    /// Rewrite references by plain substring replacement instead of marker-anchored
    #[arg(long)]
    pub literal_replace: bool,

    /// Maximum documents a legacy traversal may process
    #[arg(long)]
    pub max_documents: Option<usize>,

    /// Compute the clone without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
pub struct CloneOutput {
    command: String,
    source: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    backup_dir: Option<String>,
    dry_run: bool,
    report: CloneReport,
    /// Rewritten documents by new identifier (dry run only).
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<BTreeMap<String, String>>,
}

pub fn run(args: CloneArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<CloneOutput> {
    let defaults = defaults::load_defaults()?;
    execute(&args, &defaults)
}

fn execute(args: &CloneArgs, defaults: &Defaults) -> CmdResult<CloneOutput> {
    let dashboard = validation::require_identifier(&args.dashboard, "dashboard")?.to_string();
    let new_prefix =
        validation::require_non_empty(&args.new_prefix, "new_prefix", "New prefix cannot be empty")?;

    let options = build_options(args, defaults, new_prefix)?;
    let source = open_source(args, defaults)?;

    if args.dry_run {
        let target = MemoryStore::new();
        let report = Cloner::new(source.as_ref(), &target, options)?.run(&dashboard)?;

        return Ok((
            CloneOutput {
                command: "clone".to_string(),
                source: source.describe(),
                target: target.describe(),
                backup_dir: None,
                dry_run: true,
                report,
                preview: Some(target.into_documents()),
            },
            0,
        ));
    }

    let target = open_target(args, defaults, options.traversal)?;
    let cloner = Cloner::new(source.as_ref(), target.as_ref(), options)?;

    // Only create the timestamped directory once the options are known to be usable.
    let backup_store = if args.no_backup || !defaults.backup {
        None
    } else {
        let root = args.backup_dir.as_deref().unwrap_or(&defaults.backup_dir);
        Some(backup::backup_store(Path::new(root))?)
    };

    let cloner = match backup_store.as_ref() {
        Some(store) => cloner.with_backup(store),
        None => cloner,
    };

    let report = cloner.run(&dashboard)?;

    Ok((
        CloneOutput {
            command: "clone".to_string(),
            source: source.describe(),
            target: target.describe(),
            backup_dir: backup_store.map(|s| s.root().display().to_string()),
            dry_run: false,
            report,
            preview: None,
        },
        0,
    ))
}

fn build_options(args: &CloneArgs, defaults: &Defaults, new_prefix: &str) -> dashclone::Result<CloneOptions> {
    let separator = args
        .separator
        .clone()
        .unwrap_or_else(|| defaults.prefix_separator.clone());

    let traversal = if args.legacy_traversal {
        TraversalMode::Legacy
    } else {
        defaults.traversal
    };

    let replace = if args.literal_replace {
        ReplaceMode::Literal
    } else {
        defaults.replace
    };

    let max_documents = args.max_documents.unwrap_or(defaults.max_documents);
    if max_documents == 0 {
        return Err(dashclone::Error::validation_invalid_argument(
            "max_documents",
            "Must be at least 1",
            None,
        ));
    }

    let rule = RewriteRule::new(args.old_prefix.trim(), new_prefix).with_separator(separator);

    Ok(CloneOptions::new(rule)
        .with_marker(args.marker.clone().unwrap_or_else(|| defaults.reference_marker.clone()))
        .with_traversal(traversal)
        .with_replace(replace)
        .with_max_documents(max_documents))
}

fn open_source(args: &CloneArgs, defaults: &Defaults) -> dashclone::Result<Box<dyn ArtifactStore>> {
    if let Some(url) = args.source_url.as_deref() {
        return Ok(Box::new(RemoteStore::new(url)?));
    }
    if let Some(dir) = args.source_dir.as_deref() {
        return Ok(Box::new(LocalStore::new(dir)));
    }
    if let Some(url) = defaults.remote_url.as_deref() {
        return Ok(Box::new(RemoteStore::new(url)?));
    }
    Ok(Box::new(LocalStore::new(&defaults.source_dir)))
}

/// Legacy traversal writes shared artifacts once per visit, so it always needs overwrite.
fn open_target(
    args: &CloneArgs,
    defaults: &Defaults,
    traversal: TraversalMode,
) -> dashclone::Result<Box<dyn ArtifactStore>> {
    if let Some(url) = args.target_url.as_deref() {
        return Ok(Box::new(RemoteStore::new(url)?));
    }

    let dir = PathBuf::from(args.target_dir.as_deref().unwrap_or(&defaults.work_dir));
    io::ensure_dir(&dir, "create target directory")?;

    Ok(Box::new(
        LocalStore::new(dir).with_overwrite(
            args.overwrite || defaults.overwrite || traversal == TraversalMode::Legacy,
        ),
    ))
}
