/*!
 * NXFS - Main Entry Point
 *
 * Command line front-end:
 * - tree: print the virtual tree with classifications and size estimates
 * - cat: write one node's rendered content to stdout
 * - mount: serve the tree through FUSE (feature `fuse`)
 */

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use nxfs::{init_tracing, MemorySource, NxFs, NxfsConfig, RuleDocument};

#[derive(Parser)]
#[command(name = "nxfs")]
#[command(about = "Browse a hierarchical data container as a read-only filesystem")]
struct Cli {
    /// Rules document (overrides NXFS_RULES)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the virtual tree
    Tree {
        /// Container description (JSON)
        source: PathBuf,
    },

    /// Write the rendered content of one node to stdout
    Cat {
        /// Container description (JSON)
        source: PathBuf,
        /// Virtual path, e.g. /entry/data.txt
        path: String,
    },

    /// Mount the virtual tree read-only
    Mount {
        /// Container description (JSON)
        source: PathBuf,
        /// Empty directory to mount on
        mountpoint: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).map_err(|e| {
        eprintln!("{}", usage());
        e
    })
}

fn usage() -> String {
    Cli::command().render_usage().to_string()
}

fn run(cli: Cli) -> Result<()> {
    let mut config = NxfsConfig::from_env();
    let explicit_rules = cli.rules.is_some() || std::env::var_os(nxfs::config::settings::ENV_RULES).is_some();
    if let Some(rules) = &cli.rules {
        config = config.with_rules(rules);
    }
    config.trace_json |= cli.json_logs;
    init_tracing(config.trace_json);

    let document = load_rules(&config.rules_path, explicit_rules)?;

    match cli.command {
        Command::Tree { source } => {
            let fs = open(config.with_source(source), &document)?;
            print_tree(&fs)
        }
        Command::Cat { source, path } => {
            let fs = open(config.with_source(source), &document)?;
            let content = fs
                .read(&path)
                .with_context(|| format!("cannot read {}", path))?;
            std::io::stdout().write_all(&content)?;
            Ok(())
        }
        Command::Mount { source, mountpoint } => {
            let config = config.with_source(source).with_mount_point(&mountpoint);
            let fs = open(config, &document)?;
            mount(fs, &mountpoint)
        }
    }
}

/// Rules from `path`; a missing default document falls back to no rules
fn load_rules(path: &Path, explicit: bool) -> Result<RuleDocument> {
    if !explicit && !path.exists() {
        warn!(rules = %path.display(), "No rules document, using built-in rules only");
        return Ok(RuleDocument::empty());
    }
    RuleDocument::from_file(path)
        .with_context(|| format!("cannot load rules document {}", path.display()))
}

fn open(config: NxfsConfig, document: &RuleDocument) -> Result<NxFs> {
    let source_path = config
        .source_path
        .clone()
        .context("no source container given")?;
    let source = MemorySource::from_file(&source_path)
        .with_context(|| format!("cannot open source {}", source_path.display()))?;
    let fs = NxFs::from_config(&config, Box::new(source), document)
        .context("cannot build virtual tree")?;
    info!(source = %source_path.display(), nodes = fs.tree().len(), "Virtual tree ready");
    Ok(fs)
}

fn print_tree(fs: &NxFs) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for node in fs.tree().walk() {
        let (depth, name) = if node.name.is_empty() {
            (0, "/")
        } else {
            (node.full_path.matches('/').count(), node.name.as_str())
        };
        let rule = node.rule.as_ref().map_or("-", |rule| rule.kind_name());
        writeln!(
            out,
            "{:indent$}{} [{} {}] {}",
            "",
            name,
            node.object_type(),
            rule,
            node.estimated_size,
            indent = depth * 2
        )?;
    }
    Ok(())
}

#[cfg(feature = "fuse")]
fn mount(fs: NxFs, mountpoint: &Path) -> Result<()> {
    nxfs::fuse::mount(std::sync::Arc::new(fs), mountpoint)
        .with_context(|| format!("cannot mount on {}", mountpoint.display()))
}

#[cfg(not(feature = "fuse"))]
fn mount(_fs: NxFs, _mountpoint: &Path) -> Result<()> {
    anyhow::bail!("nxfs was built without the `fuse` feature")
}
