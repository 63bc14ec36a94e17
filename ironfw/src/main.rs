//! # ironfw
//!
//! Command-line front end: inspect a schema directory, audit its references
//! and generate codec sources for a root fragment.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ironfw::prelude::*;
use ironfw::schema::NodePath;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ironfw")]
#[command(about = "Fixed-width host record codec generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory containing the XML schema documents
    dir: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print loaded roots and the identifier count
    Summary,

    /// Dump the node registered under an identifier as JSON
    Dump {
        /// Registry identifier
        id: String,
    },

    /// Report unresolved references and overridden identifiers
    Check,

    /// Generate Rust codec sources for a root fragment
    Generate {
        /// Root identifier
        root: String,

        /// Write one module per type into this directory instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Omit `// Source:` provenance comments
        #[arg(long)]
        no_source_comments: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let report = load_dir(&cli.dir)
        .with_context(|| format!("cannot read schema directory {}", cli.dir.display()))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Summary => summary(&report, &mut out),
        Commands::Dump { id } => dump(&report.registry, &id, &mut out),
        Commands::Check => check(&report, &mut out),
        Commands::Generate {
            root,
            out: dir,
            no_source_comments,
        } => {
            let config = GeneratorConfig::new().with_source_comments(!no_source_comments);
            generate(&report.registry, &root, config, dir.as_deref(), &mut out)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn summary(report: &LoadReport, out: &mut impl Write) -> anyhow::Result<()> {
    let registry = &report.registry;
    writeln!(out, "documents: {}", report.loaded.len())?;
    writeln!(out, "roots: {}", registry.roots().len())?;
    writeln!(out, "identifiers: {}", registry.len())?;
    for root in registry.roots() {
        writeln!(
            out,
            "  <{}> id={} children={} ({})",
            root.tag_name,
            root.id.as_deref().unwrap_or("-"),
            root.children.len(),
            root.provenance
        )?;
    }
    for (path, error) in &report.failures {
        writeln!(out, "failed: {}: {error}", path.display())?;
    }
    Ok(())
}

fn dump(registry: &Registry, id: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let Some(node) = registry.lookup(id) else {
        bail!("identifier '{id}' not found");
    };
    writeln!(out, "{}", node.to_json_pretty())?;
    Ok(())
}

fn check(report: &LoadReport, out: &mut impl Write) -> anyhow::Result<()> {
    let audit = audit_references(&report.registry);
    writeln!(out, "references: {}", audit.references)?;

    for dangling in &audit.dangling {
        writeln!(
            out,
            "{}: unresolved reference '{}'",
            dangling.provenance, dangling.reference
        )?;
    }
    for overridden in &audit.overrides {
        let location = |path: &NodePath| {
            report
                .registry
                .resolve(path)
                .map_or_else(|| "?".to_string(), |node| node.provenance.to_string())
        };
        writeln!(
            out,
            "identifier '{}' defined at {} is overridden by {}",
            overridden.id,
            location(&overridden.replaced),
            location(&overridden.replacement)
        )?;
    }
    for (path, error) in &report.failures {
        writeln!(out, "failed: {}: {error}", path.display())?;
    }

    if !audit.is_clean() || report.has_failures() {
        bail!(
            "{} unresolved reference(s), {} overridden identifier(s), {} failed document(s)",
            audit.dangling.len(),
            audit.overrides.len(),
            report.failures.len()
        );
    }
    writeln!(out, "ok")?;
    Ok(())
}

fn generate(
    registry: &Registry,
    root: &str,
    config: GeneratorConfig,
    dir: Option<&Path>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let table = compile(registry, root);
    if table.root().is_none() {
        bail!("root '{root}' not found");
    }
    for diagnostic in table.diagnostics() {
        warn!("{diagnostic}");
    }

    let generator = Generator::with_config(&table, config);
    match dir {
        Some(dir) => {
            let written = generator.write_to_dir(dir)?;
            for path in &written {
                writeln!(out, "{}", path.display())?;
            }
            info!(root, files = written.len(), "generation complete");
        }
        None => out.write_all(generator.generate().as_bytes())?,
    }
    Ok(())
}
