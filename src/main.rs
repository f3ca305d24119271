//! Schemaboard
//!
//! Command-line front end over the schema graph and diagram engines.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use schemaboard_diagram::{DiagramSettings, RelationshipRouter, relationship_style};
use schemaboard_graph::{LoadReport, SchemaGraph, check_integrity, load_snapshot, save_snapshot};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "schemaboard", version, about = "Schema graph consistency and diagram geometry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a snapshot, report repairs and check integrity
    Check {
        /// Snapshot JSON file
        snapshot: PathBuf,

        /// Write the repaired snapshot back to the same file
        #[arg(long)]
        write: bool,
    },
    /// Print routed relationship lines as JSON
    Routes {
        /// Snapshot JSON file
        snapshot: PathBuf,

        /// Diagram settings TOML file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { snapshot, write } => check(&snapshot, write),
        Command::Routes { snapshot, config } => routes(&snapshot, config.as_deref()),
    }
}

fn load_graph(path: &Path) -> Result<(SchemaGraph, LoadReport)> {
    let snapshot = load_snapshot(path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    Ok(SchemaGraph::from_snapshot(snapshot))
}

fn check(path: &Path, write: bool) -> Result<()> {
    let (graph, repairs) = load_graph(path)?;

    println!(
        "{} {} tables, {} relationships",
        "Loaded".bold(),
        graph.table_count(),
        graph.relationship_count()
    );

    if repairs.is_clean() {
        println!("{} no repairs needed", "✓".green());
    } else {
        println!("{} {} repairs applied", "!".yellow(), repairs.len());
        for repair in &repairs.repairs {
            println!("  {} {}", "-".yellow(), repair);
        }
    }

    let report = check_integrity(&graph);
    if write {
        save_snapshot(&graph.to_snapshot(), path)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), "wrote repaired snapshot");
        println!("{} wrote {}", "✓".green(), path.display());
    }

    if report.is_clean() {
        println!("{} integrity check passed", "✓".green());
        return Ok(());
    }
    println!("{} {} integrity issues", "✗".red(), report.issues.len());
    for issue in &report.issues {
        println!("  {} {} {}", "-".red(), issue.code.as_str().dimmed(), issue);
    }
    report.to_result()?;
    Ok(())
}

fn routes(path: &Path, config: Option<&Path>) -> Result<()> {
    let settings = match config {
        Some(config) => DiagramSettings::load(config)
            .with_context(|| format!("failed to load settings {}", config.display()))?,
        None => DiagramSettings::default(),
    };
    let (graph, _) = load_graph(path)?;
    let router = RelationshipRouter::new(settings.layout);

    let lines: Vec<_> = router
        .route_all(&graph)
        .into_iter()
        .filter_map(|routed| {
            let relationship = graph.relationship(routed.relationship_id)?;
            Some(json!({
                "relationshipId": routed.relationship_id,
                "type": relationship.relation_type,
                "path": routed.path,
                "midpoint": routed.midpoint,
                "usedFallback": routed.used_fallback,
                "style": relationship_style(relationship.relation_type),
                "strokeWidth": settings.canvas.stroke_width,
                "markerSize": settings.canvas.marker_size,
            }))
        })
        .collect();

    let output = serde_json::to_string_pretty(&lines).context("failed to render routes")?;
    println!("{}", output);
    Ok(())
}
