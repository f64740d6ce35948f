//! Augments a neighbourhood graph (`.nbg`, DOT format) with the physical
//! layout of its CASUs, so `neato` can draw topology and geometry together.

mod annotate;

use anyhow::{anyhow, ensure, Context, Result};
use clap::Parser;
use graphviz_rust::printer::{DotPrinter, PrinterContext};
use log::info;
use specs::{Arena, ProjectSpec};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "draw_casu_graph", version)]
struct Args {
    /// Project file (`.assisi`) naming the arena and nbg files.
    project: PathBuf,

    /// Scaling factor for the layout; 3.0 works well for a 9-CASU array.
    #[arg(short, long, default_value_t = 3.0)]
    scale_factor: f64,

    /// Where to write the annotated graph (default: `<nbg>.layout` next to the nbg file).
    #[arg(short, long)]
    outfile: Option<PathBuf>,

    /// Be verbose.
    #[arg(short, long, default_value_t = false)]
    verb: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verb { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    ensure!(
        args.scale_factor > 0.0,
        "scale factor must be positive, got {}",
        args.scale_factor
    );

    let project = ProjectSpec::load(&args.project)
        .context("Cannot annotate graph without both arena and nbg data")?;
    let outfile = args
        .outfile
        .clone()
        .unwrap_or_else(|| project.default_layout_path());

    let arena = Arena::load(&project.arena_path)?;
    let nodes = arena.flatten().context("Cannot flatten arena layers")?;
    info!("{} arena nodes from {}", nodes.len(), project.arena_path.display());

    let topology = std::fs::read_to_string(&project.nbg_path)
        .with_context(|| format!("Failed to read {}", project.nbg_path.display()))?;
    let mut graph = graphviz_rust::parse(&topology)
        .map_err(|e| anyhow!("Failed to parse {}: {}", project.nbg_path.display(), e))?;

    let annotated = annotate::annotate(&mut graph, &nodes, args.scale_factor);
    info!("Positioned {} topology nodes", annotated.len());
    for name in &annotated {
        log::debug!("  {}", name);
    }

    let dot = graph.print(&mut PrinterContext::default());
    std::fs::write(&outfile, dot)
        .with_context(|| format!("Failed to write {}", outfile.display()))?;

    println!("[I] render new graph with neato:");
    println!("neato -Tpdf -O {}", outfile.display());
    Ok(())
}
