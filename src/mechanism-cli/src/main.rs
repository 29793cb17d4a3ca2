// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use mechanism_engine::{
    DrugTarget, GraphModel, LayoutConfig, LayoutResult, LoopInvolvement, PathwayConfig,
    PathwayResult, PathwayStats, analyze_loop_involvement, compute_layout, compute_pathway,
    get_pathway_stats,
};

/// Layout and pathway generation for mechanistic causal networks.
#[derive(Parser, Debug)]
#[command(name = "mechanism", version, about)]
struct Cli {
    /// Log decisions made while laying out and tracing (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute node positions and back edges, and write them as JSON
    Layout {
        /// Dataset JSON file
        dataset: PathBuf,

        /// Only lay out these modules (comma separated)
        #[arg(long, value_delimiter = ',')]
        modules: Vec<String>,

        /// JSON file overriding layout settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Where to write the result (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Trace the pathway around drug targets and classify touched loops
    Pathway {
        /// Dataset JSON file
        dataset: PathBuf,

        /// Target as NODE:EFFECT[:STRENGTH], e.g. bace1:inhibits:strong
        #[arg(short, long = "target", required = true)]
        targets: Vec<DrugTarget>,

        /// Maximum hops upstream and downstream
        #[arg(short, long, default_value_t = 3)]
        depth: usize,

        /// Where to write the result (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathwayReport {
    pathway: PathwayResult,
    loop_involvements: Vec<LoopInvolvement>,
    stats: PathwayStats,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_model(path: &Path) -> Result<GraphModel> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    GraphModel::from_json(&json).with_context(|| format!("invalid dataset {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read layout config {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("invalid layout config {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn run_layout(
    model: &GraphModel,
    modules: &[String],
    config: &LayoutConfig,
) -> Result<LayoutResult> {
    let selected: BTreeSet<String> = modules.iter().cloned().collect();
    for module in &selected {
        if !model.modules().iter().any(|m| &m.id == module) {
            anyhow::bail!("unknown module '{module}'");
        }
    }

    let view = model.filtered_view(&selected);
    tracing::info!(
        nodes = view.nodes.len(),
        edges = view.edges.len(),
        pseudo_nodes = view.pseudo_nodes.len(),
        "computing layout"
    );
    Ok(compute_layout(
        &view.nodes,
        &view.edges,
        Some(view.pseudo_nodes.as_slice()),
        Some(&view.excluded_edge_ids),
        config,
    ))
}

fn run_pathway(model: &GraphModel, targets: &[DrugTarget], depth: usize) -> PathwayReport {
    for target in targets {
        if model.node(&target.node_id).is_none() {
            tracing::warn!(node = %target.node_id, "target is not a node in this dataset");
        }
    }

    let adjacency = model.adjacency();
    let pathway = compute_pathway(targets, &adjacency, model.nodes(), depth);
    let loop_involvements =
        analyze_loop_involvement(targets, &pathway, model.feedback_loops(), model.edges());
    let stats = get_pathway_stats(&PathwayConfig::from_analysis(&pathway, &loop_involvements));

    PathwayReport {
        pathway,
        loop_involvements,
        stats,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Layout {
            dataset,
            modules,
            config,
            output,
        } => {
            let model = load_model(&dataset)?;
            let config = load_config(config.as_deref())?;
            let result = run_layout(&model, &modules, &config)?;
            write_json(&result, output.as_deref())
        }
        Command::Pathway {
            dataset,
            targets,
            depth,
            output,
        } => {
            let model = load_model(&dataset)?;
            let report = run_pathway(&model, &targets, depth);
            write_json(&report, output.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const FIXTURE: &str = "../../test/networks/amyloid_cascade.json";

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pathway_targets() {
        let cli = Cli::try_parse_from([
            "mechanism",
            "pathway",
            "data.json",
            "--target",
            "bace1:inhibits:strong",
            "-t",
            "il1b:activates",
            "--depth",
            "2",
        ])
        .unwrap();
        match cli.command {
            Command::Pathway { targets, depth, .. } => {
                assert_eq!(targets.len(), 2);
                assert_eq!(targets[0].node_id, "bace1");
                assert_eq!(targets[1].node_id, "il1b");
                assert_eq!(depth, 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bad_target_rejected() {
        let parsed = Cli::try_parse_from(["mechanism", "pathway", "data.json", "-t", "bace1:melts"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_layout_modules() {
        let cli =
            Cli::try_parse_from(["mechanism", "-v", "layout", "data.json", "--modules", "M01,M03"])
                .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Layout { modules, .. } => assert_eq!(modules, vec!["M01", "M03"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_layout_writes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("layout.json");
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"maxRowWidth": 600}"#).unwrap();

        let model = load_model(Path::new(FIXTURE)).unwrap();
        let config = load_config(Some(config_path.as_path())).unwrap();
        let result = run_layout(&model, &[], &config).unwrap();
        write_json(&result, Some(output.as_path())).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["positions"].as_object().unwrap().len(), 9);
        assert!(written["backEdges"].as_array().unwrap().len() >= 2);
    }

    #[test]
    fn test_layout_unknown_module() {
        let model = load_model(Path::new(FIXTURE)).unwrap();
        let err = run_layout(&model, &["M99".to_owned()], &LayoutConfig::default()).unwrap_err();
        assert!(err.to_string().contains("M99"));
    }

    #[test]
    fn test_pathway_report() {
        let model = load_model(Path::new(FIXTURE)).unwrap();
        let targets: Vec<DrugTarget> = vec!["bace1:inhibits".parse().unwrap()];
        let report = run_pathway(&model, &targets, 5);

        assert_eq!(report.stats.total_nodes, 8);
        assert_eq!(report.stats.loops_breaking, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["loopInvolvements"][0]["involvement"], "breaks");
        assert_eq!(json["stats"]["targetCount"], 1);
    }

    #[test]
    fn test_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read dataset"));
    }
}
