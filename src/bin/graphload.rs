//! Graphload CLI — build graph bulk-import CSV files.
//!
//! Usage:
//!   graphload edge-list INPUT [--output-node-files T] [--output-edge-files T] [--sorted]
//!   graphload nel INPUT [--local-ids] [same output options]

use clap::{Args, Parser, Subcommand};
use graphload::reader::edgelist::{EdgeListMapper, EdgeListReader};
use graphload::reader::nel::{read_nel, NelMapper};
use graphload::{run_import, ImportConfig, ImportSummary};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "graphload",
    version,
    about = "Build deduplicated CSV import files for a graph database"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a simple edge-list file ('source dest label' per line)
    EdgeList {
        /// Input edge-list file
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Import a NEL multi-graph file (DBLP-style Paper/Keyword graphs)
    Nel {
        /// Input NEL file
        input: PathBuf,
        /// Treat vertex ids as local to their sub-graph (defaults to global)
        #[arg(long)]
        local_ids: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Node file template; one file is created per node type, replacing
    /// NODE_LABEL with the actual label
    #[arg(long, default_value = "nodes-NODE_LABEL.csv")]
    output_node_files: String,

    /// Relationship file template; one file is created per relationship
    /// type-triple, replacing EDGE_LABEL with the composite label
    #[arg(long, default_value = "edges-EDGE_LABEL.csv")]
    output_edge_files: String,

    /// Sort nodes and relationships before writing for byte-identical
    /// reruns. Expensive; intended for tests.
    #[arg(long)]
    sorted: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl OutputArgs {
    fn to_config(&self) -> ImportConfig {
        ImportConfig::new(&self.output_node_files, &self.output_edge_files)
            .with_sorted(self.sorted)
    }
}

fn print_summary(summary: &ImportSummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error: {}", e),
        }
        return;
    }
    println!(
        "Processed {} records ({} node merges, {} relationship merges)",
        summary.stats.records, summary.stats.node_merges, summary.stats.relationship_merges
    );
    for report in summary.node_files.iter().chain(&summary.relationship_files) {
        println!("  {}: {} rows", report.path.display(), report.rows);
    }
    println!("Completed in {:.1}s", summary.elapsed.as_secs_f64());
}

fn cmd_edge_list(input: &Path, output: &OutputArgs) -> i32 {
    let reader = match EdgeListReader::open(input) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("Error: cannot open '{}': {}", input.display(), e);
            return 1;
        }
    };
    match run_import(&EdgeListMapper, reader, &output.to_config()) {
        Ok(summary) => {
            print_summary(&summary, output.json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_nel(input: &Path, local_ids: bool, output: &OutputArgs) -> i32 {
    let graphs = match read_nel(input) {
        Ok(graphs) => graphs,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", input.display(), e);
            return 1;
        }
    };
    let mapper = NelMapper { local_ids };
    match run_import(&mapper, graphs.into_iter().map(Ok), &output.to_config()) {
        Ok(summary) => {
            print_summary(&summary, output.json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::EdgeList { input, output } => cmd_edge_list(&input, &output),
        Commands::Nel {
            input,
            local_ids,
            output,
        } => cmd_nel(&input, local_ids, &output),
    };
    std::process::exit(code);
}
