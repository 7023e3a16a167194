//! lintrace CLI: simulate ground-truth lineage trees and score reconstructions.
//!
//! Commands:
//!   lintrace simulate <config.json> <out.json>                  simulate a true tree
//!   lintrace score <true.json> <reconstructed> [config.json]    triplet score
//!   lintrace matrix <tree.json>                                 print the character matrix
//!   lintrace newick <tree.json>                                 print the tree as Newick

use lintrace::config::BenchmarkConfig;
use lintrace::error::{LineageError, Result};
use lintrace::io::json::{read_tree_file, write_tree_file};
use lintrace::model::LineageTree;
use lintrace::newick::{self, NewickStyle};
use lintrace::scoring::TripletScorer;
use log::{error, info};
use std::env;
use std::path::Path;
use std::process::ExitCode;

fn print_usage() {
    println!(
        r#"
Usage: lintrace <command> [options]

Commands:
  simulate <config.json> <out.json>                 Simulate a true tree and save it as JSON
  score    <true.json> <reconstructed> [config.json] Score a reconstruction (.json or Newick)
  matrix   <tree.json>                              Print the leaf character matrix (TSV)
  newick   <tree.json>                              Print the tree as a Newick string

Set RUST_LOG=debug for per-depth details.
"#
    );
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let result = match args[1].as_str() {
        "simulate" => cmd_simulate(&args[2..]),
        "score" => cmd_score(&args[2..]),
        "matrix" => cmd_matrix(&args[2..]),
        "newick" => cmd_newick(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_simulate(args: &[String]) -> Result<()> {
    if args.len() < 2 {
        eprintln!("Usage: lintrace simulate <config.json> <out.json>");
        return Err(LineageError::config("missing arguments"));
    }

    let config = BenchmarkConfig::from_file(&args[0])?;
    let mut rng = config.rng();
    let simulator = config.build_simulator(&mut rng)?;
    let tree = simulator.generate_simulated_full_tree(&mut rng)?;

    write_tree_file(&args[1], &tree)?;
    info!(
        "Saved tree with {} leaves (mean leaf depth {:.2}) to {}",
        tree.num_leaves(),
        tree.mean_leaf_depth(),
        args[1]
    );
    Ok(())
}

fn cmd_score(args: &[String]) -> Result<()> {
    if args.len() < 2 {
        eprintln!("Usage: lintrace score <true.json> <reconstructed.{{json|nwk}}> [config.json]");
        return Err(LineageError::config("missing arguments"));
    }

    let config = match args.get(2) {
        Some(path) => BenchmarkConfig::from_file(path)?,
        None => BenchmarkConfig::default(),
    };
    let true_tree = read_tree_file(&args[0])?;
    let reconstructed = read_any_tree(&args[1])?;

    let scorer = TripletScorer::new(config.scoring)?;
    let score = scorer.score(&true_tree, &reconstructed, &mut config.rng())?;
    print!("{score}");
    Ok(())
}

fn cmd_matrix(args: &[String]) -> Result<()> {
    let Some(path) = args.first() else {
        eprintln!("Usage: lintrace matrix <tree.json>");
        return Err(LineageError::config("missing arguments"));
    };
    print!("{}", read_tree_file(path)?.character_matrix());
    Ok(())
}

fn cmd_newick(args: &[String]) -> Result<()> {
    let Some(path) = args.first() else {
        eprintln!("Usage: lintrace newick <tree.json>");
        return Err(LineageError::config("missing arguments"));
    };
    println!("{}", newick::to_newick(&read_tree_file(path)?, NewickStyle::Sample));
    Ok(())
}

/// Reads a tree from JSON (`.json`) or else from the first tree of a Newick file.
fn read_any_tree(path: &str) -> Result<LineageTree> {
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return read_tree_file(path);
    }

    newick::parse_file(path)?
        .into_iter()
        .next()
        .ok_or_else(|| LineageError::InvalidTree(format!("no tree in {path}")))
}
