//! CLI entry point for the knight solver.
//!
//! Usage:
//!   knight-solver solve <instance.json> [options]
//!   knight-solver solve --stdin [options]
//!   knight-solver solve --size 8 --start 4,2 --goal 2,6 --bishop 2,3
//!   knight-solver check <instance.json>
//!
//! `solve` runs one search variant and prints a JSON report; `check` runs
//! all three solvers on the same instance and reports whether they agree.
//! Exit codes: 0 reachable (or all solvers agree), 1 unreachable (or a
//! disagreement), 2 invalid input.

mod bidir;
mod board;
mod instance;
mod oracle;
mod search;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info};
use serde::Serialize;

use board::Square;
use instance::Instance;
use search::{SearchOptions, SearchReport};

#[derive(Parser)]
#[command(name = "knight-solver")]
#[command(about = "BFS solver for shortest knight paths under a bishop threat")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Default the log level to debug instead of info (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one instance with the chosen search variant
    Solve {
        #[command(flatten)]
        input: InstanceInput,

        /// Search variant to run
        #[arg(long, value_enum, default_value = "bidir")]
        algorithm: Algorithm,

        /// Log every newly visited square at debug level
        #[arg(long)]
        trace: bool,
    },

    /// Run all three solvers on one instance and compare their answers
    Check {
        #[command(flatten)]
        input: InstanceInput,
    },
}

/// One problem instance, either as a JSON document or spelled out in flags.
#[derive(Args)]
struct InstanceInput {
    /// Path to an instance JSON file (use --stdin to read from stdin)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Read the instance JSON from stdin instead of a file
    #[arg(long)]
    stdin: bool,

    /// Board side length (use with --start, --goal and --bishop)
    #[arg(long)]
    size: Option<i32>,

    /// Knight start square as x,y
    #[arg(long, value_parser = parse_square)]
    start: Option<Square>,

    /// Knight goal square as x,y
    #[arg(long, value_parser = parse_square)]
    goal: Option<Square>,

    /// Bishop square as x,y
    #[arg(long, value_parser = parse_square)]
    bishop: Option<Square>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// Unidirectional BFS over extended states
    Single,
    /// Bidirectional BFS, forward and backward frontiers
    Bidir,
    /// Decomposition-based reference oracle
    Oracle,
}

impl Algorithm {
    fn name(self) -> &'static str {
        match self {
            Algorithm::Single => "single",
            Algorithm::Bidir => "bidir",
            Algorithm::Oracle => "oracle",
        }
    }
}

fn parse_square(s: &str) -> Result<Square, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {:?}", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x coordinate: {}", e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y coordinate: {}", e))?;
    Ok(Square::new(x, y))
}

/// JSON report of a `solve` run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visited: Option<usize>,
    time_elapsed_ms: u64,
    algorithm: &'static str,
}

/// JSON report of a `check` run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckOutput {
    agree: bool,
    single: Option<u32>,
    bidir: Option<u32>,
    oracle: Option<u32>,
    time_elapsed_ms: u64,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Solve {
            input,
            algorithm,
            trace,
        } => {
            let instance = load_instance(&input);
            let output = run_solve(&instance, algorithm, trace);

            println!("{}", serde_json::to_string_pretty(&output).unwrap());

            if output.reachable {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }

        Commands::Check { input } => {
            let instance = load_instance(&input);
            let output = run_check(&instance);

            println!("{}", serde_json::to_string_pretty(&output).unwrap());

            if output.agree {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
    }
}

/// Read, parse and validate the instance; exits with code 2 on any input
/// error so callers can tell bad input from an unreachable goal.
fn load_instance(input: &InstanceInput) -> Instance {
    let instance = match (input.size, input.start, input.goal, input.bishop) {
        (Some(size), Some(start), Some(goal), Some(bishop)) => {
            Instance::new(size, start, goal, bishop)
        }
        (None, None, None, None) => {
            let json_content = if input.stdin {
                let mut buffer = String::new();
                if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(2);
                }
                buffer
            } else if let Some(path) = &input.file {
                match fs::read_to_string(path) {
                    Ok(content) => content,
                    Err(e) => {
                        eprintln!("Error reading file {:?}: {}", path, e);
                        std::process::exit(2);
                    }
                }
            } else {
                eprintln!(
                    "Error: provide an instance file, --stdin, or all of \
                     --size/--start/--goal/--bishop"
                );
                std::process::exit(2);
            };

            match serde_json::from_str(&json_content) {
                Ok(instance) => instance,
                Err(e) => {
                    eprintln!("Error parsing instance JSON: {}", e);
                    std::process::exit(2);
                }
            }
        }
        _ => {
            eprintln!("Error: --size, --start, --goal and --bishop must be given together");
            std::process::exit(2);
        }
    };

    if let Err(e) = instance.validate() {
        eprintln!("Invalid instance: {}", e);
        std::process::exit(2);
    }
    instance
}

fn run_solve(instance: &Instance, algorithm: Algorithm, trace: bool) -> SolveOutput {
    info!(
        "{} search on a {}x{} board: start {} goal {} bishop {}",
        algorithm.name(),
        instance.size,
        instance.size,
        instance.start,
        instance.goal,
        instance.bishop
    );

    let mut trace_observer = |square: Square, count: usize| {
        debug!("visited {} ({} states)", square, count);
    };
    let mut options = SearchOptions::default();
    if trace {
        options.observer = Some(&mut trace_observer);
    }

    match algorithm {
        Algorithm::Single => format_report(search::find_distance(instance, options), algorithm),
        Algorithm::Bidir => format_report(bidir::find_distance_bidir(instance, options), algorithm),
        Algorithm::Oracle => {
            let started = Instant::now();
            let distance = oracle::reference_distance(instance);
            SolveOutput {
                reachable: distance.is_some(),
                distance,
                visited: None,
                time_elapsed_ms: started.elapsed().as_millis() as u64,
                algorithm: algorithm.name(),
            }
        }
    }
}

fn run_check(instance: &Instance) -> CheckOutput {
    let started = Instant::now();
    let single = search::find_distance(instance, SearchOptions::default()).distance;
    let bidir = bidir::find_distance_bidir(instance, SearchOptions::default()).distance;
    let oracle = oracle::reference_distance(instance);

    let agree = single == bidir && bidir == oracle;
    if !agree {
        info!(
            "solvers disagree: single {:?}, bidir {:?}, oracle {:?}",
            single, bidir, oracle
        );
    }

    CheckOutput {
        agree,
        single,
        bidir,
        oracle,
        time_elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

fn format_report(report: SearchReport, algorithm: Algorithm) -> SolveOutput {
    SolveOutput {
        reachable: report.distance.is_some(),
        distance: report.distance,
        visited: Some(report.visited),
        time_elapsed_ms: report.time_elapsed_ms,
        algorithm: algorithm.name(),
    }
}
