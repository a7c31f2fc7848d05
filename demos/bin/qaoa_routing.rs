//! QAOA routing pipeline.
//!
//! Runs a single-layer QAOA circuit over a weighted graph on the local
//! simulator, then solves the graph as a TSP QUBO with a minimum-eigenvalue
//! optimizer and decodes the most likely tour.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::style;

use qsolve_demos::circuits::{qaoa_ansatz, routing_circuit};
use qsolve_demos::config::Config;
use qsolve_demos::problems::{DEFAULT_PENALTY, RoutingGraph, TspEncoding, TspError};
use qsolve_demos::runners::{QAOA_SHOTS, execute, local_simulator, print_summary};
use qsolve_demos::solvers::{
    ExactEigensolver, MinimumEigenOptimizer, MinimumEigenSolver, OptimizationResult,
    QaoaEigensolver,
};
use qsolve_demos::{
    init_logging, print_header, print_info, print_result, print_section, print_success,
};
use qsolve_hal::WaitPolicy;
use qsolve_ir::draw;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Solver {
    /// QAOA ansatz with COBYLA-style angle search
    Qaoa,
    /// Brute-force minimum of the diagonal Hamiltonian
    Exact,
    /// Skip the TSP step
    Skip,
}

/// QAOA over a weighted routing graph
#[derive(Parser, Debug)]
#[command(name = "qaoa-routing", version, about, long_about = None)]
struct Args {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Graph file (JSON or YAML edge list) [default: built-in 4-city graph]
    #[arg(short, long)]
    graph: Option<PathBuf>,

    /// Cost angle
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    gamma: f64,

    /// Mixer angle
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    beta: f64,

    /// QAOA depth (the sampled circuit always has one layer)
    #[arg(short, default_value_t = 1)]
    p: usize,

    /// Number of shots [default: 1000]
    #[arg(short, long, env = "QSOLVE_SHOTS")]
    shots: Option<u32>,

    /// Simulator seed
    #[arg(long, env = "QSOLVE_SEED")]
    seed: Option<u64>,

    /// Eigensolver for the TSP step
    #[arg(long, value_enum, default_value = "qaoa")]
    solver: Solver,

    /// One-hot penalty weight of the TSP encoding
    #[arg(long, default_value_t = DEFAULT_PENALTY)]
    penalty: f64,

    /// Config file [default: ~/.qsolve/config.yaml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Print circuits as OpenQASM 3
    #[arg(long)]
    qasm: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn load_graph(path: &Path) -> Result<RoutingGraph> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file: {}", path.display()))?;
    let graph = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text).map_err(anyhow::Error::from),
        _ => serde_yaml_ng::from_str(&text).map_err(anyhow::Error::from),
    };
    graph.with_context(|| format!("invalid graph file: {}", path.display()))
}

async fn run(args: Args) -> Result<()> {
    let config = Config::discover(args.config.as_deref())?;
    let shots = config.shots(args.shots, QAOA_SHOTS);
    let seed = config.seed(args.seed);

    let graph = match &args.graph {
        Some(path) => load_graph(path)?,
        None => RoutingGraph::four_cities(),
    };

    let circuit = routing_circuit(&graph, args.gamma, args.beta, args.p)
        .context("failed to build QAOA circuit")?;

    if !args.json {
        print_header("QAOA Routing");
        print_section("Problem");
        print!("{graph}");
        print_result("gamma", args.gamma);
        print_result("beta", args.beta);
        print_result("p", args.p);
        if args.p > 1 {
            print_info("The sampled circuit has a single layer regardless of p.");
        }

        print_section("Circuit");
        print!("{}", draw(&circuit));
        print_result("Depth", circuit.depth());
    }
    if args.qasm {
        println!("{}", qsolve_qasm3::emit(&circuit));
    }

    let run = execute(&local_simulator(seed), &circuit, shots, WaitPolicy::default())
        .await
        .context("simulation failed")?;

    if !args.json {
        print_section("Sampled distribution");
        print_summary("QAOA routing", &run.histogram, &run.result);
    }

    let solution = match args.solver {
        Solver::Skip => None,
        Solver::Exact => Some(solve(ExactEigensolver::new(), &graph, &args)?),
        Solver::Qaoa => {
            let solver = match seed {
                Some(seed) => QaoaEigensolver::new(args.p).with_seed(seed),
                None => QaoaEigensolver::new(args.p),
            };
            Some(solve(solver, &graph, &args)?)
        }
    };

    if args.json {
        let report = serde_json::json!({
            "histogram": run.histogram,
            "solution": solution.as_ref().map(|(result, route)| serde_json::json!({
                "result": result,
                "route": route,
            })),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

/// Encode the graph as a TSP QUBO, solve it and print the decoded tour.
fn solve<S: MinimumEigenSolver>(
    solver: S,
    graph: &RoutingGraph,
    args: &Args,
) -> Result<(OptimizationResult, Option<Vec<usize>>)> {
    let tsp = TspEncoding::from_graph(graph, args.penalty).context("failed to encode TSP")?;
    let optimizer = MinimumEigenOptimizer::new(solver);
    let result = optimizer
        .solve(tsp.qubo())
        .with_context(|| format!("{} eigensolver failed", optimizer.solver().name()))?;

    let route = match tsp.decode_route(&result.x) {
        Ok(route) => Some(route),
        Err(TspError::Infeasible(reason)) => {
            if !args.json {
                print_info(&format!("Most likely assignment is not a tour: {reason}"));
            }
            None
        }
        Err(e) => return Err(e.into()),
    };

    if !args.json {
        print_section(&format!("TSP ({} solver)", optimizer.solver().name()));
        let bits: String = result.x.iter().map(|b| char::from(b'0' + b)).collect();
        print_result("Most likely x", bits);
        print_result("Objective", format!("{:.2}", result.fval));
        print_result("Eigenvalue", format!("{:.2}", result.eigenvalue));
        print_result("Evaluations", result.num_evaluations);
        if let Some(route) = &route {
            print_success(&format!(
                "Tour {:?} with length {}",
                route,
                tsp.route_cost(route)
            ));
        }
    }

    if args.qasm && !result.optimal_parameters.is_empty() {
        let (gammas, betas) = result
            .optimal_parameters
            .split_at(result.optimal_parameters.len() / 2);
        let ansatz = qaoa_ansatz(&tsp.qubo().to_ising(), gammas, betas)?;
        println!("{}", qsolve_qasm3::emit(&ansatz));
    }

    Ok((result, route))
}
