//! qsolve pipelines
//!
//! Two small end-to-end quantum workloads built on the qsolve crates:
//!
//! - **Deutsch-Jozsa**: a fixed 3-qubit oracle circuit, run on the least busy
//!   operational IBM Quantum device (or the local simulator).
//! - **QAOA routing**: a single-layer QAOA circuit over a weighted graph, run
//!   on the local simulator, plus an exact TSP path that encodes the graph as
//!   a QUBO and solves it with a minimum-eigenvalue optimizer.
//!
//! ```ignore
//! use qsolve_demos::circuits::routing_circuit;
//! use qsolve_demos::problems::RoutingGraph;
//! use qsolve_demos::runners::{QAOA_SHOTS, execute, local_simulator};
//!
//! let circuit = routing_circuit(&RoutingGraph::four_cities(), 0.5, 0.5, 1)?;
//! let run = execute(&local_simulator(Some(7)), &circuit, QAOA_SHOTS, Default::default()).await?;
//! print!("{}", run.histogram.render_bar_chart());
//! ```

pub mod circuits;
pub mod config;
pub mod error;
pub mod optimizers;
pub mod problems;
pub mod runners;
pub mod solvers;

pub use error::{DemoError, DemoResult};

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while a job runs.
pub fn job_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print a pipeline header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a section title.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a labelled value.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success line.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an informational line.
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Map a `-v` count to a log filter and install the subscriber. `RUST_LOG`
/// overrides the flag.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
