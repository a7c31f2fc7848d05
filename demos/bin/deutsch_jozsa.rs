//! Deutsch-Jozsa pipeline.
//!
//! Builds the 3-qubit oracle circuit, runs it on the least busy operational
//! IBM Quantum device with at least 3 qubits (or the local simulator), and
//! prints the measured distribution.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::style;

use qsolve_adapter_ibm::IbmProvider;
use qsolve_demos::circuits::{
    FunctionClass, PhaseOracle, classify, phase_oracle_circuit, script_circuit,
};
use qsolve_demos::config::Config;
use qsolve_demos::runners::{
    DEUTSCH_JOZSA_SHOTS, execute, execute_on_least_busy, local_simulator, print_summary,
};
use qsolve_demos::{init_logging, print_header, print_info, print_result, print_section};
use qsolve_hal::{Counts, EnvTokenProvider, Session, WaitPolicy};
use qsolve_ir::draw;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    /// Least busy IBM Quantum device
    Ibm,
    /// Local statevector simulator
    Simulator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Oracle {
    /// The fixed X/H/Toffoli oracle
    Script,
    /// Textbook circuit, constant f(x) = 0
    Constant,
    /// Textbook circuit, balanced f(x) = x0
    Balanced,
}

/// Run the 3-qubit Deutsch-Jozsa circuit
#[derive(Parser, Debug)]
#[command(name = "deutsch-jozsa", version, about, long_about = None)]
struct Args {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Where to run
    #[arg(short, long, value_enum, env = "QSOLVE_BACKEND", default_value = "ibm")]
    backend: Target,

    /// Which oracle circuit to build
    #[arg(short, long, value_enum, default_value = "script")]
    oracle: Oracle,

    /// Number of shots [default: 1024]
    #[arg(short, long, env = "QSOLVE_SHOTS")]
    shots: Option<u32>,

    /// Simulator seed
    #[arg(long, env = "QSOLVE_SEED")]
    seed: Option<u64>,

    /// Give up waiting after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Config file [default: ~/.qsolve/config.yaml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the histogram as JSON
    #[arg(long)]
    json: bool,

    /// Print the circuit as OpenQASM 3
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

async fn run(args: Args) -> Result<()> {
    let config = Config::discover(args.config.as_deref())?;
    let shots = config.shots(args.shots, DEUTSCH_JOZSA_SHOTS);

    let circuit = match args.oracle {
        Oracle::Script => script_circuit(),
        Oracle::Constant => phase_oracle_circuit(PhaseOracle::ConstantZero),
        Oracle::Balanced => phase_oracle_circuit(PhaseOracle::Balanced),
    }
    .context("failed to build Deutsch-Jozsa circuit")?;

    if !args.json {
        print_header("Deutsch-Jozsa");
        print_section("Circuit");
        print!("{}", draw(&circuit));
        print_result("Qubits", circuit.num_qubits());
        print_result("Depth", circuit.depth());
        print_result("Shots", shots);
    }
    if args.qasm {
        println!("{}", qsolve_qasm3::emit(&circuit));
    }

    let mut policy = WaitPolicy::default();
    if let Some(secs) = args.timeout {
        policy = policy.with_timeout(Duration::from_secs(secs));
    }

    let run = match args.backend {
        Target::Simulator => execute(&local_simulator(config.seed(args.seed)), &circuit, shots, policy)
            .await
            .context("simulation failed")?,
        Target::Ibm => {
            let session = ibm_session(&config).await?;
            let outcome =
                execute_on_least_busy(&IbmProvider::new(), &session, &circuit, shots, policy).await;
            session.close();
            outcome.context("IBM Quantum run failed")?
        }
    };

    if args.json {
        println!("{}", run.histogram.to_json()?);
        return Ok(());
    }

    print_section("Results");
    print_result("Backend", &run.backend);
    print_summary("Deutsch-Jozsa", &run.histogram, &run.result);

    if args.oracle != Oracle::Script {
        let counts = Counts::from_pairs(run.histogram.counts().clone());
        let verdict = match classify(&counts) {
            FunctionClass::Constant => style("constant").green(),
            FunctionClass::Balanced => style("balanced").yellow(),
        };
        println!("\n  Oracle is {verdict}");
    } else {
        print_info("The script oracle has no closing Hadamard layer; expect a spread distribution.");
    }
    Ok(())
}

/// Quantum Platform token, or an IBM Cloud API key with its service CRN.
async fn ibm_session(config: &Config) -> Result<Session> {
    let cloud = env::var_os("IBM_QUANTUM_TOKEN").is_none() && env::var_os("IBM_API_KEY").is_some();
    let tokens = if cloud {
        EnvTokenProvider::new("IBM_API_KEY")
    } else {
        EnvTokenProvider::ibm()
    };

    let mut session = config
        .ibm_session(IbmProvider::NAME, &tokens)
        .await
        .context("IBM Quantum credentials missing (set IBM_QUANTUM_TOKEN, or IBM_API_KEY and IBM_SERVICE_CRN)")?;
    if cloud && session.instance().is_none() {
        if let Ok(crn) = env::var("IBM_SERVICE_CRN") {
            session = session.with_instance(crn);
        }
    }
    Ok(session)
}
