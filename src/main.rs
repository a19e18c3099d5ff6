//! BB84 simulator CLI
//!
//! Runs the protocol over a noisy channel or against an eavesdropper and
//! prints per-round keys with a verdict. Without a subcommand it starts the
//! interactive menu.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use bb84_sim::config::presets;
use bb84_sim::tracing_init::init_tracing;
use bb84_sim::{ProtocolReport, ProtocolRunner, SimulationConfig, SimulationRequest};

#[derive(Parser, Debug)]
#[command(name = "bb84")]
#[command(version, about = "BB84 quantum key distribution simulator", long_about = None)]
struct Cli {
    /// JSON file with simulation defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Seed for a reproducible run
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Qubits sent per round
    #[arg(short = 'n', long, global = true)]
    qubits: Option<usize>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send qubits over a noisy channel
    Run {
        /// Bit-flip probability per qubit
        #[arg(short, long)]
        error_rate: Option<f64>,

        /// Number of rounds
        #[arg(short, long)]
        iterations: Option<usize>,
    },

    /// Let Eve intercept and resend every qubit
    Eavesdrop {
        /// Number of rounds
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Extra bit-flip probability Eve introduces
        #[arg(long)]
        eve_error_rate: Option<f64>,
    },

    /// Run a request given as form fields, e.g. `error_rate=0.1&num_iterations=3&eavesdrop=on`
    Form { query: String },

    /// Interactive menu
    Menu,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing("bb84=info,bb84_sim=warn", cli.log_json);

    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(qubits) = cli.qubits {
        config.num_qubits = qubits;
    }
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        num_qubits = config.num_qubits,
        seed = ?config.seed,
        "Starting BB84 simulator"
    );

    let mut runner = ProtocolRunner::from_config(&config)?;

    match cli.command.unwrap_or(Command::Menu) {
        Command::Run {
            error_rate,
            iterations,
        } => {
            let request = SimulationRequest::normal(
                error_rate.unwrap_or(config.error_rate),
                iterations.unwrap_or(config.num_iterations),
            );
            print_report(&runner.execute(&request)?, cli.json)?;
        }
        Command::Eavesdrop {
            iterations,
            eve_error_rate,
        } => {
            let request = SimulationRequest::eavesdropping(
                iterations.unwrap_or(config.num_iterations),
                eve_error_rate.unwrap_or(config.eavesdrop_error_rate),
            );
            print_report(&runner.execute(&request)?, cli.json)?;
        }
        Command::Form { query } => {
            let request = SimulationRequest::from_query(&query)?;
            print_report(&runner.execute(&request)?, cli.json)?;
        }
        Command::Menu => run_menu(&mut runner, &config, cli.json)?,
    }

    Ok(())
}

fn print_report(report: &ProtocolReport, json: bool) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{report}")?;
    }
    Ok(())
}

const BANNER: &str = "\
--------------------------------------------------
  BB84 quantum key distribution
--------------------------------------------------
Alice sends random bits encoded in random Z/X bases,
Bob measures in his own random bases, and both keep
the positions where the bases agreed. Compare runs
with no error, a low or high channel error rate, or
an eavesdropper to see how the keys are affected.
--------------------------------------------------";

const MENU: &str = "\
Choose an option:
[1] Simulate with 0 error
[2] Simulate with low error rate
[3] Simulate with high error rate
[4] Simulate eavesdropping attempt
[5] Exit";

fn run_menu(runner: &mut ProtocolRunner, config: &SimulationConfig, json: bool) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("{BANNER}\n");

    loop {
        println!("{MENU}");
        print!("Enter your choice (1/2/3/4/5): ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let request = match line?.trim() {
            "1" => SimulationRequest::normal(presets::NO_ERROR, presets::MENU_ITERATIONS),
            "2" => SimulationRequest::normal(presets::LOW_ERROR, presets::MENU_ITERATIONS),
            "3" => SimulationRequest::normal(presets::HIGH_ERROR, presets::MENU_ITERATIONS),
            "4" => SimulationRequest::eavesdropping(
                presets::MENU_ITERATIONS,
                config.eavesdrop_error_rate,
            ),
            "5" => break,
            _ => {
                println!("Invalid choice. Please enter a valid option.\n");
                continue;
            }
        };

        match runner.execute(&request) {
            Ok(report) => print_report(&report, json)?,
            Err(e) => error!(error = %e, "Simulation failed"),
        }
        println!();
    }

    Ok(())
}
