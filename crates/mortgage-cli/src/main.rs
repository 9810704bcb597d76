mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::mortgage::{AprArgs, CompareArgs, LoanArgs, ScheduleArgs};

/// Mortgage payment, amortization and APR calculations
#[derive(Parser)]
#[command(
    name = "mcalc",
    version,
    about = "Mortgage payment, amortization and APR calculations",
    long_about = "A CLI for mortgage calculations with decimal precision. \
                  Computes monthly payments, full amortization schedules, \
                  APR with finance fees, loan summaries and least-cost \
                  comparisons across loan scenarios."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver and schedule diagnostics to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly principal and interest payment
    Payment(LoanArgs),
    /// Month-by-month amortization schedule
    Schedule(ScheduleArgs),
    /// Annual percentage rate including finance fees
    Apr(AprArgs),
    /// Full loan summary: payment, totals, APR, payoff date
    Summary(LoanArgs),
    /// Compare loan scenarios and select the lowest total cost
    Compare(CompareArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::mortgage::run_payment(args),
        Commands::Schedule(args) => commands::mortgage::run_schedule(args),
        Commands::Apr(args) => commands::mortgage::run_apr(args),
        Commands::Summary(args) => commands::mortgage::run_summary(args),
        Commands::Compare(args) => commands::mortgage::run_compare(args),
        Commands::Version => {
            println!("mcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
