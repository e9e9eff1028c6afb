mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::investment::{FdArgs, SipArgs, SipGoalArgs};
use commands::loan::{EmiArgs, PrepayArgs, ScheduleArgs};
use commands::tax::{GstArgs, IncomeTaxArgs};
use commands::trade::ProfitLossArgs;

/// Personal finance calculations with decimal precision
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Personal finance calculations with decimal precision",
    long_about = "A CLI for everyday financial calculations with decimal precision. \
                  Supports loan EMIs, amortisation schedules, lump-sum prepayment \
                  analysis, SIP projections, fixed deposits, GST, slab-based income \
                  tax, and profit/loss."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the fixed monthly installment (EMI) for a loan
    Emi(EmiArgs),
    /// Build the month-by-month amortisation schedule
    Schedule(ScheduleArgs),
    /// Simulate a lump-sum prepayment (reduce tenure or installment)
    Prepay(PrepayArgs),
    /// Project a SIP accumulation, with optional annual step-up
    Sip(SipArgs),
    /// Monthly contribution required to reach a target amount
    SipGoal(SipGoalArgs),
    /// Fixed deposit maturity and interest
    Fd(FdArgs),
    /// GST decomposition (exclusive or inclusive)
    Gst(GstArgs),
    /// Slab-based income tax from a structured input file
    IncomeTax(IncomeTaxArgs),
    /// Profit or loss on a buy/sell pair
    ProfitLoss(ProfitLossArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loan::run_emi(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Prepay(args) => commands::loan::run_prepay(args),
        Commands::Sip(args) => commands::investment::run_sip(args),
        Commands::SipGoal(args) => commands::investment::run_sip_goal(args),
        Commands::Fd(args) => commands::investment::run_fd(args),
        Commands::Gst(args) => commands::tax::run_gst(args),
        Commands::IncomeTax(args) => commands::tax::run_income_tax(args),
        Commands::ProfitLoss(args) => commands::trade::run_profit_loss(args),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
