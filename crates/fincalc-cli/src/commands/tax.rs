use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::tax::gst::{self, GstInput, GstMode};
use fincalc_core::tax::income_tax::{self, IncomeTaxInput};

use crate::input;

/// Arguments for GST decomposition
#[derive(Args)]
pub struct GstArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount (net by default, gross with --inclusive)
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// GST rate in percent (18 = 18%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Treat the amount as tax-inclusive and back the tax out
    #[arg(long)]
    pub inclusive: bool,
}

/// Arguments for income tax calculation
#[derive(Args)]
pub struct IncomeTaxArgs {
    /// Path to a JSON or YAML input file carrying income, deductions, the
    /// slab table, cess, and any rebate rule
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_gst(args: GstArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let gst_input: GstInput = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        GstInput {
            amount: args.amount.ok_or("--amount is required (or provide --input)")?,
            rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            mode: if args.inclusive {
                GstMode::Inclusive
            } else {
                GstMode::Exclusive
            },
        }
    };

    let result = gst::compute_gst(&gst_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_income_tax(args: IncomeTaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input: IncomeTaxInput = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err(
            "--input <file.json|file.yaml> or stdin is required; the slab table is structured"
                .into(),
        );
    };

    let result = income_tax::compute_income_tax(&tax_input)?;
    Ok(serde_json::to_value(result)?)
}
