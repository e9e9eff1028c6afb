use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::trade::profit_loss::{self, TradeInput};

use crate::input;

/// Arguments for profit/loss analysis
#[derive(Args)]
pub struct ProfitLossArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Cost price per unit
    #[arg(long)]
    pub cost: Option<Decimal>,

    /// Selling price per unit
    #[arg(long)]
    pub selling: Option<Decimal>,

    /// Quantity
    #[arg(long, default_value = "1")]
    pub quantity: Decimal,
}

pub fn run_profit_loss(args: ProfitLossArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let trade_input: TradeInput = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        TradeInput {
            cost_price: args.cost.ok_or("--cost is required (or provide --input)")?,
            selling_price: args
                .selling
                .ok_or("--selling is required (or provide --input)")?,
            quantity: args.quantity,
        }
    };

    let result = profit_loss::analyze_trade(&trade_input)?;
    Ok(serde_json::to_value(result)?)
}
