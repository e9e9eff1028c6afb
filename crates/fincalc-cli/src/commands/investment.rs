use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::investment::fixed_deposit::{self, CompoundingFrequency, FdInput, FdPayout};
use fincalc_core::investment::sip::{self, GoalInput, SipInput};

use crate::input;

/// Arguments for SIP projection
#[derive(Args)]
pub struct SipArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly contribution
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Expected annual return in percent (12 = 12%)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Annual step-up in percent (0 = regular SIP)
    #[arg(long, default_value = "0")]
    pub step_up: Decimal,
}

/// Arguments for SIP goal planning
#[derive(Args)]
pub struct SipGoalArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Target amount
    #[arg(long)]
    pub target: Option<Decimal>,

    /// Expected annual return in percent (12 = 12%)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term_months: Option<u32>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum CompoundingArg {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl From<CompoundingArg> for CompoundingFrequency {
    fn from(arg: CompoundingArg) -> Self {
        match arg {
            CompoundingArg::Monthly => CompoundingFrequency::Monthly,
            CompoundingArg::Quarterly => CompoundingFrequency::Quarterly,
            CompoundingArg::HalfYearly => CompoundingFrequency::HalfYearly,
            CompoundingArg::Yearly => CompoundingFrequency::Yearly,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum PayoutArg {
    /// Interest compounds into the deposit
    Cumulative,
    /// Interest is paid out each period
    Payout,
}

impl From<PayoutArg> for FdPayout {
    fn from(arg: PayoutArg) -> Self {
        match arg {
            PayoutArg::Cumulative => FdPayout::Cumulative,
            PayoutArg::Payout => FdPayout::PeriodicInterest,
        }
    }
}

/// Arguments for fixed deposit analysis
#[derive(Args)]
pub struct FdArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Deposit amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent (7.5 = 7.5%)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Compounding frequency
    #[arg(long, value_enum, default_value = "quarterly")]
    pub compounding: CompoundingArg,

    /// Interest treatment
    #[arg(long, value_enum, default_value = "cumulative")]
    pub payout: PayoutArg,
}

pub fn run_sip(args: SipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sip_input: SipInput = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        SipInput {
            monthly_contribution: args
                .amount
                .ok_or("--amount is required (or provide --input)")?,
            annual_rate_percent: args
                .annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            term_months: args
                .term_months
                .ok_or("--term-months is required (or provide --input)")?,
            step_up_percent: args.step_up,
        }
    };

    let result = sip::project_accumulation(&sip_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_sip_goal(args: SipGoalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let goal_input: GoalInput = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        GoalInput {
            target_amount: args
                .target
                .ok_or("--target is required (or provide --input)")?,
            annual_rate_percent: args
                .annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            term_months: args
                .term_months
                .ok_or("--term-months is required (or provide --input)")?,
        }
    };

    let result = sip::plan_goal(&goal_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_fd(args: FdArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let fd_input: FdInput = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        FdInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args
                .annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            term_months: args
                .term_months
                .ok_or("--term-months is required (or provide --input)")?,
            compounding: args.compounding.into(),
            payout: args.payout.into(),
        }
    };

    let result = fixed_deposit::analyze_deposit(&fd_input)?;
    Ok(serde_json::to_value(result)?)
}
