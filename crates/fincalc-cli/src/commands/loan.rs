use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::loan::amortisation::{self, LoanTerms};
use fincalc_core::loan::prepayment::{self, PrepaymentInput, PrepaymentPolicy};
use fincalc_core::loan::schedule::{self, ScheduleInput};

use crate::input;

/// Arguments for EMI calculation
#[derive(Args)]
pub struct EmiArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent (10 = 10%)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term_months: Option<u32>,
}

/// Arguments for schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent (10 = 10%)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Installment override (computed when omitted)
    #[arg(long)]
    pub installment: Option<Decimal>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum PolicyArg {
    /// Keep the installment; shorten the tenure
    ReduceTenure,
    /// Keep the tenure; lower the installment
    ReduceInstallment,
}

impl From<PolicyArg> for PrepaymentPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::ReduceTenure => PrepaymentPolicy::ReduceTenure,
            PolicyArg::ReduceInstallment => PrepaymentPolicy::ReduceInstallment,
        }
    }
}

/// Arguments for prepayment simulation
#[derive(Args)]
pub struct PrepayArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent (10 = 10%)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Lump sum applied to the outstanding balance
    #[arg(long)]
    pub lump_sum: Option<Decimal>,

    /// Installments already paid when the lump sum lands
    #[arg(long, alias = "after")]
    pub after_months: Option<u32>,

    /// Restructuring policy
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

fn terms_from_flags(
    principal: Option<Decimal>,
    annual_rate: Option<Decimal>,
    term_months: Option<u32>,
) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    Ok(LoanTerms {
        principal: principal.ok_or("--principal is required (or provide --input)")?,
        annual_rate_percent: annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?,
        term_months: term_months.ok_or("--term-months is required (or provide --input)")?,
    })
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        terms_from_flags(args.principal, args.annual_rate, args.term_months)?
    };

    let result = amortisation::analyze_loan(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScheduleInput {
            terms: terms_from_flags(args.principal, args.annual_rate, args.term_months)?,
            installment: args.installment,
        }
    };

    let result = schedule::build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_prepay(args: PrepayArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prepay_input: PrepaymentInput = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        PrepaymentInput {
            terms: terms_from_flags(args.principal, args.annual_rate, args.term_months)?,
            installment: None,
            lump_sum: args
                .lump_sum
                .ok_or("--lump-sum is required (or provide --input)")?,
            apply_after_months: args
                .after_months
                .ok_or("--after-months is required (or provide --input)")?,
            policy: args
                .policy
                .ok_or("--policy is required (or provide --input)")?
                .into(),
        }
    };

    let result = prepayment::simulate_prepayment(&prepay_input)?;
    Ok(serde_json::to_value(result)?)
}
