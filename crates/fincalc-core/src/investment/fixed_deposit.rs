//! Fixed deposit maturity under periodic compounding.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FincalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::FincalcResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How often interest is credited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum CompoundingFrequency {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl CompoundingFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::HalfYearly => 2,
            CompoundingFrequency::Yearly => 1,
        }
    }

    pub fn months_per_period(&self) -> u32 {
        12 / self.periods_per_year()
    }
}

/// Whether interest compounds or is paid out each period.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum FdPayout {
    /// Interest is credited to the deposit and compounds.
    #[default]
    Cumulative,
    /// Interest is paid out each period; the deposit itself never grows.
    PeriodicInterest,
}

/// A fixed deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FdInput {
    pub principal: Money,
    /// Annual nominal rate as entered (7.5 = 7.5%).
    pub annual_rate_percent: Percent,
    pub term_months: u32,
    pub compounding: CompoundingFrequency,
    #[serde(default)]
    pub payout: FdPayout,
}

/// Maturity figures for a fixed deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FdOutcome {
    /// Amount returned at maturity (the principal alone for `PeriodicInterest`).
    pub maturity_value: Money,
    pub total_interest: Money,
    /// Simple annualised yield: total interest over principal per year of term.
    pub effective_annual_rate_percent: Percent,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
fn compound(rate: Rate, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result *= factor;
    }
    result
}

/// Maturity value and interest for a fixed deposit.
///
/// Whole compounding periods credit `r/m` each; a trailing partial period
/// accrues simple interest pro-rata on the months it covers.
pub fn analyze_deposit(input: &FdInput) -> FincalcResult<ComputationOutput<FdOutcome>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.principal <= Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if input.annual_rate_percent < Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "Rate cannot be negative".into(),
        });
    }
    if input.term_months == 0 {
        return Err(FincalcError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least one month".into(),
        });
    }

    let months_per_period = input.compounding.months_per_period();
    if input.term_months < months_per_period {
        warnings.push(format!(
            "Term of {} months is shorter than one compounding period; \
             interest accrues pro-rata",
            input.term_months
        ));
    }

    let periodic_rate = input.annual_rate_percent
        / PERCENT
        / Decimal::from(input.compounding.periods_per_year());
    let whole_periods = input.term_months / months_per_period;
    let partial_months = input.term_months % months_per_period;
    let partial_fraction = Decimal::from(partial_months) / Decimal::from(months_per_period);

    let (maturity_value, total_interest) = match input.payout {
        FdPayout::Cumulative => {
            let mut balance = input.principal * compound(periodic_rate, whole_periods);
            balance += balance * periodic_rate * partial_fraction;
            (balance, balance - input.principal)
        }
        FdPayout::PeriodicInterest => {
            let per_period = input.principal * periodic_rate;
            let paid_out =
                per_period * Decimal::from(whole_periods) + per_period * partial_fraction;
            (input.principal, paid_out)
        }
    };

    let years = Decimal::from(input.term_months) / MONTHS_PER_YEAR;
    let effective_annual_rate_percent = total_interest / input.principal / years * PERCENT;

    let outcome = FdOutcome {
        maturity_value,
        total_interest,
        effective_annual_rate_percent,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed Deposit Maturity",
        input,
        warnings,
        elapsed,
        outcome,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
