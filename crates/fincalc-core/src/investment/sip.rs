//! Systematic investment plan (SIP) accumulation.
//!
//! Future value of a recurring monthly contribution series, with optional
//! annual step-up, plus the inverse (required contribution for a target).
//!
//! Convention: annuity-due. Each contribution compounds for the month it is
//! made in. SIP calculators in the wild disagree on due vs ordinary; the due
//! form is the documented choice here and the `(1+r)` factor in the closed
//! form is deliberate.

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

/// A recurring contribution series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipInput {
    pub monthly_contribution: Money,
    /// Expected annual return as entered (12 = 12%).
    pub annual_rate_percent: Percent,
    pub term_months: u32,
    /// Contribution increase applied at each 12-month anniversary (0 = regular).
    #[serde(default)]
    pub step_up_percent: Percent,
}

/// One elapsed year of the projection; the final year may be partial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipYear {
    pub year: u32,
    /// Contributed during this year.
    pub contributed: Money,
    pub total_contributed: Money,
    pub balance: Money,
    pub gain: Money,
}

/// Accumulation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipProjection {
    pub total_contributed: Money,
    pub maturity_value: Money,
    pub gain: Money,
    pub year_by_year: Vec<SipYear>,
}

/// Target-amount planning input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalInput {
    pub target_amount: Money,
    pub annual_rate_percent: Percent,
    pub term_months: u32,
}

/// Required contribution for a target amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalPlan {
    pub required_monthly_contribution: Money,
    pub total_contributed: Money,
    pub projected_gain: Money,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / MONTHS_PER_YEAR / PERCENT
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
fn compound(rate: Rate, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result *= factor;
    }
    result
}

fn validate_series(
    amount: Money,
    amount_field: &str,
    annual_rate_percent: Percent,
    term_months: u32,
) -> FincalcResult<()> {
    if amount <= Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: amount_field.into(),
            reason: "Amount must be positive".into(),
        });
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "Rate cannot be negative".into(),
        });
    }
    if term_months == 0 {
        return Err(FincalcError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least one month".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Future value of a regular monthly contribution series (annuity-due):
/// `A * (((1+r)^n - 1) / r) * (1+r)`. Zero-rate: `A * n`.
pub fn future_value_of_series(
    monthly_contribution: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> FincalcResult<Money> {
    validate_series(
        monthly_contribution,
        "monthly_contribution",
        annual_rate_percent,
        term_months,
    )?;

    let r = monthly_rate(annual_rate_percent);
    let n = Decimal::from(term_months);
    if r.is_zero() {
        return Ok(monthly_contribution * n);
    }

    let factor = compound(r, term_months);
    Ok(monthly_contribution * ((factor - Decimal::ONE) / r) * (Decimal::ONE + r))
}

/// Monthly contribution needed to reach `target_amount`; the algebraic
/// inverse of `future_value_of_series`. Zero-rate: `target / n`.
pub fn required_contribution(
    target_amount: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> FincalcResult<Money> {
    validate_series(
        target_amount,
        "target_amount",
        annual_rate_percent,
        term_months,
    )?;

    let r = monthly_rate(annual_rate_percent);
    let n = Decimal::from(term_months);
    if r.is_zero() {
        return Ok(target_amount / n);
    }

    let factor = compound(r, term_months);
    let annuity_factor = ((factor - Decimal::ONE) / r) * (Decimal::ONE + r);
    if annuity_factor.is_zero() {
        return Err(FincalcError::DivisionByZero {
            context: "SIP annuity factor".into(),
        });
    }
    Ok(target_amount / annuity_factor)
}

/// Project the accumulation month by month, stepping the contribution up at
/// each anniversary, with a year-by-year trail.
///
/// For `step_up_percent = 0` the simulation reproduces the closed form of
/// `future_value_of_series` exactly.
pub fn project_accumulation(input: &SipInput) -> FincalcResult<ComputationOutput<SipProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_series(
        input.monthly_contribution,
        "monthly_contribution",
        input.annual_rate_percent,
        input.term_months,
    )?;
    if input.step_up_percent < Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "step_up_percent".into(),
            reason: "Step-up cannot be negative".into(),
        });
    }
    if input.step_up_percent > PERCENT {
        warnings.push(format!(
            "Step-up of {}% more than doubles the contribution every year",
            input.step_up_percent
        ));
    }

    let r = monthly_rate(input.annual_rate_percent);
    let growth = Decimal::ONE + r;
    let step_factor = Decimal::ONE + input.step_up_percent / PERCENT;

    let mut balance = Decimal::ZERO;
    let mut contribution = input.monthly_contribution;
    let mut total_contributed = Decimal::ZERO;
    let mut year_contributed = Decimal::ZERO;
    let mut year_by_year: Vec<SipYear> = Vec::new();

    for month in 1..=input.term_months {
        balance = (balance + contribution) * growth;
        total_contributed += contribution;
        year_contributed += contribution;

        if month % 12 == 0 {
            year_by_year.push(SipYear {
                year: month / 12,
                contributed: year_contributed,
                total_contributed,
                balance,
                gain: balance - total_contributed,
            });
            year_contributed = Decimal::ZERO;
            contribution *= step_factor;
        }
    }

    if input.term_months % 12 != 0 {
        year_by_year.push(SipYear {
            year: input.term_months / 12 + 1,
            contributed: year_contributed,
            total_contributed,
            balance,
            gain: balance - total_contributed,
        });
    }

    let projection = SipProjection {
        total_contributed,
        maturity_value: balance,
        gain: balance - total_contributed,
        year_by_year,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "SIP Accumulation (annuity-due)",
        input,
        warnings,
        elapsed,
        projection,
    ))
}

/// Required contribution, total outlay, and projected gain for a target.
pub fn plan_goal(input: &GoalInput) -> FincalcResult<ComputationOutput<GoalPlan>> {
    let start = Instant::now();

    let required = required_contribution(
        input.target_amount,
        input.annual_rate_percent,
        input.term_months,
    )?;
    let total_contributed = required * Decimal::from(input.term_months);

    let plan = GoalPlan {
        required_monthly_contribution: required,
        total_contributed,
        projected_gain: input.target_amount - total_contributed,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "SIP Goal Planning (annuity-due)",
        input,
        Vec::new(),
        elapsed,
        plan,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
