//! Lump-sum prepayment restructuring.
//!
//! Replays the amortisation schedule up to the prepayment point, applies the
//! lump sum, then recomputes either a shorter tenure (installment fixed) or a
//! lower installment (tenure fixed). All math in `rust_decimal::Decimal`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FincalcError;
use crate::loan::amortisation::{monthly_installment, LoanTerms};
use crate::loan::schedule::generate_schedule;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FincalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What stays fixed after the lump sum is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrepaymentPolicy {
    /// Keep the installment; shorten the remaining tenure.
    ReduceTenure,
    /// Keep the remaining tenure; lower the installment.
    ReduceInstallment,
}

/// A lump-sum prepayment scenario. Consumed once per simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentInput {
    pub terms: LoanTerms,
    /// Installment override; the level-pay installment is computed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment: Option<Money>,
    pub lump_sum: Money,
    /// Number of installments already paid when the lump sum lands.
    pub apply_after_months: u32,
    pub policy: PrepaymentPolicy,
}

/// Result of a prepayment simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentOutcome {
    /// Installment under the new plan (unchanged for `ReduceTenure`).
    pub new_installment: Money,
    /// Months remaining after the prepayment point under the new plan.
    pub new_term_months: u32,
    pub original_total_interest: Money,
    pub new_total_interest: Money,
    /// `original_total_interest - new_total_interest`; never negative for a
    /// valid lump sum.
    pub interest_saved: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate a lump-sum prepayment under the chosen policy.
pub fn simulate_prepayment(
    input: &PrepaymentInput,
) -> FincalcResult<ComputationOutput<PrepaymentOutcome>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.terms.validate()?;
    if input.lump_sum <= Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "lump_sum".into(),
            reason: "Lump sum must be positive".into(),
        });
    }
    if input.apply_after_months >= input.terms.term_months {
        return Err(FincalcError::InvalidInput {
            field: "apply_after_months".into(),
            reason: "Prepayment must fall before the final installment".into(),
        });
    }

    let installment = match input.installment {
        Some(i) => i,
        None => monthly_installment(&input.terms)?,
    };

    // Replay the original plan: total interest, and state at the prepayment point.
    let original_rows = generate_schedule(&input.terms, installment)?;
    let original_total_interest: Money = original_rows.iter().map(|r| r.interest).sum();
    let paid = input.apply_after_months.min(original_rows.len() as u32) as usize;
    let interest_before: Money = original_rows[..paid].iter().map(|r| r.interest).sum();
    let outstanding = if paid == 0 {
        input.terms.principal
    } else {
        original_rows[paid - 1].closing_balance
    };

    if input.lump_sum > outstanding {
        return Err(FincalcError::Overpayment {
            lump_sum: input.lump_sum,
            outstanding,
        });
    }
    let reduced = outstanding - input.lump_sum;
    if reduced.is_zero() {
        warnings.push("Lump sum retires the loan in full".into());
    }

    let r = input.terms.monthly_rate();
    let remaining = input.terms.term_months - input.apply_after_months;

    let (new_installment, new_term_months, interest_after, methodology) = match input.policy {
        PrepaymentPolicy::ReduceTenure => {
            let (term, interest) = if reduced.is_zero() {
                (0, Decimal::ZERO)
            } else {
                let solved = solve_tenure(reduced, r, installment)?;
                let (mut interest, mut residual, mut term) =
                    walk_interest(reduced, r, installment, solved);
                // Absorb any sliver the ceiled closed form leaves behind.
                while residual > Decimal::ZERO {
                    let accrual = residual * r;
                    interest += accrual;
                    residual -= (installment - accrual).min(residual);
                    term += 1;
                }
                (term, interest)
            };
            (
                installment,
                term,
                interest,
                "Lump-Sum Prepayment — Reduce Tenure",
            )
        }
        PrepaymentPolicy::ReduceInstallment => {
            let (new_installment, interest) = if reduced.is_zero() {
                (Decimal::ZERO, Decimal::ZERO)
            } else {
                let new_terms = LoanTerms {
                    principal: reduced,
                    annual_rate_percent: input.terms.annual_rate_percent,
                    term_months: remaining,
                };
                let new_installment = monthly_installment(&new_terms)?;
                let (interest, _, _) = walk_interest(reduced, r, new_installment, remaining);
                (new_installment, interest)
            };
            (
                new_installment,
                remaining,
                interest,
                "Lump-Sum Prepayment — Reduce Installment",
            )
        }
    };

    let new_total_interest = interest_before + interest_after;
    let outcome = PrepaymentOutcome {
        new_installment,
        new_term_months,
        original_total_interest,
        new_total_interest,
        interest_saved: original_total_interest - new_total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, outcome))
}

/// Smallest integer number of periods that amortises `balance` at
/// `installment`: the annuity formula inverted,
/// `ceil( ln(installment / (installment - balance*r)) / ln(1+r) )`.
///
/// Fails with `NonAmortising` when the installment does not cover the
/// interest accruing per period.
pub fn solve_tenure(balance: Money, r: Rate, installment: Money) -> FincalcResult<u32> {
    if balance <= Decimal::ZERO {
        return Ok(0);
    }
    if r.is_zero() {
        let periods = (balance / installment).ceil();
        return Ok(periods.to_u32().unwrap_or(u32::MAX));
    }

    let interest_due = balance * r;
    if installment <= interest_due {
        return Err(FincalcError::NonAmortising {
            installment,
            interest_due,
        });
    }

    let ratio = installment / (installment - interest_due);
    let periods = (decimal_ln(ratio) / decimal_ln(Decimal::ONE + r)).ceil();
    Ok(periods.to_u32().unwrap_or(u32::MAX))
}

/// Interest accrued amortising `balance` at `installment` for up to
/// `max_periods` periods; returns total interest, the residual balance, and
/// the number of periods actually used.
fn walk_interest(
    mut balance: Money,
    r: Rate,
    installment: Money,
    max_periods: u32,
) -> (Money, Money, u32) {
    let mut interest_total = Decimal::ZERO;
    let mut used = 0;
    for _ in 0..max_periods {
        if balance.is_zero() {
            break;
        }
        let interest = balance * r;
        let principal = (installment - interest).min(balance);
        interest_total += interest;
        balance -= principal;
        used += 1;
    }
    (interest_total, balance, used)
}

// ---------------------------------------------------------------------------
// Decimal math helpers (no f64, no powd)
// ---------------------------------------------------------------------------

/// Taylor series expansion for e^x, 30 terms.
pub fn decimal_exp(x: Decimal) -> Decimal {
    let mut sum = Decimal::ONE;
    let mut term = Decimal::ONE;
    for n in 1..=30u32 {
        term *= x / Decimal::from(n);
        sum += term;
        if term.abs() < dec!(0.00000000000001) {
            break;
        }
    }
    sum
}

/// Natural logarithm via Newton's method, 20 iterations.
/// Uses the identity: solve f(y) = e^y - x = 0.
pub fn decimal_ln(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO; // undefined; guard
    }
    if x == Decimal::ONE {
        return Decimal::ZERO;
    }

    // Initial guess: for x close to 1, ln(x) ~ x - 1; for values far from 1,
    // count divisions by e.
    let mut guess = x - Decimal::ONE;
    if guess.abs() > dec!(2) {
        guess = Decimal::ZERO;
        let mut temp = x;
        let e_approx = dec!(2.718281828);
        if temp > Decimal::ONE {
            while temp > e_approx {
                temp /= e_approx;
                guess += Decimal::ONE;
            }
            guess += temp - Decimal::ONE;
        } else {
            while temp < Decimal::ONE / e_approx {
                temp *= e_approx;
                guess -= Decimal::ONE;
            }
            guess += temp - Decimal::ONE;
        }
    }

    for _ in 0..20 {
        let exp_guess = decimal_exp(guess);
        if exp_guess.is_zero() {
            break;
        }
        let delta = (exp_guess - x) / exp_guess;
        guess -= delta;
        if delta.abs() < dec!(0.00000000000001) {
            break;
        }
    }

    guess
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
