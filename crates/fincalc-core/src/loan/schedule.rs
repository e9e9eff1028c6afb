//! Period-by-period amortisation schedules.
//!
//! Walks the outstanding balance applying interest accrual and principal
//! reduction each month, with an optional yearly aggregation. All math in
//! `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FincalcError;
use crate::loan::amortisation::{monthly_installment, LoanTerms};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FincalcResult;

/// Installment drift beyond this threshold draws a warning.
const INSTALLMENT_DRIFT_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single period in the repayment schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based period number.
    pub period: u32,
    pub opening_balance: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

/// Twelve-period aggregation of the schedule; the final year may be partial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRow {
    /// 1-based year number.
    pub year: u32,
    pub interest_paid: Money,
    pub principal_paid: Money,
    pub closing_balance: Money,
}

/// Input for `build_schedule`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub terms: LoanTerms,
    /// Installment override; the level-pay installment is computed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment: Option<Money>,
}

/// Full schedule with yearly aggregation and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub installment: Money,
    pub rows: Vec<ScheduleRow>,
    pub yearly: Vec<YearRow>,
    pub total_interest: Money,
    pub total_principal: Money,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Walk the loan balance period by period under a fixed installment.
///
/// Per period: `interest = balance * r`, `principal = min(installment -
/// interest, balance)` (the `min` guards the final period against overshoot),
/// `balance -= principal`. Pure function of its inputs; stops early if the
/// balance reaches zero before the term ends.
pub fn generate_schedule(
    terms: &LoanTerms,
    installment: Money,
) -> FincalcResult<Vec<ScheduleRow>> {
    terms.validate()?;

    if installment <= Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "installment".into(),
            reason: "Installment must be positive".into(),
        });
    }

    let r = terms.monthly_rate();
    let first_interest = terms.principal * r;
    if installment <= first_interest {
        return Err(FincalcError::NonAmortising {
            installment,
            interest_due: first_interest,
        });
    }

    let mut rows = Vec::with_capacity(terms.term_months as usize);
    let mut balance = terms.principal;

    for period in 1..=terms.term_months {
        if balance.is_zero() {
            break;
        }
        let opening = balance;
        let interest = balance * r;
        let principal = (installment - interest).min(balance);
        balance -= principal;

        rows.push(ScheduleRow {
            period,
            opening_balance: opening,
            interest,
            principal,
            closing_balance: balance,
        });
    }

    Ok(rows)
}

/// Sum monthly rows into 12-period windows; the last window takes whatever
/// periods remain.
pub fn aggregate_yearly(rows: &[ScheduleRow]) -> Vec<YearRow> {
    rows.chunks(12)
        .enumerate()
        .map(|(i, chunk)| YearRow {
            year: i as u32 + 1,
            interest_paid: chunk.iter().map(|r| r.interest).sum(),
            principal_paid: chunk.iter().map(|r| r.principal).sum(),
            closing_balance: chunk
                .last()
                .map(|r| r.closing_balance)
                .unwrap_or(Decimal::ZERO),
        })
        .collect()
}

/// Build the monthly schedule, yearly aggregation, and totals for a loan.
pub fn build_schedule(
    input: &ScheduleInput,
) -> FincalcResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let level_pay = monthly_installment(&input.terms)?;
    let installment = input.installment.unwrap_or(level_pay);

    if (installment - level_pay).abs() > INSTALLMENT_DRIFT_TOLERANCE {
        warnings.push(format!(
            "Supplied installment {} differs from the level-pay installment {}; \
             the balance will not reach zero exactly at the final period",
            installment, level_pay
        ));
    }

    let rows = generate_schedule(&input.terms, installment)?;
    let yearly = aggregate_yearly(&rows);
    let total_interest = rows.iter().map(|r| r.interest).sum();
    let total_principal = rows.iter().map(|r| r.principal).sum();

    let output = ScheduleOutput {
        installment,
        rows,
        yearly,
        total_interest,
        total_principal,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amortisation Schedule",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TOL: Decimal = dec!(0.01);

    fn standard_terms() -> LoanTerms {
        LoanTerms {
            principal: dec!(500_000),
            annual_rate_percent: dec!(10),
            term_months: 60,
        }
    }

    fn standard_schedule() -> Vec<ScheduleRow> {
        let terms = standard_terms();
        let installment = monthly_installment(&terms).unwrap();
        generate_schedule(&terms, installment).unwrap()
    }

    #[test]
    fn test_schedule_length_and_numbering() {
        let rows = standard_schedule();
        assert_eq!(rows.len(), 60);
        assert_eq!(rows[0].period, 1);
        assert_eq!(rows[59].period, 60);
    }

    #[test]
    fn test_principal_portions_sum_to_principal() {
        let rows = standard_schedule();
        let total: Decimal = rows.iter().map(|r| r.principal).sum();
        assert!(
            (total - dec!(500_000)).abs() <= TOL,
            "principal portions should sum to the principal, got {}",
            total
        );
    }

    #[test]
    fn test_balance_monotonically_decreasing_to_zero() {
        let rows = standard_schedule();
        let mut prev = dec!(500_000);
        for row in &rows {
            assert!(row.closing_balance >= Decimal::ZERO);
            assert!(row.closing_balance <= prev);
            prev = row.closing_balance;
        }
        assert!(rows.last().unwrap().closing_balance <= TOL);
    }

    #[test]
    fn test_balance_invariant_per_row() {
        for row in &standard_schedule() {
            assert_eq!(row.closing_balance, row.opening_balance - row.principal);
        }
    }

    #[test]
    fn test_zero_rate_schedule() {
        let terms = LoanTerms {
            principal: dec!(120_000),
            annual_rate_percent: Decimal::ZERO,
            term_months: 24,
        };
        let rows = generate_schedule(&terms, dec!(5000)).unwrap();
        assert_eq!(rows.len(), 24);
        for row in &rows {
            assert_eq!(row.interest, Decimal::ZERO);
            assert_eq!(row.principal, dec!(5000));
        }
        assert_eq!(rows[23].closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_non_amortising_installment_rejected() {
        let terms = standard_terms();
        // Monthly interest on 500k at 10% is ~4166.67
        let result = generate_schedule(&terms, dec!(4000));
        assert!(matches!(result, Err(FincalcError::NonAmortising { .. })));
    }

    #[test]
    fn test_yearly_aggregation_windows() {
        let rows = standard_schedule();
        let yearly = aggregate_yearly(&rows);
        assert_eq!(yearly.len(), 5);

        let first_year_interest: Decimal = rows[..12].iter().map(|r| r.interest).sum();
        assert_eq!(yearly[0].interest_paid, first_year_interest);
        assert_eq!(yearly[0].closing_balance, rows[11].closing_balance);
        assert_eq!(yearly[4].closing_balance, rows[59].closing_balance);
    }

    #[test]
    fn test_yearly_aggregation_partial_final_window() {
        let terms = LoanTerms {
            principal: dec!(100_000),
            annual_rate_percent: dec!(9),
            term_months: 30,
        };
        let installment = monthly_installment(&terms).unwrap();
        let rows = generate_schedule(&terms, installment).unwrap();
        let yearly = aggregate_yearly(&rows);
        assert_eq!(yearly.len(), 3);

        let final_window: Decimal = rows[24..].iter().map(|r| r.principal).sum();
        assert_eq!(yearly[2].principal_paid, final_window);
    }

    #[test]
    fn test_overpaying_installment_shortens_schedule() {
        let terms = standard_terms();
        let installment = monthly_installment(&terms).unwrap();
        let rows = generate_schedule(&terms, installment * dec!(2)).unwrap();
        assert!(rows.len() < 60);
        assert_eq!(rows.last().unwrap().closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_build_schedule_envelope() {
        let input = ScheduleInput {
            terms: standard_terms(),
            installment: None,
        };
        let out = build_schedule(&input).unwrap();
        assert!(out.warnings.is_empty());
        assert_eq!(out.result.rows.len(), 60);
        assert!((out.result.total_principal - dec!(500_000)).abs() <= TOL);

        let overridden = ScheduleInput {
            terms: standard_terms(),
            installment: Some(dec!(12_000)),
        };
        let out = build_schedule(&overridden).unwrap();
        assert!(!out.warnings.is_empty());
    }
}
