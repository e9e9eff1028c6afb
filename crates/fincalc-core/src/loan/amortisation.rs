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

/// Terms of a level-pay loan. Immutable once a calculation starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed.
    pub principal: Money,
    /// Annual nominal rate as entered (10 = 10%).
    pub annual_rate_percent: Percent,
    /// Term in months.
    pub term_months: u32,
}

impl LoanTerms {
    /// Periodic (monthly) rate as a decimal fraction.
    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate_percent / MONTHS_PER_YEAR / PERCENT
    }

    pub fn validate(&self) -> FincalcResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(FincalcError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(FincalcError::InvalidInput {
                field: "annual_rate_percent".into(),
                reason: "Rate cannot be negative".into(),
            });
        }
        if self.term_months == 0 {
            return Err(FincalcError::InvalidInput {
                field: "term_months".into(),
                reason: "Term must be at least one month".into(),
            });
        }
        Ok(())
    }
}

/// Headline figures for a level-pay loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    /// Fixed periodic installment (EMI).
    pub installment: Money,
    /// Installment times term.
    pub total_payment: Money,
    /// Total payment less principal.
    pub total_interest: Money,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
pub(crate) fn compound(rate: Rate, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result *= factor;
    }
    result
}

/// Fixed monthly installment that fully amortises the loan over its term.
///
/// Standard annuity formula `P * r * (1+r)^n / ((1+r)^n - 1)`. A zero-rate
/// loan divides the principal evenly across the term.
pub fn monthly_installment(terms: &LoanTerms) -> FincalcResult<Money> {
    terms.validate()?;

    let r = terms.monthly_rate();
    let n = Decimal::from(terms.term_months);

    if r.is_zero() {
        return Ok(terms.principal / n);
    }

    let factor = compound(r, terms.term_months);
    let annuity_factor = factor - Decimal::ONE;
    if annuity_factor <= Decimal::ZERO {
        return Err(FincalcError::DivisionByZero {
            context: "installment annuity factor".into(),
        });
    }

    Ok(terms.principal * r * factor / annuity_factor)
}

/// Installment, total payment, and total interest for a loan.
pub fn analyze_loan(terms: &LoanTerms) -> FincalcResult<ComputationOutput<LoanSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let installment = monthly_installment(terms)?;

    if terms.annual_rate_percent > dec!(36) {
        warnings.push(format!(
            "Annual rate of {}% is unusually high for a term loan",
            terms.annual_rate_percent
        ));
    }
    if terms.term_months > 600 {
        warnings.push(format!(
            "Term of {} months exceeds 50 years",
            terms.term_months
        ));
    }

    let total_payment = installment * Decimal::from(terms.term_months);
    let total_interest = total_payment - terms.principal;

    let summary = LoanSummary {
        installment,
        total_payment,
        total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-Pay Amortisation (EMI)",
        terms,
        warnings,
        elapsed,
        summary,
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

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn standard_terms() -> LoanTerms {
        LoanTerms {
            principal: dec!(500_000),
            annual_rate_percent: dec!(10),
            term_months: 60,
        }
    }

    #[test]
    fn test_installment_standard_loan() {
        let installment = monthly_installment(&standard_terms()).unwrap();
        // 500k @ 10% over 60 months
        assert_close(installment, dec!(10623.52), TOL, "standard EMI");
    }

    #[test]
    fn test_loan_summary_totals() {
        let out = analyze_loan(&standard_terms()).unwrap();
        let s = &out.result;
        assert_close(s.total_payment, dec!(637411.36), dec!(1.0), "total payment");
        assert_close(s.total_interest, dec!(137411.36), dec!(1.0), "total interest");
        assert_eq!(
            s.total_payment - s.total_interest,
            standard_terms().principal
        );
    }

    #[test]
    fn test_zero_rate_divides_evenly() {
        let terms = LoanTerms {
            principal: dec!(120_000),
            annual_rate_percent: Decimal::ZERO,
            term_months: 24,
        };
        let installment = monthly_installment(&terms).unwrap();
        assert_eq!(installment, dec!(5000));
    }

    #[test]
    fn test_installment_covers_principal() {
        for (p, rate, n) in [
            (dec!(100_000), dec!(7.5), 36u32),
            (dec!(2_500_000), dec!(8.25), 240),
            (dec!(50_000), dec!(0), 12),
            (dec!(1_000_000), dec!(18), 84),
        ] {
            let terms = LoanTerms {
                principal: p,
                annual_rate_percent: rate,
                term_months: n,
            };
            let installment = monthly_installment(&terms).unwrap();
            assert!(installment > Decimal::ZERO);
            assert!(
                installment * Decimal::from(n) >= p,
                "total payment must cover principal for rate {rate}"
            );
        }
    }

    #[test]
    fn test_pure_function_identical_outputs() {
        let a = monthly_installment(&standard_terms()).unwrap();
        let b = monthly_installment(&standard_terms()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_validation_rejects_bad_fields() {
        let mut terms = standard_terms();
        terms.principal = Decimal::ZERO;
        assert!(matches!(
            monthly_installment(&terms),
            Err(FincalcError::InvalidInput { ref field, .. }) if field == "principal"
        ));

        let mut terms = standard_terms();
        terms.annual_rate_percent = dec!(-1);
        assert!(matches!(
            monthly_installment(&terms),
            Err(FincalcError::InvalidInput { ref field, .. }) if field == "annual_rate_percent"
        ));

        let mut terms = standard_terms();
        terms.term_months = 0;
        assert!(matches!(
            monthly_installment(&terms),
            Err(FincalcError::InvalidInput { ref field, .. }) if field == "term_months"
        ));
    }

    #[test]
    fn test_high_rate_draws_warning() {
        let mut terms = standard_terms();
        terms.annual_rate_percent = dec!(48);
        let out = analyze_loan(&terms).unwrap();
        assert!(!out.warnings.is_empty());
    }
}
