//! Slab-based income tax.
//!
//! Walks a caller-supplied progressive slab table; no jurisdiction's table is
//! hard-coded. Supports a flat deduction, a rebate rule for incomes under a
//! threshold, and a cess applied after the rebate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FincalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::FincalcResult;

const PERCENT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One progressive slab. `up_to = None` marks the open-ended top slab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSlab {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<Money>,
    pub rate_percent: Percent,
}

/// Tax fully rebated (up to `max_rebate`) when taxable income is at or below
/// `income_limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebateRule {
    pub income_limit: Money,
    pub max_rebate: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeTaxInput {
    pub gross_income: Money,
    /// Total deductions (standard deduction and the rest) taken off the top.
    #[serde(default)]
    pub deductions: Money,
    pub slabs: Vec<TaxSlab>,
    #[serde(default)]
    pub cess_percent: Percent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebate: Option<RebateRule>,
}

/// Tax attributed to one slab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlabTax {
    pub from: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<Money>,
    pub rate_percent: Percent,
    pub taxable: Money,
    pub tax: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeTaxOutcome {
    pub taxable_income: Money,
    pub slab_breakdown: Vec<SlabTax>,
    pub base_tax: Money,
    pub rebate_applied: Money,
    pub cess: Money,
    pub total_tax: Money,
    /// Total tax over gross income.
    pub effective_rate_percent: Percent,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

fn validate(input: &IncomeTaxInput) -> FincalcResult<()> {
    if input.gross_income <= Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "gross_income".into(),
            reason: "Income must be positive".into(),
        });
    }
    if input.deductions < Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "deductions".into(),
            reason: "Deductions cannot be negative".into(),
        });
    }
    if input.cess_percent < Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "cess_percent".into(),
            reason: "Cess cannot be negative".into(),
        });
    }
    if input.slabs.is_empty() {
        return Err(FincalcError::InvalidInput {
            field: "slabs".into(),
            reason: "At least one slab is required".into(),
        });
    }

    let mut previous: Option<Money> = None;
    for (i, slab) in input.slabs.iter().enumerate() {
        if slab.rate_percent < Decimal::ZERO {
            return Err(FincalcError::InvalidInput {
                field: format!("slabs[{i}].rate_percent"),
                reason: "Rate cannot be negative".into(),
            });
        }
        match slab.up_to {
            Some(upper) => {
                if i == input.slabs.len() - 1 {
                    return Err(FincalcError::InvalidInput {
                        field: format!("slabs[{i}].up_to"),
                        reason: "The final slab must be open-ended".into(),
                    });
                }
                if let Some(prev) = previous {
                    if upper <= prev {
                        return Err(FincalcError::InvalidInput {
                            field: format!("slabs[{i}].up_to"),
                            reason: "Slab thresholds must be strictly increasing".into(),
                        });
                    }
                }
                previous = Some(upper);
            }
            None => {
                if i != input.slabs.len() - 1 {
                    return Err(FincalcError::InvalidInput {
                        field: format!("slabs[{i}].up_to"),
                        reason: "Only the final slab may be open-ended".into(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Compute tax over a progressive slab table, then rebate and cess.
pub fn compute_income_tax(
    input: &IncomeTaxInput,
) -> FincalcResult<ComputationOutput<IncomeTaxOutcome>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    if input.deductions >= input.gross_income {
        warnings.push("Deductions meet or exceed gross income; nothing is taxable".into());
    }
    let taxable_income = (input.gross_income - input.deductions).max(Decimal::ZERO);

    let mut slab_breakdown: Vec<SlabTax> = Vec::new();
    let mut base_tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;

    for slab in &input.slabs {
        if lower >= taxable_income {
            break;
        }
        let span_top = match slab.up_to {
            Some(upper) => upper.min(taxable_income),
            None => taxable_income,
        };
        let taxable = span_top - lower;
        let tax = taxable * slab.rate_percent / PERCENT;
        base_tax += tax;

        slab_breakdown.push(SlabTax {
            from: lower,
            up_to: slab.up_to,
            rate_percent: slab.rate_percent,
            taxable,
            tax,
        });

        lower = span_top;
    }

    let rebate_applied = match &input.rebate {
        Some(rule) if taxable_income <= rule.income_limit => base_tax.min(rule.max_rebate),
        _ => Decimal::ZERO,
    };

    let after_rebate = base_tax - rebate_applied;
    let cess = after_rebate * input.cess_percent / PERCENT;
    let total_tax = after_rebate + cess;
    let effective_rate_percent = total_tax / input.gross_income * PERCENT;

    let outcome = IncomeTaxOutcome {
        taxable_income,
        slab_breakdown,
        base_tax,
        rebate_applied,
        cess,
        total_tax,
        effective_rate_percent,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Progressive Slab Income Tax",
        input,
        warnings,
        elapsed,
        outcome,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// A three-slab progressive table: 0% to 300k, 10% to 700k, 20% above.
    fn sample_slabs() -> Vec<TaxSlab> {
        vec![
            TaxSlab {
                up_to: Some(dec!(300_000)),
                rate_percent: Decimal::ZERO,
            },
            TaxSlab {
                up_to: Some(dec!(700_000)),
                rate_percent: dec!(10),
            },
            TaxSlab {
                up_to: None,
                rate_percent: dec!(20),
            },
        ]
    }

    fn sample_input(gross: Decimal) -> IncomeTaxInput {
        IncomeTaxInput {
            gross_income: gross,
            deductions: Decimal::ZERO,
            slabs: sample_slabs(),
            cess_percent: dec!(4),
            rebate: None,
        }
    }

    #[test]
    fn test_marginal_slab_walk() {
        let out = compute_income_tax(&sample_input(dec!(1_000_000))).unwrap().result;
        // 0 + 400k * 10% + 300k * 20% = 100k
        assert_eq!(out.base_tax, dec!(100_000));
        assert_eq!(out.cess, dec!(4_000));
        assert_eq!(out.total_tax, dec!(104_000));
        assert_eq!(out.slab_breakdown.len(), 3);
        assert_eq!(out.slab_breakdown[1].taxable, dec!(400_000));
    }

    #[test]
    fn test_slab_boundary_income() {
        // Income exactly at a threshold taxes identically from either side.
        let at = compute_income_tax(&sample_input(dec!(700_000))).unwrap().result;
        assert_eq!(at.base_tax, dec!(40_000));
        let above = compute_income_tax(&sample_input(dec!(700_001))).unwrap().result;
        assert_eq!(above.base_tax, dec!(40_000.2));
    }

    #[test]
    fn test_income_within_free_slab() {
        let out = compute_income_tax(&sample_input(dec!(250_000))).unwrap().result;
        assert_eq!(out.base_tax, Decimal::ZERO);
        assert_eq!(out.total_tax, Decimal::ZERO);
        assert_eq!(out.slab_breakdown.len(), 1);
    }

    #[test]
    fn test_deductions_reduce_taxable_income() {
        let mut input = sample_input(dec!(800_000));
        input.deductions = dec!(100_000);
        let out = compute_income_tax(&input).unwrap().result;
        assert_eq!(out.taxable_income, dec!(700_000));
        assert_eq!(out.base_tax, dec!(40_000));
    }

    #[test]
    fn test_rebate_zeroes_tax_below_limit() {
        let mut input = sample_input(dec!(650_000));
        input.rebate = Some(RebateRule {
            income_limit: dec!(700_000),
            max_rebate: dec!(50_000),
        });
        let out = compute_income_tax(&input).unwrap().result;
        assert_eq!(out.base_tax, dec!(35_000));
        assert_eq!(out.rebate_applied, dec!(35_000));
        assert_eq!(out.cess, Decimal::ZERO); // cess applies after the rebate
        assert_eq!(out.total_tax, Decimal::ZERO);
    }

    #[test]
    fn test_rebate_not_applied_above_limit() {
        let mut input = sample_input(dec!(750_000));
        input.rebate = Some(RebateRule {
            income_limit: dec!(700_000),
            max_rebate: dec!(50_000),
        });
        let out = compute_income_tax(&input).unwrap().result;
        assert_eq!(out.rebate_applied, Decimal::ZERO);
        assert!(out.total_tax > Decimal::ZERO);
    }

    #[test]
    fn test_effective_rate() {
        let out = compute_income_tax(&sample_input(dec!(1_000_000))).unwrap().result;
        assert_eq!(out.effective_rate_percent, dec!(10.4));
    }

    #[test]
    fn test_slab_table_validation() {
        // Final slab must be open-ended.
        let mut input = sample_input(dec!(500_000));
        input.slabs = vec![TaxSlab {
            up_to: Some(dec!(300_000)),
            rate_percent: Decimal::ZERO,
        }];
        assert!(compute_income_tax(&input).is_err());

        // Thresholds must increase.
        let mut input = sample_input(dec!(500_000));
        input.slabs = vec![
            TaxSlab {
                up_to: Some(dec!(300_000)),
                rate_percent: Decimal::ZERO,
            },
            TaxSlab {
                up_to: Some(dec!(200_000)),
                rate_percent: dec!(10),
            },
            TaxSlab {
                up_to: None,
                rate_percent: dec!(20),
            },
        ];
        assert!(compute_income_tax(&input).is_err());

        // Open-ended slab only at the end.
        let mut input = sample_input(dec!(500_000));
        input.slabs = vec![
            TaxSlab {
                up_to: None,
                rate_percent: Decimal::ZERO,
            },
            TaxSlab {
                up_to: None,
                rate_percent: dec!(10),
            },
        ];
        assert!(compute_income_tax(&input).is_err());
    }

    #[test]
    fn test_deductions_exceeding_income() {
        let mut input = sample_input(dec!(400_000));
        input.deductions = dec!(500_000);
        let out = compute_income_tax(&input).unwrap();
        assert!(!out.warnings.is_empty());
        assert_eq!(out.result.taxable_income, Decimal::ZERO);
        assert_eq!(out.result.total_tax, Decimal::ZERO);
    }
}
