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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeResult {
    Profit,
    Loss,
    BreakEven,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeInput {
    /// Cost price per unit.
    pub cost_price: Money,
    /// Selling price per unit.
    pub selling_price: Money,
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub outcome: TradeResult,
    /// Absolute profit or loss; the sign lives in `outcome`.
    pub amount: Money,
    pub total_cost: Money,
    pub total_sale: Money,
    /// Profit/loss over total cost (markup).
    pub return_on_cost_percent: Percent,
    /// Profit/loss over total sale (margin); zero when nothing was sold for.
    pub margin_on_sale_percent: Percent,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Profit or loss on a buy/sell pair.
pub fn analyze_trade(input: &TradeInput) -> FincalcResult<ComputationOutput<TradeOutcome>> {
    let start = Instant::now();

    if input.cost_price <= Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "cost_price".into(),
            reason: "Cost price must be positive".into(),
        });
    }
    if input.selling_price < Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "selling_price".into(),
            reason: "Selling price cannot be negative".into(),
        });
    }
    if input.quantity <= Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "quantity".into(),
            reason: "Quantity must be positive".into(),
        });
    }

    let total_cost = input.cost_price * input.quantity;
    let total_sale = input.selling_price * input.quantity;
    let difference = total_sale - total_cost;

    let outcome = if difference > Decimal::ZERO {
        TradeResult::Profit
    } else if difference < Decimal::ZERO {
        TradeResult::Loss
    } else {
        TradeResult::BreakEven
    };

    let amount = difference.abs();
    let return_on_cost_percent = amount / total_cost * PERCENT;
    let margin_on_sale_percent = if total_sale.is_zero() {
        Decimal::ZERO
    } else {
        amount / total_sale * PERCENT
    };

    let result = TradeOutcome {
        outcome,
        amount,
        total_cost,
        total_sale,
        return_on_cost_percent,
        margin_on_sale_percent,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Profit & Loss",
        input,
        Vec::new(),
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_profit() {
        let input = TradeInput {
            cost_price: dec!(100),
            selling_price: dec!(125),
            quantity: dec!(4),
        };
        let out = analyze_trade(&input).unwrap().result;
        assert_eq!(out.outcome, TradeResult::Profit);
        assert_eq!(out.amount, dec!(100));
        assert_eq!(out.total_cost, dec!(400));
        assert_eq!(out.return_on_cost_percent, dec!(25));
        assert_eq!(out.margin_on_sale_percent, dec!(20));
    }

    #[test]
    fn test_loss() {
        let input = TradeInput {
            cost_price: dec!(200),
            selling_price: dec!(150),
            quantity: Decimal::ONE,
        };
        let out = analyze_trade(&input).unwrap().result;
        assert_eq!(out.outcome, TradeResult::Loss);
        assert_eq!(out.amount, dec!(50));
        assert_eq!(out.return_on_cost_percent, dec!(25));
    }

    #[test]
    fn test_break_even() {
        let input = TradeInput {
            cost_price: dec!(75),
            selling_price: dec!(75),
            quantity: dec!(10),
        };
        let out = analyze_trade(&input).unwrap().result;
        assert_eq!(out.outcome, TradeResult::BreakEven);
        assert_eq!(out.amount, Decimal::ZERO);
        assert_eq!(out.return_on_cost_percent, Decimal::ZERO);
    }

    #[test]
    fn test_total_write_off() {
        let input = TradeInput {
            cost_price: dec!(80),
            selling_price: Decimal::ZERO,
            quantity: Decimal::ONE,
        };
        let out = analyze_trade(&input).unwrap().result;
        assert_eq!(out.outcome, TradeResult::Loss);
        assert_eq!(out.return_on_cost_percent, dec!(100));
        assert_eq!(out.margin_on_sale_percent, Decimal::ZERO);
    }

    #[test]
    fn test_validation_errors() {
        let input = TradeInput {
            cost_price: Decimal::ZERO,
            selling_price: dec!(10),
            quantity: Decimal::ONE,
        };
        assert!(analyze_trade(&input).is_err());

        let input = TradeInput {
            cost_price: dec!(10),
            selling_price: dec!(10),
            quantity: Decimal::ZERO,
        };
        assert!(analyze_trade(&input).is_err());
    }
}
