use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FincalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::FincalcResult;

const PERCENT: Decimal = dec!(100);
const TWO: Decimal = dec!(2);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Whether the entered amount already contains the tax.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum GstMode {
    /// Amount is the net price; tax is added on top.
    Exclusive,
    /// Amount is the gross price; tax is backed out.
    Inclusive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GstInput {
    pub amount: Money,
    /// GST rate as entered (18 = 18%).
    pub rate_percent: Percent,
    pub mode: GstMode,
}

/// Net/tax/gross decomposition with the central/state split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GstBreakdown {
    pub net_amount: Money,
    pub tax_amount: Money,
    pub gross_amount: Money,
    /// Central half of the tax (CGST).
    pub central_gst: Money,
    /// State half of the tax (SGST).
    pub state_gst: Money,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Decompose an amount into net, tax, and gross under the given mode.
pub fn compute_gst(input: &GstInput) -> FincalcResult<ComputationOutput<GstBreakdown>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.amount <= Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "amount".into(),
            reason: "Amount must be positive".into(),
        });
    }
    if input.rate_percent < Decimal::ZERO {
        return Err(FincalcError::InvalidInput {
            field: "rate_percent".into(),
            reason: "Rate cannot be negative".into(),
        });
    }
    if input.rate_percent > PERCENT {
        warnings.push(format!(
            "GST rate of {}% exceeds 100%",
            input.rate_percent
        ));
    }

    let rate = input.rate_percent / PERCENT;
    let (net_amount, tax_amount, gross_amount) = match input.mode {
        GstMode::Exclusive => {
            let tax = input.amount * rate;
            (input.amount, tax, input.amount + tax)
        }
        GstMode::Inclusive => {
            let net = input.amount / (Decimal::ONE + rate);
            (net, input.amount - net, input.amount)
        }
    };

    let central_gst = tax_amount / TWO;
    let breakdown = GstBreakdown {
        net_amount,
        tax_amount,
        gross_amount,
        central_gst,
        state_gst: tax_amount - central_gst,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "GST Decomposition",
        input,
        warnings,
        elapsed,
        breakdown,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
