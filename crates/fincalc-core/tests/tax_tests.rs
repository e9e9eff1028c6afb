#![cfg(feature = "tax")]

use fincalc_core::tax::gst::{compute_gst, GstInput, GstMode};
use fincalc_core::tax::income_tax::{
    compute_income_tax, IncomeTaxInput, RebateRule, TaxSlab,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

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

// ===========================================================================
// GST
// ===========================================================================

#[test]
fn test_gst_rates_round_trip() {
    for rate in [dec!(5), dec!(12), dec!(18), dec!(28)] {
        let inclusive = GstInput {
            amount: dec!(11_800),
            rate_percent: rate,
            mode: GstMode::Inclusive,
        };
        let net = compute_gst(&inclusive).unwrap().result.net_amount;

        let exclusive = GstInput {
            amount: net,
            rate_percent: rate,
            mode: GstMode::Exclusive,
        };
        let out = compute_gst(&exclusive).unwrap().result;
        assert_close(
            out.gross_amount,
            dec!(11_800),
            dec!(0.000001),
            &format!("round trip at {rate}%"),
        );
        assert_eq!(out.central_gst + out.state_gst, out.tax_amount);
    }
}

#[test]
fn test_gst_eighteen_percent_split() {
    let input = GstInput {
        amount: dec!(10_000),
        rate_percent: dec!(18),
        mode: GstMode::Exclusive,
    };
    let out = compute_gst(&input).unwrap().result;
    assert_eq!(out.tax_amount, dec!(1_800));
    assert_eq!(out.central_gst, dec!(900));
    assert_eq!(out.state_gst, dec!(900));
    assert_eq!(out.gross_amount, dec!(11_800));
}

// ===========================================================================
// Income tax
// ===========================================================================

/// A progressive regime with a tax-free band, a rebate, and a 4% cess.
fn progressive_regime(gross: Decimal) -> IncomeTaxInput {
    IncomeTaxInput {
        gross_income: gross,
        deductions: dec!(50_000),
        slabs: vec![
            TaxSlab {
                up_to: Some(dec!(300_000)),
                rate_percent: Decimal::ZERO,
            },
            TaxSlab {
                up_to: Some(dec!(600_000)),
                rate_percent: dec!(5),
            },
            TaxSlab {
                up_to: Some(dec!(900_000)),
                rate_percent: dec!(10),
            },
            TaxSlab {
                up_to: Some(dec!(1_200_000)),
                rate_percent: dec!(15),
            },
            TaxSlab {
                up_to: Some(dec!(1_500_000)),
                rate_percent: dec!(20),
            },
            TaxSlab {
                up_to: None,
                rate_percent: dec!(30),
            },
        ],
        cess_percent: dec!(4),
        rebate: Some(RebateRule {
            income_limit: dec!(700_000),
            max_rebate: dec!(25_000),
        }),
    }
}

#[test]
fn test_mid_income_full_walk() {
    let out = compute_income_tax(&progressive_regime(dec!(1_250_000)))
        .unwrap()
        .result;
    assert_eq!(out.taxable_income, dec!(1_200_000));
    // 0 + 300k*5% + 300k*10% + 300k*15% = 90k
    assert_eq!(out.base_tax, dec!(90_000));
    assert_eq!(out.rebate_applied, Decimal::ZERO);
    assert_eq!(out.cess, dec!(3_600));
    assert_eq!(out.total_tax, dec!(93_600));
}

#[test]
fn test_rebate_band_pays_nothing() {
    let out = compute_income_tax(&progressive_regime(dec!(750_000)))
        .unwrap()
        .result;
    assert_eq!(out.taxable_income, dec!(700_000));
    // 300k*5% + 100k*10% = 25k, wiped by the rebate; no cess on nothing.
    assert_eq!(out.base_tax, dec!(25_000));
    assert_eq!(out.rebate_applied, dec!(25_000));
    assert_eq!(out.total_tax, Decimal::ZERO);
}

#[test]
fn test_just_above_rebate_band_pays_in_full() {
    let out = compute_income_tax(&progressive_regime(dec!(760_000)))
        .unwrap()
        .result;
    assert_eq!(out.taxable_income, dec!(710_000));
    assert_eq!(out.rebate_applied, Decimal::ZERO);
    // 300k*5% + 110k*10% = 26k, plus 4% cess
    assert_eq!(out.base_tax, dec!(26_000));
    assert_eq!(out.total_tax, dec!(27_040));
}

#[test]
fn test_top_slab_is_open_ended() {
    let out = compute_income_tax(&progressive_regime(dec!(5_050_000)))
        .unwrap()
        .result;
    assert_eq!(out.taxable_income, dec!(5_000_000));
    // 15k + 30k + 45k + 60k + 3.5M*30% = 1.2M
    assert_eq!(out.base_tax, dec!(1_200_000));
    let top = out.slab_breakdown.last().unwrap();
    assert_eq!(top.taxable, dec!(3_500_000));
    assert_eq!(top.up_to, None);
}

#[test]
fn test_effective_rate_reflects_gross_income() {
    let out = compute_income_tax(&progressive_regime(dec!(1_250_000)))
        .unwrap()
        .result;
    // 93,600 over 1.25M gross
    assert_close(
        out.effective_rate_percent,
        dec!(7.488),
        dec!(0.001),
        "effective rate",
    );
}
