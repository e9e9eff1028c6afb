use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::loan::amortisation::LoanTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::loan::amortisation::analyze_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_schedule(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::loan::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::loan::schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_prepayment(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::loan::prepayment::PrepaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::loan::prepayment::simulate_prepayment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Investments
// ---------------------------------------------------------------------------

#[napi]
pub fn project_accumulation(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::investment::sip::SipInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::investment::sip::project_accumulation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn plan_goal(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::investment::sip::GoalInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::investment::sip::plan_goal(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_deposit(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::investment::fixed_deposit::FdInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::investment::fixed_deposit::analyze_deposit(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_gst(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::tax::gst::GstInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::tax::gst::compute_gst(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compute_income_tax(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::tax::income_tax::IncomeTaxInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::tax::income_tax::compute_income_tax(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_trade(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::trade::profit_loss::TradeInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::trade::profit_loss::analyze_trade(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
