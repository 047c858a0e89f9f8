use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Request body shared by the discounting entry points.
#[derive(Debug, Deserialize)]
struct DiscountRequest {
    cash_flows: Vec<Decimal>,
    initial_investment: Decimal,
}

#[napi]
pub fn compute_cost_of_capital(input_json: String) -> NapiResult<String> {
    let input: capval_core::valuation::wacc::CapitalStructureInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        capval_core::valuation::wacc::compute_cost_of_capital(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn discount_cash_flows(input_json: String, rate: String) -> NapiResult<String> {
    let request: DiscountRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rate: Decimal = rate.parse().map_err(to_napi_error)?;
    let output = capval_core::valuation::dcf::discount_cash_flows(
        &request.cash_flows,
        rate,
        request.initial_investment,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn sweep_sensitivity(input_json: String, rates_json: String) -> NapiResult<String> {
    let request: DiscountRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rates: Vec<Decimal> = serde_json::from_str(&rates_json).map_err(to_napi_error)?;
    let output = capval_core::valuation::sensitivity::sweep_sensitivity(
        &request.cash_flows,
        request.initial_investment,
        &rates,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn find_breakeven_rate(input_json: String, low: String, high: String) -> NapiResult<String> {
    let request: DiscountRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let low: Decimal = low.parse().map_err(to_napi_error)?;
    let high: Decimal = high.parse().map_err(to_napi_error)?;
    let output = capval_core::valuation::sensitivity::find_breakeven_rate(
        &request.cash_flows,
        request.initial_investment,
        low,
        high,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
