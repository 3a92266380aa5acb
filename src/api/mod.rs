use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    EngineError, FilingStatus, FireVariant, Horizon, Milestone, MilestoneTarget, Payoff,
    ProjectionInput, ProjectionSummary, Region, TaxClass, TaxInput, TaxResult, TaxYearConfig,
    YearSnapshot, capital_gains_tax, compute_tax, debt_payoff_months, fire_target, future_value,
    monthly_breakdown, project, required_monthly_contribution, resolve_milestones, summarize,
    years_to_double, years_to_financial_independence, years_to_target,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFilingStatus {
    Single,
    Married,
}

impl From<ApiFilingStatus> for FilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Single => FilingStatus::Single,
            ApiFilingStatus::Married => FilingStatus::Married,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
enum ApiTaxClass {
    #[serde(rename = "1", alias = "i")]
    I,
    #[serde(rename = "2", alias = "ii")]
    II,
    #[serde(rename = "3", alias = "iii")]
    III,
    #[serde(rename = "4", alias = "iv")]
    IV,
    #[serde(rename = "5", alias = "v")]
    V,
    #[serde(rename = "6", alias = "vi")]
    VI,
}

impl From<ApiTaxClass> for TaxClass {
    fn from(value: ApiTaxClass) -> Self {
        match value {
            ApiTaxClass::I => TaxClass::I,
            ApiTaxClass::II => TaxClass::II,
            ApiTaxClass::III => TaxClass::III,
            ApiTaxClass::IV => TaxClass::IV,
            ApiTaxClass::V => TaxClass::V,
            ApiTaxClass::VI => TaxClass::VI,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRegion {
    #[serde(alias = "badenWuerttemberg", alias = "baden_wuerttemberg")]
    BadenWuerttemberg,
    Bavaria,
    Other,
}

impl From<ApiRegion> for Region {
    fn from(value: ApiRegion) -> Self {
        match value {
            ApiRegion::BadenWuerttemberg => Region::BadenWuerttemberg,
            ApiRegion::Bavaria => Region::Bavaria,
            ApiRegion::Other => Region::Other,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    gross_annual_income: Option<f64>,
    filing_status: Option<ApiFilingStatus>,
    tax_class: Option<ApiTaxClass>,
    number_of_children: Option<u32>,
    include_church_tax: Option<bool>,
    resident_region: Option<ApiRegion>,
    age: Option<u32>,
    fiscal_year: Option<u32>,
    monthly: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaxResponse {
    fiscal_year: u32,
    annual: TaxResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    monthly: Option<TaxResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MilestonePayload {
    target_net_worth: Option<f64>,
    label: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    current_cash_savings: Option<f64>,
    current_investments: Option<f64>,
    current_debt: Option<f64>,
    monthly_expenses: Option<f64>,
    monthly_investment_contribution: Option<f64>,
    monthly_debt_payment: Option<f64>,
    expected_annual_return: Option<f64>,
    annual_inflation: Option<f64>,
    projection_years: Option<u32>,
    starting_age: Option<u32>,
    milestones: Option<Vec<MilestonePayload>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    years: Vec<YearSnapshot>,
    summary: ProjectionSummary,
    milestones: Vec<Milestone>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum CalcOp {
    #[serde(alias = "compoundGrowth")]
    CompoundGrowth,
    #[serde(alias = "requiredContribution")]
    RequiredContribution,
    #[serde(alias = "yearsToDouble")]
    YearsToDouble,
    #[serde(alias = "savingsRateYears")]
    SavingsRateYears,
    #[serde(alias = "debtPayoff")]
    DebtPayoff,
    #[serde(alias = "fireTarget")]
    FireTarget,
    #[serde(alias = "yearsToTarget")]
    YearsToTarget,
    #[serde(alias = "capitalGains")]
    CapitalGains,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFireVariant {
    Standard,
    Lean,
    Fat,
    Barista,
    Coast,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalcPayload {
    op: Option<CalcOp>,
    principal: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_rate: Option<f64>,
    years: Option<u32>,
    target: Option<f64>,
    savings_rate: Option<f64>,
    debt: Option<f64>,
    monthly_payment: Option<f64>,
    annual_expenses: Option<f64>,
    fire_variant: Option<ApiFireVariant>,
    part_time_annual_income: Option<f64>,
    years_until_retirement: Option<f64>,
    current_balance: Option<f64>,
    realized_gain: Option<f64>,
    fiscal_year: Option<u32>,
}

/// One calculator answer. `value` is absent exactly when the sentinel says
/// the goal is unreachable.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalcResponse {
    op: CalcOp,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    never: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    println!("kompass engine listening on http://{addr}");

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route("/api/tax", get(tax_get_handler).post(tax_post_handler))
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route(
            "/api/calculators",
            get(calc_get_handler).post(calc_post_handler),
        )
        .fallback(not_found_handler)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn tax_get_handler(Query(payload): Query<TaxPayload>) -> Response {
    tax_handler_impl(payload)
}

async fn tax_post_handler(Json(payload): Json<TaxPayload>) -> Response {
    tax_handler_impl(payload)
}

fn tax_handler_impl(payload: TaxPayload) -> Response {
    match tax_response_from_payload(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn tax_response_from_payload(payload: TaxPayload) -> Result<TaxResponse, String> {
    let gross = payload
        .gross_annual_income
        .ok_or_else(|| "grossAnnualIncome is required".to_string())?;
    let cfg = TaxYearConfig::for_year(payload.fiscal_year.unwrap_or(2024))
        .map_err(|e| e.to_string())?;

    let input = TaxInput {
        gross_annual_income: gross,
        filing_status: payload
            .filing_status
            .map(Into::into)
            .unwrap_or(FilingStatus::Single),
        tax_class: payload.tax_class.map(Into::into),
        number_of_children: payload.number_of_children.unwrap_or(0),
        include_church_tax: payload.include_church_tax.unwrap_or(false),
        resident_region: payload.resident_region.map(Into::into),
        age: payload.age.unwrap_or(30),
    };

    let annual = compute_tax(&input, &cfg).map_err(|e| e.to_string())?;
    let monthly = payload
        .monthly
        .unwrap_or(false)
        .then(|| monthly_breakdown(&annual));

    Ok(TaxResponse {
        fiscal_year: cfg.fiscal_year,
        annual,
        monthly,
    })
}

async fn projection_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

async fn projection_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

fn projection_handler_impl(payload: ProjectionPayload) -> Response {
    match projection_response_from_payload(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn projection_response_from_payload(
    payload: ProjectionPayload,
) -> Result<ProjectionResponse, String> {
    let input = ProjectionInput {
        current_cash_savings: payload.current_cash_savings.unwrap_or(0.0),
        current_investments: payload.current_investments.unwrap_or(0.0),
        current_debt: payload.current_debt.unwrap_or(0.0),
        monthly_expenses: payload.monthly_expenses.unwrap_or(0.0),
        monthly_investment_contribution: payload.monthly_investment_contribution.unwrap_or(0.0),
        monthly_debt_payment: payload.monthly_debt_payment.unwrap_or(0.0),
        expected_annual_return_pct: payload.expected_annual_return.unwrap_or(7.0),
        annual_inflation_pct: payload.annual_inflation.unwrap_or(2.0),
        projection_years: payload.projection_years.unwrap_or(30),
        starting_age: payload.starting_age.unwrap_or(30),
    };

    let years = project(&input).map_err(|e| e.to_string())?;
    let summary = summarize(&years);

    let targets = payload
        .milestones
        .unwrap_or_default()
        .into_iter()
        .map(|milestone| {
            let target = milestone
                .target_net_worth
                .ok_or_else(|| "milestones[].targetNetWorth is required".to_string())?;
            Ok(MilestoneTarget {
                target_net_worth: target,
                label: milestone.label.unwrap_or_else(|| format!("{target:.0}")),
            })
        })
        .collect::<Result<Vec<_>, String>>()?;
    let milestones = resolve_milestones(&years, &targets);

    Ok(ProjectionResponse {
        years,
        summary,
        milestones,
    })
}

async fn calc_get_handler(Query(payload): Query<CalcPayload>) -> Response {
    calc_handler_impl(payload)
}

async fn calc_post_handler(Json(payload): Json<CalcPayload>) -> Response {
    calc_handler_impl(payload)
}

fn calc_handler_impl(payload: CalcPayload) -> Response {
    match calc_response_from_payload(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn calc_response_from_payload(payload: CalcPayload) -> Result<CalcResponse, String> {
    let op = payload.op.ok_or_else(|| "op is required".to_string())?;
    let engine = |e: EngineError| e.to_string();

    let response = |value: f64| CalcResponse {
        op,
        value: Some(value),
        never: false,
    };

    match op {
        CalcOp::CompoundGrowth => {
            let value = future_value(
                payload.principal.unwrap_or(0.0),
                payload.monthly_contribution.unwrap_or(0.0),
                payload.annual_rate.unwrap_or(7.0),
                payload.years.unwrap_or(10),
            )
            .map_err(engine)?;
            Ok(response(value))
        }
        CalcOp::RequiredContribution => {
            let target = payload
                .target
                .ok_or_else(|| "target is required".to_string())?;
            let value = required_monthly_contribution(
                target,
                payload.principal.unwrap_or(0.0),
                payload.annual_rate.unwrap_or(7.0),
                payload.years.unwrap_or(10),
            )
            .map_err(engine)?;
            Ok(response(value))
        }
        CalcOp::YearsToDouble => {
            let value = years_to_double(payload.annual_rate.unwrap_or(7.0)).map_err(engine)?;
            Ok(response(value))
        }
        CalcOp::SavingsRateYears => {
            let rate = payload
                .savings_rate
                .ok_or_else(|| "savingsRate is required".to_string())?;
            let value =
                years_to_financial_independence(rate, payload.annual_rate.unwrap_or(5.0))
                    .map_err(engine)?;
            Ok(response(value))
        }
        CalcOp::DebtPayoff => {
            let debt = payload.debt.ok_or_else(|| "debt is required".to_string())?;
            let payoff = debt_payoff_months(
                debt,
                payload.annual_rate.unwrap_or(0.0),
                payload.monthly_payment.unwrap_or(0.0),
            )
            .map_err(engine)?;
            Ok(match payoff {
                Payoff::Months(months) => response(months),
                Payoff::Never => CalcResponse {
                    op,
                    value: None,
                    never: true,
                },
            })
        }
        CalcOp::FireTarget => {
            let expenses = payload
                .annual_expenses
                .ok_or_else(|| "annualExpenses is required".to_string())?;
            let variant = match payload.fire_variant.unwrap_or(ApiFireVariant::Standard) {
                ApiFireVariant::Standard => FireVariant::Standard,
                ApiFireVariant::Lean => FireVariant::Lean,
                ApiFireVariant::Fat => FireVariant::Fat,
                ApiFireVariant::Barista => FireVariant::Barista {
                    part_time_annual_income: payload.part_time_annual_income.unwrap_or(0.0),
                },
                ApiFireVariant::Coast => FireVariant::Coast {
                    years_until_retirement: payload.years_until_retirement.unwrap_or(0.0),
                },
            };
            let cfg = TaxYearConfig::for_year(payload.fiscal_year.unwrap_or(2024))
                .map_err(engine)?;
            let value = fire_target(expenses, variant, payload.annual_rate.unwrap_or(7.0), &cfg)
                .map_err(engine)?;
            Ok(response(value))
        }
        CalcOp::YearsToTarget => {
            let target = payload
                .target
                .ok_or_else(|| "target is required".to_string())?;
            let horizon = years_to_target(
                target,
                payload.current_balance.unwrap_or(0.0),
                payload.monthly_contribution.unwrap_or(0.0),
                payload.annual_rate.unwrap_or(7.0),
            )
            .map_err(engine)?;
            Ok(match horizon {
                Horizon::Years(years) => response(years),
                Horizon::Never => CalcResponse {
                    op,
                    value: None,
                    never: true,
                },
            })
        }
        CalcOp::CapitalGains => {
            let gain = payload
                .realized_gain
                .ok_or_else(|| "realizedGain is required".to_string())?;
            let cfg = TaxYearConfig::for_year(payload.fiscal_year.unwrap_or(2024))
                .map_err(engine)?;
            let value = capital_gains_tax(gain, &cfg).map_err(engine)?;
            Ok(response(value))
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
