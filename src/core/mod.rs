mod calculators;
mod config;
mod error;
mod projection;
mod tax;

pub use calculators::{
    FireVariant, Horizon, Payoff, capital_gains_tax, debt_payoff_months, fire_target,
    future_value, required_monthly_contribution, years_to_double,
    years_to_financial_independence, years_to_target,
};
pub use config::{
    CapitalGainsConfig, FilingStatus, FireFactors, Region, SocialRates, TaxClass, TaxYearConfig,
    TaxZone, ZoneFormula,
};
pub use error::EngineError;
pub use projection::{
    MAX_PROJECTION_YEARS, Milestone, MilestoneTarget, ProjectionInput, ProjectionSummary,
    YearSnapshot, project, resolve_milestones, summarize,
};
pub use tax::{
    SocialContributions, TaxInput, TaxResult, TaxZoneLine, compute_tax, monthly_breakdown,
};
