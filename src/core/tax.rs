use serde::Serialize;

use super::config::{FilingStatus, Region, TaxClass, TaxYearConfig, ZoneFormula};
use super::error::EngineError;

#[derive(Debug, Clone)]
pub struct TaxInput {
    pub gross_annual_income: f64,
    pub filing_status: FilingStatus,
    /// Explicit wage-tax class. When absent the class is derived from the
    /// filing status: married filers get III, single parents II, everyone
    /// else I.
    pub tax_class: Option<TaxClass>,
    pub number_of_children: u32,
    pub include_church_tax: bool,
    pub resident_region: Option<Region>,
    pub age: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialContributions {
    pub pension: f64,
    pub health: f64,
    pub unemployment: f64,
    pub long_term_care: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxZoneLine {
    pub zone_name: String,
    pub range_label: String,
    pub rate_label: String,
    pub tax_amount_in_zone: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub gross_income: f64,
    pub income_tax: f64,
    pub solidarity_tax: f64,
    pub church_tax: f64,
    pub total_tax: f64,
    pub net_income: f64,
    pub effective_tax_rate_pct: f64,
    pub marginal_tax_rate_pct: f64,
    pub tax_free_allowance: f64,
    pub child_benefit_annual: f64,
    pub social_contributions: SocialContributions,
    pub tax_zone_breakdown: Vec<TaxZoneLine>,
}

/// Full tax and contribution breakdown for one fiscal year.
pub fn compute_tax(input: &TaxInput, cfg: &TaxYearConfig) -> Result<TaxResult, EngineError> {
    let gross = input.gross_annual_income;
    if !gross.is_finite() || gross < 0.0 {
        return Err(EngineError::InvalidMoney {
            field: "gross_annual_income",
            value: gross,
        });
    }

    let class = effective_tax_class(input);
    let factor = cfg.class_factor(class);

    let bracket_tax = income_tax_curve(gross, cfg);
    let adjusted_tax = bracket_tax * factor;

    // Solidarity applies only to the slice of the adjusted tax above the
    // threshold, never to gross income.
    let solidarity_tax =
        (adjusted_tax - cfg.solidarity_threshold).max(0.0) * cfg.solidarity_rate_pct / 100.0;

    let church_tax = if input.include_church_tax {
        adjusted_tax * cfg.church_rate_pct(input.resident_region) / 100.0
    } else {
        0.0
    };

    let social_contributions = social_contributions(gross, input, cfg);
    let child_benefit_annual =
        input.number_of_children as f64 * cfg.child_benefit_monthly * 12.0;

    let total_tax = adjusted_tax + solidarity_tax + church_tax;
    let mut net_income = gross - total_tax - social_contributions.total;
    if cfg.net_child_benefit {
        net_income += child_benefit_annual;
    }

    let effective_tax_rate_pct = if gross > 0.0 {
        total_tax / gross * 100.0
    } else {
        0.0
    };

    Ok(TaxResult {
        gross_income: gross,
        income_tax: adjusted_tax,
        solidarity_tax,
        church_tax,
        total_tax,
        net_income,
        effective_tax_rate_pct,
        marginal_tax_rate_pct: cfg.zone_for(gross).marginal_rate_pct,
        tax_free_allowance: cfg.tax_free_allowance,
        child_benefit_annual,
        social_contributions,
        tax_zone_breakdown: zone_breakdown(gross, factor, cfg),
    })
}

/// Per-month view of an annual result. Divides every monetary field by 12
/// instead of re-running the bracket math on a nominal monthly income, which
/// would misapply the progressive curve.
pub fn monthly_breakdown(annual: &TaxResult) -> TaxResult {
    TaxResult {
        gross_income: annual.gross_income / 12.0,
        income_tax: annual.income_tax / 12.0,
        solidarity_tax: annual.solidarity_tax / 12.0,
        church_tax: annual.church_tax / 12.0,
        total_tax: annual.total_tax / 12.0,
        net_income: annual.net_income / 12.0,
        effective_tax_rate_pct: annual.effective_tax_rate_pct,
        marginal_tax_rate_pct: annual.marginal_tax_rate_pct,
        tax_free_allowance: annual.tax_free_allowance / 12.0,
        child_benefit_annual: annual.child_benefit_annual / 12.0,
        social_contributions: SocialContributions {
            pension: annual.social_contributions.pension / 12.0,
            health: annual.social_contributions.health / 12.0,
            unemployment: annual.social_contributions.unemployment / 12.0,
            long_term_care: annual.social_contributions.long_term_care / 12.0,
            total: annual.social_contributions.total / 12.0,
        },
        tax_zone_breakdown: annual
            .tax_zone_breakdown
            .iter()
            .map(|line| TaxZoneLine {
                zone_name: line.zone_name.clone(),
                range_label: line.range_label.clone(),
                rate_label: line.rate_label.clone(),
                tax_amount_in_zone: line.tax_amount_in_zone / 12.0,
            })
            .collect(),
    }
}

fn effective_tax_class(input: &TaxInput) -> TaxClass {
    if let Some(class) = input.tax_class {
        return class;
    }
    match input.filing_status {
        FilingStatus::Married => TaxClass::III,
        FilingStatus::Single if input.number_of_children > 0 => TaxClass::II,
        FilingStatus::Single => TaxClass::I,
    }
}

/// Cumulative income tax at `income`, evaluated through the zone the income
/// falls into. Each zone's formula already encodes the tax accumulated in the
/// zones below it, so no summation is needed here.
fn income_tax_curve(income: f64, cfg: &TaxYearConfig) -> f64 {
    let zone = cfg.zone_for(income);
    zone_tax_at(income, zone.lower, zone.formula)
}

fn zone_tax_at(income: f64, zone_lower: f64, formula: ZoneFormula) -> f64 {
    match formula {
        ZoneFormula::Free => 0.0,
        ZoneFormula::Progressive {
            quadratic,
            linear,
            base,
            scale,
        } => {
            let y = (income - zone_lower) / scale;
            (quadratic * y + linear) * y + base
        }
        ZoneFormula::Linear { rate_pct, offset } => rate_pct / 100.0 * income - offset,
    }
}

/// Incremental tax contributed within each zone the income passes through,
/// scaled by the tax-class factor so the lines sum to the reported income tax.
fn zone_breakdown(income: f64, factor: f64, cfg: &TaxYearConfig) -> Vec<TaxZoneLine> {
    let mut lines = Vec::new();
    for zone in &cfg.zones {
        if income < zone.lower || (income == zone.lower && zone.lower > 0.0) {
            break;
        }
        let top = match zone.upper {
            Some(upper) => income.min(upper),
            None => income,
        };
        let below = income_tax_curve(zone.lower, cfg);
        let at_top = income_tax_curve(top, cfg);
        let range_label = match zone.upper {
            Some(upper) if zone.lower == 0.0 => format!("up to {upper:.0}"),
            Some(upper) => format!("{:.0} – {:.0}", zone.lower, upper),
            None => format!("above {:.0}", zone.lower),
        };
        lines.push(TaxZoneLine {
            zone_name: zone.name.to_string(),
            range_label,
            rate_label: zone.rate_label.to_string(),
            tax_amount_in_zone: (at_top - below).max(0.0) * factor,
        });
    }
    lines
}

fn social_contributions(
    gross: f64,
    input: &TaxInput,
    cfg: &TaxYearConfig,
) -> SocialContributions {
    let rates = &cfg.social;
    let childless_surcharge = if input.number_of_children == 0
        && input.age >= rates.childless_surcharge_min_age
    {
        rates.childless_care_surcharge_pct
    } else {
        0.0
    };
    let care_pct = rates.long_term_care_pct + childless_surcharge;

    let pension = gross * rates.pension_pct / 100.0;
    let health = gross * rates.health_pct / 100.0;
    let unemployment = gross * rates.unemployment_pct / 100.0;
    let long_term_care = gross * care_pct / 100.0;

    SocialContributions {
        pension,
        health,
        unemployment,
        long_term_care,
        total: pension + health + unemployment + long_term_care,
    }
}
