use serde::Serialize;

use super::config::TaxYearConfig;
use super::error::EngineError;

/// Outcome of an amortization question: either a duration or "never", for
/// payments that do not even cover the accruing interest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Payoff {
    Months(f64),
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Horizon {
    Years(f64),
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireVariant {
    Standard,
    Lean,
    Fat,
    Barista { part_time_annual_income: f64 },
    Coast { years_until_retirement: f64 },
}

fn check_money(field: &'static str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidMoney { field, value });
    }
    Ok(())
}

/// Future value of a principal plus monthly contributions compounded annually.
pub fn future_value(
    principal: f64,
    monthly_contribution: f64,
    annual_rate_pct: f64,
    years: u32,
) -> Result<f64, EngineError> {
    check_money("principal", principal)?;
    check_money("monthly_contribution", monthly_contribution)?;

    let r = annual_rate_pct / 100.0;
    let annual = monthly_contribution * 12.0;
    if r == 0.0 {
        return Ok(principal + annual * years as f64);
    }

    let growth = (1.0 + r).powi(years as i32);
    Ok(principal * growth + annual * (growth - 1.0) / r)
}

/// Monthly contribution needed to grow `principal` to `target` over `years`.
/// Algebraic inverse of `future_value`; clamps at zero when the principal
/// alone already overshoots the target.
pub fn required_monthly_contribution(
    target: f64,
    principal: f64,
    annual_rate_pct: f64,
    years: u32,
) -> Result<f64, EngineError> {
    check_money("target", target)?;
    check_money("principal", principal)?;
    if years == 0 {
        return Err(EngineError::HorizonOutOfRange { years: 0 });
    }

    let r = annual_rate_pct / 100.0;
    if r == 0.0 {
        return Ok(((target - principal) / (12.0 * years as f64)).max(0.0));
    }

    let growth = (1.0 + r).powi(years as i32);
    let monthly = (target - principal * growth) * r / (12.0 * (growth - 1.0));
    Ok(monthly.max(0.0))
}

/// Rule of 72. Undefined for non-positive rates, so those are rejected
/// instead of returning infinity.
pub fn years_to_double(annual_rate_pct: f64) -> Result<f64, EngineError> {
    if !annual_rate_pct.is_finite() || annual_rate_pct <= 0.0 {
        return Err(EngineError::RateTooLow {
            name: "annual_rate_pct",
            min: 0.0,
            value: annual_rate_pct,
        });
    }
    Ok(72.0 / annual_rate_pct)
}

/// Years until savings cover 25x annual spending, as a function of the
/// savings rate alone. Breaks down at a 100 % savings rate (log of zero), so
/// the open interval is enforced at the boundary.
pub fn years_to_financial_independence(
    savings_rate_pct: f64,
    assumed_return_pct: f64,
) -> Result<f64, EngineError> {
    if !savings_rate_pct.is_finite() || savings_rate_pct <= 0.0 || savings_rate_pct >= 100.0 {
        return Err(EngineError::SavingsRateOutOfRange {
            value: savings_rate_pct,
        });
    }
    if !assumed_return_pct.is_finite() || assumed_return_pct <= 0.0 {
        return Err(EngineError::RateTooLow {
            name: "assumed_return_pct",
            min: 0.0,
            value: assumed_return_pct,
        });
    }

    let savings_rate = savings_rate_pct / 100.0;
    let r = assumed_return_pct / 100.0;
    Ok((1.0 / (1.0 - savings_rate)).ln() / (1.0 + r).ln())
}

/// Months until a debt is amortized by a fixed monthly payment.
pub fn debt_payoff_months(
    debt: f64,
    annual_rate_pct: f64,
    monthly_payment: f64,
) -> Result<Payoff, EngineError> {
    check_money("debt", debt)?;
    check_money("monthly_payment", monthly_payment)?;
    if !annual_rate_pct.is_finite() || annual_rate_pct < 0.0 {
        return Err(EngineError::RateTooLow {
            name: "annual_rate_pct",
            min: 0.0,
            value: annual_rate_pct,
        });
    }

    if debt == 0.0 {
        return Ok(Payoff::Months(0.0));
    }
    if monthly_payment <= 0.0 {
        return Ok(Payoff::Never);
    }

    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    if monthly_rate == 0.0 {
        return Ok(Payoff::Months(debt / monthly_payment));
    }

    let interest_per_month = debt * monthly_rate;
    if monthly_payment <= interest_per_month {
        return Ok(Payoff::Never);
    }

    let months =
        (monthly_payment / (monthly_payment - interest_per_month)).ln() / (1.0 + monthly_rate).ln();
    Ok(Payoff::Months(months))
}

/// Net-worth target for a FIRE variant: scaled annual expenses divided by the
/// configured safe-withdrawal rate. Coast discounts the standard target back
/// by the years the portfolio still has to compound.
pub fn fire_target(
    annual_expenses: f64,
    variant: FireVariant,
    expected_return_pct: f64,
    cfg: &TaxYearConfig,
) -> Result<f64, EngineError> {
    check_money("annual_expenses", annual_expenses)?;
    let swr = cfg.fire.safe_withdrawal_rate_pct / 100.0;

    let scaled_expenses = match variant {
        FireVariant::Standard | FireVariant::Coast { .. } => annual_expenses,
        FireVariant::Lean => annual_expenses * cfg.fire.lean_factor,
        FireVariant::Fat => annual_expenses * cfg.fire.fat_factor,
        FireVariant::Barista {
            part_time_annual_income,
        } => {
            check_money("part_time_annual_income", part_time_annual_income)?;
            (annual_expenses - part_time_annual_income).max(0.0)
        }
    };

    let target = scaled_expenses / swr;
    match variant {
        FireVariant::Coast {
            years_until_retirement,
        } => {
            if !years_until_retirement.is_finite() || years_until_retirement < 0.0 {
                return Err(EngineError::InvalidMoney {
                    field: "years_until_retirement",
                    value: years_until_retirement,
                });
            }
            let r = expected_return_pct / 100.0;
            if r <= -1.0 {
                return Err(EngineError::RateTooLow {
                    name: "expected_return_pct",
                    min: -100.0,
                    value: expected_return_pct,
                });
            }
            Ok(target / (1.0 + r).powf(years_until_retirement))
        }
        _ => Ok(target),
    }
}

/// Years until the current balance plus monthly contributions reach `target`,
/// solving the future-value equation for the exponent.
pub fn years_to_target(
    target: f64,
    current_balance: f64,
    monthly_contribution: f64,
    annual_rate_pct: f64,
) -> Result<Horizon, EngineError> {
    check_money("target", target)?;
    check_money("current_balance", current_balance)?;
    check_money("monthly_contribution", monthly_contribution)?;
    if !annual_rate_pct.is_finite() || annual_rate_pct < 0.0 {
        return Err(EngineError::RateTooLow {
            name: "annual_rate_pct",
            min: 0.0,
            value: annual_rate_pct,
        });
    }

    if current_balance >= target {
        return Ok(Horizon::Years(0.0));
    }

    let r = annual_rate_pct / 100.0;
    let annual = monthly_contribution * 12.0;

    if r == 0.0 {
        if annual <= 0.0 {
            return Ok(Horizon::Never);
        }
        return Ok(Horizon::Years((target - current_balance) / annual));
    }

    // current * g^n + annual * (g^n - 1) / r = target, solved for g^n.
    let flow_term = annual / r;
    let denominator = current_balance + flow_term;
    if denominator <= 0.0 {
        return Ok(Horizon::Never);
    }
    let ratio = (target + flow_term) / denominator;
    if ratio <= 1.0 {
        return Ok(Horizon::Years(0.0));
    }
    Ok(Horizon::Years(ratio.ln() / (1.0 + r).ln()))
}

/// Flat capital-gains tax above the saver's allowance, using the one shared
/// configuration value.
pub fn capital_gains_tax(realized_gain: f64, cfg: &TaxYearConfig) -> Result<f64, EngineError> {
    if !realized_gain.is_finite() {
        return Err(EngineError::InvalidMoney {
            field: "realized_gain",
            value: realized_gain,
        });
    }
    let taxable = (realized_gain - cfg.capital_gains.saver_allowance).max(0.0);
    Ok(taxable * cfg.capital_gains.flat_rate_pct / 100.0)
}
