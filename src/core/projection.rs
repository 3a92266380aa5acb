use serde::Serialize;

use super::error::EngineError;

pub const MAX_PROJECTION_YEARS: u32 = 50;

#[derive(Debug, Clone)]
pub struct ProjectionInput {
    pub current_cash_savings: f64,
    pub current_investments: f64,
    pub current_debt: f64,
    /// Informational only; carried so callers can round-trip their form state
    /// through the engine, never used in the arithmetic.
    pub monthly_expenses: f64,
    pub monthly_investment_contribution: f64,
    pub monthly_debt_payment: f64,
    pub expected_annual_return_pct: f64,
    pub annual_inflation_pct: f64,
    pub projection_years: u32,
    pub starting_age: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSnapshot {
    pub year: u32,
    pub age: u32,
    pub nominal_net_worth: f64,
    pub real_net_worth: f64,
    pub investments_balance: f64,
    pub remaining_debt: f64,
    pub cumulative_contributions: f64,
    pub cumulative_growth: f64,
}

#[derive(Debug, Clone)]
pub struct MilestoneTarget {
    pub target_net_worth: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub label: String,
    pub target_net_worth: f64,
    pub reached_in_year: Option<u32>,
    pub reached_at_age: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub final_nominal_net_worth: f64,
    pub final_real_net_worth: f64,
    pub total_contributions: f64,
    pub total_growth: f64,
    pub debt_free_year: Option<u32>,
}

/// Year-by-year evolution of net worth, one snapshot per year including the
/// year-0 baseline. Annual stepping is deliberate: growth compounds once per
/// year and the fresh contribution only starts growing the following year.
pub fn project(input: &ProjectionInput) -> Result<Vec<YearSnapshot>, EngineError> {
    validate(input)?;

    let r = input.expected_annual_return_pct / 100.0;
    let inflation = input.annual_inflation_pct / 100.0;
    let annual_contribution = input.monthly_investment_contribution * 12.0;
    let annual_debt_payment = input.monthly_debt_payment * 12.0;

    let mut investments = input.current_investments;
    let mut debt = input.current_debt;
    let mut cumulative_contributions = 0.0;
    let mut cumulative_growth = 0.0;

    let mut snapshots = Vec::with_capacity(input.projection_years as usize + 1);
    snapshots.push(snapshot(input, 0, investments, debt, 0.0, 0.0, inflation));

    for year in 1..=input.projection_years {
        let growth = investments * r;
        investments = investments * (1.0 + r) + annual_contribution;
        cumulative_contributions += annual_contribution;
        cumulative_growth += growth;

        debt = (debt - annual_debt_payment.min(debt)).max(0.0);

        snapshots.push(snapshot(
            input,
            year,
            investments,
            debt,
            cumulative_contributions,
            cumulative_growth,
            inflation,
        ));
    }

    Ok(snapshots)
}

/// First year each target is reached, scanning forward so an early qualifying
/// year wins even if net worth later dips below the target again.
pub fn resolve_milestones(snapshots: &[YearSnapshot], targets: &[MilestoneTarget]) -> Vec<Milestone> {
    targets
        .iter()
        .map(|target| {
            let hit = snapshots
                .iter()
                .find(|snap| snap.nominal_net_worth >= target.target_net_worth);
            Milestone {
                label: target.label.clone(),
                target_net_worth: target.target_net_worth,
                reached_in_year: hit.map(|snap| snap.year),
                reached_at_age: hit.map(|snap| snap.age),
            }
        })
        .collect()
}

pub fn summarize(snapshots: &[YearSnapshot]) -> ProjectionSummary {
    let last = snapshots.last();
    ProjectionSummary {
        final_nominal_net_worth: last.map_or(0.0, |snap| snap.nominal_net_worth),
        final_real_net_worth: last.map_or(0.0, |snap| snap.real_net_worth),
        total_contributions: last.map_or(0.0, |snap| snap.cumulative_contributions),
        total_growth: last.map_or(0.0, |snap| snap.cumulative_growth),
        debt_free_year: snapshots
            .iter()
            .find(|snap| snap.remaining_debt <= 0.0)
            .map(|snap| snap.year),
    }
}

fn snapshot(
    input: &ProjectionInput,
    year: u32,
    investments: f64,
    debt: f64,
    cumulative_contributions: f64,
    cumulative_growth: f64,
    inflation: f64,
) -> YearSnapshot {
    let nominal_net_worth = input.current_cash_savings + investments - debt;
    YearSnapshot {
        year,
        age: input.starting_age + year,
        nominal_net_worth,
        real_net_worth: nominal_net_worth / (1.0 + inflation).powi(year as i32),
        investments_balance: investments,
        remaining_debt: debt,
        cumulative_contributions,
        cumulative_growth,
    }
}

fn validate(input: &ProjectionInput) -> Result<(), EngineError> {
    if input.projection_years < 1 || input.projection_years > MAX_PROJECTION_YEARS {
        return Err(EngineError::HorizonOutOfRange {
            years: input.projection_years,
        });
    }

    for (field, value) in [
        ("current_cash_savings", input.current_cash_savings),
        ("current_investments", input.current_investments),
        ("current_debt", input.current_debt),
        ("monthly_expenses", input.monthly_expenses),
        (
            "monthly_investment_contribution",
            input.monthly_investment_contribution,
        ),
        ("monthly_debt_payment", input.monthly_debt_payment),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::InvalidMoney { field, value });
        }
    }

    // Returns may be negative (a modeled loss), but below -100 % the
    // compounding factor flips sign and the arithmetic stops meaning anything.
    for (name, value) in [
        ("expected_annual_return_pct", input.expected_annual_return_pct),
        ("annual_inflation_pct", input.annual_inflation_pct),
    ] {
        if !value.is_finite() || value <= -100.0 {
            return Err(EngineError::RateTooLow {
                name,
                min: -100.0,
                value,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_input() -> ProjectionInput {
        ProjectionInput {
            current_cash_savings: 10_000.0,
            current_investments: 50_000.0,
            current_debt: 20_000.0,
            monthly_expenses: 2_500.0,
            monthly_investment_contribution: 1_000.0,
            monthly_debt_payment: 500.0,
            expected_annual_return_pct: 7.0,
            annual_inflation_pct: 2.0,
            projection_years: 20,
            starting_age: 30,
        }
    }

    #[test]
    fn sequence_has_one_snapshot_per_year_plus_baseline() {
        let snapshots = project(&sample_input()).expect("valid input");
        assert_eq!(snapshots.len(), 21);
        for (index, snap) in snapshots.iter().enumerate() {
            assert_eq!(snap.year, index as u32);
            assert_eq!(snap.age, 30 + index as u32);
        }
    }

    #[test]
    fn year_zero_is_the_untouched_starting_position() {
        let input = sample_input();
        let snapshots = project(&input).expect("valid input");
        let baseline = &snapshots[0];
        assert_approx_tol(baseline.investments_balance, 50_000.0, 1e-9);
        assert_approx_tol(baseline.remaining_debt, 20_000.0, 1e-9);
        assert_approx_tol(baseline.nominal_net_worth, 40_000.0, 1e-9);
        assert_approx_tol(baseline.real_net_worth, 40_000.0, 1e-9);
        assert_approx_tol(baseline.cumulative_contributions, 0.0, 1e-9);
        assert_approx_tol(baseline.cumulative_growth, 0.0, 1e-9);
    }

    #[test]
    fn rerunning_the_same_input_reproduces_the_sequence() {
        let input = sample_input();
        let first = project(&input).expect("valid input");
        let second = project(&input).expect("valid input");
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.nominal_net_worth.to_bits(), b.nominal_net_worth.to_bits());
            assert_eq!(a.real_net_worth.to_bits(), b.real_net_worth.to_bits());
        }
    }

    #[test]
    fn zero_return_zero_inflation_accumulates_contributions_exactly() {
        let mut input = sample_input();
        input.expected_annual_return_pct = 0.0;
        input.annual_inflation_pct = 0.0;
        input.current_debt = 0.0;
        input.monthly_debt_payment = 0.0;
        input.projection_years = 10;

        let snapshots = project(&input).expect("valid input");
        let last = snapshots.last().expect("non-empty");
        let expected = 10_000.0 + 50_000.0 + 10.0 * 12_000.0;
        assert_approx_tol(last.nominal_net_worth, expected, 1e-9);
        assert_approx_tol(last.real_net_worth, expected, 1e-9);
        assert_approx_tol(last.cumulative_growth, 0.0, 1e-9);
        assert_approx_tol(last.cumulative_contributions, 120_000.0, 1e-9);
    }

    #[test]
    fn growth_is_attributed_before_the_new_contribution() {
        let mut input = sample_input();
        input.current_investments = 10_000.0;
        input.monthly_investment_contribution = 100.0;
        input.expected_annual_return_pct = 10.0;
        input.projection_years = 1;

        let snapshots = project(&input).expect("valid input");
        let year_one = &snapshots[1];
        // 10% of the opening balance only; the 1200 contributed this year
        // earns nothing yet.
        assert_approx_tol(year_one.cumulative_growth, 1_000.0, 1e-9);
        assert_approx_tol(year_one.investments_balance, 12_200.0, 1e-9);
    }

    #[test]
    fn debt_is_clamped_at_zero_and_stays_there() {
        let mut input = sample_input();
        input.current_debt = 10_000.0;
        input.monthly_debt_payment = 1_000.0;
        input.projection_years = 5;

        let snapshots = project(&input).expect("valid input");
        assert_approx_tol(snapshots[1].remaining_debt, 0.0, 1e-9);
        for snap in &snapshots {
            assert!(snap.remaining_debt >= 0.0);
        }
    }

    #[test]
    fn negative_return_is_applied_arithmetically() {
        let mut input = sample_input();
        input.expected_annual_return_pct = -10.0;
        input.monthly_investment_contribution = 0.0;
        input.projection_years = 2;

        let snapshots = project(&input).expect("valid input");
        assert_approx_tol(snapshots[1].investments_balance, 45_000.0, 1e-9);
        assert_approx_tol(snapshots[2].investments_balance, 40_500.0, 1e-9);
        assert!(snapshots[2].cumulative_growth < 0.0);
    }

    #[test]
    fn real_net_worth_is_deflated_by_cumulative_inflation() {
        let mut input = sample_input();
        input.annual_inflation_pct = 2.0;
        let snapshots = project(&input).expect("valid input");
        for snap in &snapshots {
            let expected = snap.nominal_net_worth / 1.02_f64.powi(snap.year as i32);
            assert_approx_tol(snap.real_net_worth, expected, 1e-9);
        }
    }

    #[test]
    fn horizon_outside_bounds_is_rejected() {
        let mut input = sample_input();
        input.projection_years = 0;
        assert!(matches!(
            project(&input),
            Err(EngineError::HorizonOutOfRange { years: 0 })
        ));

        input.projection_years = 51;
        assert!(matches!(
            project(&input),
            Err(EngineError::HorizonOutOfRange { years: 51 })
        ));
    }

    #[test]
    fn negative_money_is_rejected() {
        let mut input = sample_input();
        input.current_investments = -1.0;
        assert!(matches!(
            project(&input),
            Err(EngineError::InvalidMoney { .. })
        ));
    }

    #[test]
    fn milestones_resolve_to_the_first_qualifying_year() {
        let input = sample_input();
        let snapshots = project(&input).expect("valid input");
        let targets = vec![
            MilestoneTarget {
                target_net_worth: 40_000.0,
                label: "baseline".to_string(),
            },
            MilestoneTarget {
                target_net_worth: 100_000.0,
                label: "six figures".to_string(),
            },
            MilestoneTarget {
                target_net_worth: 1_000_000_000.0,
                label: "billionaire".to_string(),
            },
        ];

        let milestones = resolve_milestones(&snapshots, &targets);
        assert_eq!(milestones[0].reached_in_year, Some(0));
        assert_eq!(milestones[0].reached_at_age, Some(30));

        let six_figures = milestones[1].reached_in_year.expect("reachable");
        assert!(snapshots[six_figures as usize].nominal_net_worth >= 100_000.0);
        assert!(snapshots[six_figures as usize - 1].nominal_net_worth < 100_000.0);

        assert_eq!(milestones[2].reached_in_year, None);
        assert_eq!(milestones[2].reached_at_age, None);
    }

    #[test]
    fn summary_reflects_the_final_snapshot() {
        let input = sample_input();
        let snapshots = project(&input).expect("valid input");
        let summary = summarize(&snapshots);
        let last = snapshots.last().expect("non-empty");
        assert_approx_tol(summary.final_nominal_net_worth, last.nominal_net_worth, 1e-9);
        assert_approx_tol(summary.total_contributions, last.cumulative_contributions, 1e-9);
        assert_eq!(summary.debt_free_year, Some(4));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_snapshots_are_finite_debt_never_negative(
            cash in 0u32..500_000,
            investments in 0u32..1_000_000,
            debt in 0u32..500_000,
            contribution in 0u32..5_000,
            debt_payment in 0u32..5_000,
            return_bp in -5_000i32..15_000,
            inflation_bp in 0i32..1_000,
            years in 1u32..51,
            age in 18u32..70
        ) {
            let input = ProjectionInput {
                current_cash_savings: cash as f64,
                current_investments: investments as f64,
                current_debt: debt as f64,
                monthly_expenses: 0.0,
                monthly_investment_contribution: contribution as f64,
                monthly_debt_payment: debt_payment as f64,
                expected_annual_return_pct: return_bp as f64 / 100.0,
                annual_inflation_pct: inflation_bp as f64 / 100.0,
                projection_years: years,
                starting_age: age,
            };

            let snapshots = project(&input).expect("valid input");
            prop_assert!(snapshots.len() == years as usize + 1);

            let mut previous_year = None;
            for snap in &snapshots {
                prop_assert!(snap.nominal_net_worth.is_finite());
                prop_assert!(snap.real_net_worth.is_finite());
                prop_assert!(snap.remaining_debt >= 0.0);
                prop_assert!(snap.investments_balance.is_finite());
                if let Some(previous) = previous_year {
                    prop_assert!(snap.year == previous + 1);
                }
                previous_year = Some(snap.year);
            }
        }

        #[test]
        fn prop_net_worth_is_non_decreasing_without_debt_and_losses(
            cash in 0u32..200_000,
            investments in 0u32..500_000,
            contribution in 0u32..5_000,
            return_bp in 0u32..1_500,
            years in 1u32..51
        ) {
            let input = ProjectionInput {
                current_cash_savings: cash as f64,
                current_investments: investments as f64,
                current_debt: 0.0,
                monthly_expenses: 0.0,
                monthly_investment_contribution: contribution as f64,
                monthly_debt_payment: 0.0,
                expected_annual_return_pct: return_bp as f64 / 100.0,
                annual_inflation_pct: 0.0,
                projection_years: years,
                starting_age: 40,
            };

            let snapshots = project(&input).expect("valid input");
            for pair in snapshots.windows(2) {
                prop_assert!(pair[1].nominal_net_worth + 1e-9 >= pair[0].nominal_net_worth);
            }
        }
    }
}
