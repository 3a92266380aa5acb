use super::error::EngineError;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilingStatus {
    Single,
    Married,
}

/// German wage-tax classes. The class only enters the computation as a
/// multiplicative factor on the bracket output, see `TaxYearConfig::class_factors`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TaxClass {
    I,
    II,
    III,
    IV,
    V,
    VI,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Region {
    BadenWuerttemberg,
    Bavaria,
    Other,
}

/// Closed-form tax for one zone of the progressive curve, evaluated on income
/// normalized against the zone's lower bound. The quadratic zones interpolate
/// the rising marginal rate; the linear zones subtract a constant so the curve
/// stays continuous at the boundary.
#[derive(Debug, Clone, Copy)]
pub enum ZoneFormula {
    Free,
    Progressive {
        quadratic: f64,
        linear: f64,
        base: f64,
        scale: f64,
    },
    Linear {
        rate_pct: f64,
        offset: f64,
    },
}

#[derive(Debug, Clone)]
pub struct TaxZone {
    pub name: &'static str,
    pub lower: f64,
    pub upper: Option<f64>,
    pub formula: ZoneFormula,
    pub marginal_rate_pct: f64,
    pub rate_label: &'static str,
}

#[derive(Debug, Clone)]
pub struct SocialRates {
    pub pension_pct: f64,
    pub health_pct: f64,
    pub unemployment_pct: f64,
    pub long_term_care_pct: f64,
    pub childless_care_surcharge_pct: f64,
    pub childless_surcharge_min_age: u32,
}

/// Flat capital-gains taxation, kept in one place so every caller shares the
/// same rate and saver's allowance.
#[derive(Debug, Clone)]
pub struct CapitalGainsConfig {
    pub flat_rate_pct: f64,
    pub saver_allowance: f64,
}

#[derive(Debug, Clone)]
pub struct FireFactors {
    pub safe_withdrawal_rate_pct: f64,
    pub lean_factor: f64,
    pub fat_factor: f64,
}

/// All fiscal constants for one tax year. Updating the engine for a new year
/// means adding a new table here, not touching the algorithms.
#[derive(Debug, Clone)]
pub struct TaxYearConfig {
    pub fiscal_year: u32,
    pub tax_free_allowance: f64,
    pub zones: Vec<TaxZone>,
    pub solidarity_rate_pct: f64,
    pub solidarity_threshold: f64,
    pub church_rate_low_pct: f64,
    pub church_rate_high_pct: f64,
    pub social: SocialRates,
    pub child_benefit_monthly: f64,
    /// When true, the annual child benefit is folded into `net_income`;
    /// when false it is reported alongside only.
    pub net_child_benefit: bool,
    pub class_factors: [f64; 6],
    pub capital_gains: CapitalGainsConfig,
    pub fire: FireFactors,
}

impl TaxYearConfig {
    pub fn for_year(year: u32) -> Result<Self, EngineError> {
        match year {
            2024 => Ok(Self::germany_2024()),
            _ => Err(EngineError::UnsupportedTaxYear { year }),
        }
    }

    /// §32a EStG coefficients for 2024 plus the payroll and benefit rates of
    /// the same year.
    pub fn germany_2024() -> Self {
        Self {
            fiscal_year: 2024,
            tax_free_allowance: 11_604.0,
            zones: vec![
                TaxZone {
                    name: "tax-free allowance",
                    lower: 0.0,
                    upper: Some(11_604.0),
                    formula: ZoneFormula::Free,
                    marginal_rate_pct: 0.0,
                    rate_label: "0 %",
                },
                TaxZone {
                    name: "first progression zone",
                    lower: 11_604.0,
                    upper: Some(17_005.0),
                    formula: ZoneFormula::Progressive {
                        quadratic: 922.98,
                        linear: 1_400.0,
                        base: 0.0,
                        scale: 10_000.0,
                    },
                    marginal_rate_pct: 24.0,
                    rate_label: "14 % – 24 %",
                },
                TaxZone {
                    name: "second progression zone",
                    lower: 17_005.0,
                    upper: Some(66_760.0),
                    formula: ZoneFormula::Progressive {
                        quadratic: 181.19,
                        linear: 2_397.0,
                        base: 1_025.38,
                        scale: 10_000.0,
                    },
                    marginal_rate_pct: 42.0,
                    rate_label: "24 % – 42 %",
                },
                TaxZone {
                    name: "proportional zone",
                    lower: 66_760.0,
                    upper: Some(277_825.0),
                    formula: ZoneFormula::Linear {
                        rate_pct: 42.0,
                        offset: 10_602.13,
                    },
                    marginal_rate_pct: 42.0,
                    rate_label: "42 %",
                },
                TaxZone {
                    name: "top rate zone",
                    lower: 277_825.0,
                    upper: None,
                    formula: ZoneFormula::Linear {
                        rate_pct: 45.0,
                        offset: 18_936.88,
                    },
                    marginal_rate_pct: 45.0,
                    rate_label: "45 %",
                },
            ],
            solidarity_rate_pct: 5.5,
            solidarity_threshold: 18_130.0,
            church_rate_low_pct: 8.0,
            church_rate_high_pct: 9.0,
            social: SocialRates {
                pension_pct: 9.3,
                health_pct: 8.15,
                unemployment_pct: 1.3,
                long_term_care_pct: 1.7,
                childless_care_surcharge_pct: 0.6,
                childless_surcharge_min_age: 23,
            },
            child_benefit_monthly: 250.0,
            net_child_benefit: false,
            class_factors: [1.0, 0.96, 0.90, 1.0, 1.12, 1.20],
            capital_gains: CapitalGainsConfig {
                flat_rate_pct: 25.0,
                saver_allowance: 1_000.0,
            },
            fire: FireFactors {
                safe_withdrawal_rate_pct: 4.0,
                lean_factor: 0.7,
                fat_factor: 2.0,
            },
        }
    }

    pub fn class_factor(&self, class: TaxClass) -> f64 {
        let index = match class {
            TaxClass::I => 0,
            TaxClass::II => 1,
            TaxClass::III => 2,
            TaxClass::IV => 3,
            TaxClass::V => 4,
            TaxClass::VI => 5,
        };
        self.class_factors[index]
    }

    pub fn church_rate_pct(&self, region: Option<Region>) -> f64 {
        match region {
            Some(Region::Bavaria) | Some(Region::BadenWuerttemberg) => self.church_rate_low_pct,
            _ => self.church_rate_high_pct,
        }
    }

    /// Zone containing the given income. Zones are ordered; boundaries belong
    /// to the lower zone.
    pub fn zone_for(&self, income: f64) -> &TaxZone {
        self.zones
            .iter()
            .find(|zone| zone.upper.is_none_or(|upper| income <= upper))
            .unwrap_or_else(|| self.zones.last().expect("zone table is never empty"))
    }
}
