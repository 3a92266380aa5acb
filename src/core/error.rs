use thiserror::Error;

/// Errors the engine reports instead of letting NaN or Infinity leak into a
/// result record. Every variant is immediate; there is nothing to retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("{field} must be a finite, non-negative amount, got {value}")]
    InvalidMoney { field: &'static str, value: f64 },

    #[error("{name} is below the supported minimum of {min} percent, got {value}")]
    RateTooLow {
        name: &'static str,
        min: f64,
        value: f64,
    },

    #[error("savings rate must be between 0 and 100 percent exclusive, got {value}")]
    SavingsRateOutOfRange { value: f64 },

    #[error("projection horizon must be between 1 and 50 years, got {years}")]
    HorizonOutOfRange { years: u32 },

    #[error("no tax table configured for fiscal year {year}")]
    UnsupportedTaxYear { year: u32 },
}
