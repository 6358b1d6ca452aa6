//! Errors
//!
//! Custom error types used throughout the `adverse_impact` crate.
use thiserror::Error;

/// Errors that can occur while building a table or computing impact statistics.
#[derive(Debug, Error)]
pub enum AdverseImpactError {
    /// Row or column labels did not match the required layout.
    /// First value is the axis, second is what was expected, third is what was found.
    #[error("Invalid table shape: {0} labels must be exactly {1}, but {2} provided.")]
    InvalidTableShape(String, String, String),
    /// A cell count was negative, not finite, or not integral where an integer was required.
    #[error("Invalid count {1} in cell {0}: {2}.")]
    InvalidCount(String, f64, String),
    /// A statistic could not be computed because a denominator or rate was degenerate.
    #[error("Unable to compute {0}: {1}.")]
    DegenerateInput(String, String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// A reference distribution could not be constructed.
    #[error("Distribution error: {0}")]
    Distribution(#[from] statrs::StatsError),
    /// Unable to read a table or configuration.
    #[error("Unable to read {0}")]
    UnableToRead(String),
    /// Unable to write a report or configuration.
    #[error("Unable to write {0}")]
    UnableToWrite(String),
}

impl AdverseImpactError {
    pub(crate) fn degenerate(statistic: &str, reason: &str) -> Self {
        AdverseImpactError::DegenerateInput(statistic.to_string(), reason.to_string())
    }

    /// True for the errors that partial-result mode degrades into missing fields.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, AdverseImpactError::DegenerateInput(..))
    }
}
