//! Selection Rates
//!
//! Per group and pooled selection rates derived from a `ContingencyTable`.
use crate::errors::AdverseImpactError;
use crate::table::ContingencyTable;

/// Rates and totals shared by the impact ratio and the z-tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRates {
    /// Minority selection rate.
    pub sr_min: f64,
    /// Majority selection rate.
    pub sr_maj: f64,
    /// Selection rate regardless of group.
    pub sr_total: f64,
    /// Total applicants.
    pub n: f64,
    /// Minority applicants.
    pub n_min: f64,
    /// Majority applicants.
    pub n_maj: f64,
    /// Proportion of applicants from the minority group.
    pub p: f64,
}

impl DerivedRates {
    /// Derive selection rates from a table.
    /// Both groups need at least one applicant.
    pub fn from_table(table: &ContingencyTable) -> Result<Self, AdverseImpactError> {
        let [n_maj, n_min] = table.row_totals();
        if n_maj <= 0.0 {
            return Err(AdverseImpactError::degenerate("selection rates", "majority group has no applicants"));
        }
        if n_min <= 0.0 {
            return Err(AdverseImpactError::degenerate("selection rates", "minority group has no applicants"));
        }
        let n = n_maj + n_min;
        Ok(DerivedRates {
            sr_min: table.minority_selected() / n_min,
            sr_maj: table.majority_selected() / n_maj,
            sr_total: (table.minority_selected() + table.majority_selected()) / n,
            n,
            n_min,
            n_maj,
            p: n_min / n,
        })
    }
}
