//! Score Report
//!
//! The output of an impact analysis: a flat mapping of rounded scores, the
//! advisories raised while computing them, and the unrounded sub-results.
use crate::contingency::{ChiSquareOutcome, FisherExact};
use crate::errors::AdverseImpactError;
use crate::impact_ratio::ImpactRatio;
use crate::rates::DerivedRates;
use crate::utils::precision_round;
use crate::ztest::ZTests;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Keys of a non-empty score report, in report order.
pub const REPORT_KEYS: [&str; 15] = [
    "min_sr",
    "maj_sr",
    "ir",
    "lower_ci",
    "upper_ci",
    "se",
    "z-test",
    "z-p",
    "z-test-ir",
    "z-test-ir-p",
    "expected_freq",
    "fet-odds-ratio",
    "fet-p",
    "chi2",
    "chi2-p",
];

/// Rounded scores keyed by metric name. `None` marks a score that could not be computed.
///
/// Only finite scores are kept: NaN and infinite values are stored as `None`,
/// so `value` and `to_json` (where they appear as `null`) always agree. The
/// unrounded sub-results on `ImpactAnalysis` still carry the raw value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreReport {
    values: Vec<(&'static str, Option<f64>)>,
}

impl ScoreReport {
    /// The report returned when there is nothing to analyse.
    pub fn empty() -> Self {
        ScoreReport::default()
    }

    /// Build a report from values given in `REPORT_KEYS` order, rounding each one.
    /// Non-finite values are reported as missing.
    pub(crate) fn from_values(values: [Option<f64>; 15], decimals: u32) -> Self {
        ScoreReport {
            values: REPORT_KEYS
                .iter()
                .zip(values)
                .map(|(k, v)| (*k, v.filter(|x| x.is_finite()).map(|x| precision_round(x, decimals))))
                .collect(),
        }
    }

    /// Look up a metric. `None` if the key is not in the report,
    /// `Some(None)` if it is present but could not be computed.
    pub fn get(&self, key: &str) -> Option<Option<f64>> {
        self.values.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    /// Look up a metric, treating absent and not computable the same way.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.get(key).flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<f64>)> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dump the report as a json object, non-computable scores as `null`.
    pub fn to_json(&self) -> Result<String, AdverseImpactError> {
        serde_json::to_string(self).map_err(|e| AdverseImpactError::UnableToWrite(e.to_string()))
    }
}

impl Serialize for ScoreReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Conditions reported alongside a result. None of them change the reported values.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "code")]
pub enum Advisory {
    /// Every applicant in both groups was selected; there is nothing to analyse.
    AllSelected,
    /// The smallest expected cell frequency is below the configured threshold,
    /// the tests may be unreliable.
    LowExpectedFrequency { min_expected: f64, threshold: f64 },
    /// The chi-square test could not be computed.
    ChiSquareNotComputable { reason: String },
    /// A metric was left out of a partial report.
    MetricNotComputable { metric: String, reason: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::AllSelected => write!(f, "every applicant was selected, no adverse impact analysis performed"),
            Advisory::LowExpectedFrequency {
                min_expected,
                threshold,
            } => write!(
                f,
                "minimum expected frequency {:.3} is below {}, results may be unreliable",
                min_expected, threshold
            ),
            Advisory::ChiSquareNotComputable { reason } => write!(f, "chi-square test not computable: {}", reason),
            Advisory::MetricNotComputable { metric, reason } => write!(f, "{} not computable: {}", metric, reason),
        }
    }
}

/// Everything produced by one analysis.
#[derive(Debug, Clone, Default)]
pub struct ImpactAnalysis {
    /// Rounded scores.
    pub report: ScoreReport,
    /// Advisories raised during the analysis, in the order they were raised.
    pub advisories: Vec<Advisory>,
    pub rates: Option<DerivedRates>,
    pub impact_ratio: Option<ImpactRatio>,
    pub z_tests: Option<ZTests>,
    pub fisher: Option<FisherExact>,
    pub chi_square: Option<ChiSquareOutcome>,
}

impl ImpactAnalysis {
    /// Result of a table where everyone was selected.
    pub(crate) fn all_selected() -> Self {
        ImpactAnalysis {
            advisories: vec![Advisory::AllSelected],
            ..Default::default()
        }
    }

    /// True when the small sample advisory was raised.
    pub fn is_low_sample(&self) -> bool {
        self.advisories
            .iter()
            .any(|a| matches!(a, Advisory::LowExpectedFrequency { .. }))
    }

    /// Dump the report and advisories as a json object.
    pub fn to_json(&self) -> Result<String, AdverseImpactError> {
        #[derive(serde::Serialize)]
        struct AnalysisJson<'a> {
            scores: &'a ScoreReport,
            advisories: &'a [Advisory],
        }
        serde_json::to_string(&AnalysisJson {
            scores: &self.report,
            advisories: &self.advisories,
        })
        .map_err(|e| AdverseImpactError::UnableToWrite(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScoreReport {
        let mut values = [Some(0.5); 15];
        values[0] = Some(0.33333333);
        values[13] = None;
        values[14] = Some(f64::NAN);
        ScoreReport::from_values(values, 3)
    }

    #[test]
    fn test_keys_and_rounding() {
        let report = sample();
        assert_eq!(report.len(), 15);
        let keys: Vec<&str> = report.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, REPORT_KEYS.to_vec());
        assert_eq!(report.value("min_sr"), Some(0.333));
        assert_eq!(report.get("chi2"), Some(None));
        assert_eq!(report.get("chi2-p"), Some(None));
        assert_eq!(report.get("dof"), None);
    }

    #[test]
    fn test_to_json() {
        let json = sample().to_json().unwrap();
        assert!(json.starts_with(r#"{"min_sr":0.333,"maj_sr":0.5"#));
        assert!(json.ends_with(r#""chi2":null,"chi2-p":null}"#));
        assert_eq!(ScoreReport::empty().to_json().unwrap(), "{}");
    }

    #[test]
    fn test_non_finite_values_missing() {
        let mut values = [Some(1.0); 15];
        values[11] = Some(f64::INFINITY);
        values[12] = Some(f64::NEG_INFINITY);
        let report = ScoreReport::from_values(values, 3);
        assert_eq!(report.get("fet-odds-ratio"), Some(None));
        assert_eq!(report.value("fet-p"), None);
        let json = report.to_json().unwrap();
        assert!(json.contains(r#""fet-odds-ratio":null,"fet-p":null"#));
    }

    #[test]
    fn test_analysis_json() {
        let analysis = ImpactAnalysis::all_selected();
        assert!(analysis.report.is_empty());
        assert!(!analysis.is_low_sample());
        let json = analysis.to_json().unwrap();
        assert_eq!(json, r#"{"scores":{},"advisories":[{"code":"AllSelected"}]}"#);
    }

    #[test]
    fn test_advisory_display() {
        let advisory = Advisory::LowExpectedFrequency {
            min_expected: 4.0909,
            threshold: 10.0,
        };
        assert_eq!(
            advisory.to_string(),
            "minimum expected frequency 4.091 is below 10, results may be unreliable"
        );
    }
}
