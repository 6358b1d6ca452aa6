//! Analysis Configuration
//!
//! Settings for an impact analysis: the critical value of the impact ratio
//! interval, the small sample threshold, report precision, and how degenerate
//! inputs are handled.
use crate::constants::{MIN_EXPECTED_FREQUENCY, REPORT_DECIMALS, Z_CRITICAL_95};
use crate::errors::AdverseImpactError;
use crate::utils::{items_to_strings, validate_positive_float_parameter};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// What to do when a statistic has a zero or negative denominator.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DegeneratePolicy {
    /// Fail the whole analysis.
    #[default]
    Fatal,
    /// Report the affected fields as missing and keep the rest.
    Partial,
}

impl FromStr for DegeneratePolicy {
    type Err = AdverseImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fatal" => Ok(DegeneratePolicy::Fatal),
            "Partial" => Ok(DegeneratePolicy::Partial),
            _ => Err(AdverseImpactError::InvalidParameter(
                "degenerate_policy".to_string(),
                items_to_strings(&["Fatal", "Partial"]),
                s.to_string(),
            )),
        }
    }
}

fn default_z_critical() -> f64 {
    Z_CRITICAL_95
}
fn default_min_expected_frequency() -> f64 {
    MIN_EXPECTED_FREQUENCY
}
fn default_decimals() -> u32 {
    REPORT_DECIMALS
}

/// Configuration for `compute_with_config`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpactConfig {
    /// Normal critical value used for the impact ratio confidence interval.
    #[serde(default = "default_z_critical")]
    pub z_critical: f64,
    /// Smallest acceptable expected cell frequency before a small sample advisory is raised.
    #[serde(default = "default_min_expected_frequency")]
    pub min_expected_frequency: f64,
    /// Decimal places kept in the score report.
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Handling of degenerate inputs.
    #[serde(default)]
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        ImpactConfig {
            z_critical: Z_CRITICAL_95,
            min_expected_frequency: MIN_EXPECTED_FREQUENCY,
            decimals: REPORT_DECIMALS,
            degenerate_policy: DegeneratePolicy::Fatal,
        }
    }
}

impl ImpactConfig {
    /// Set the critical value of the confidence interval.
    /// * `z_critical` - 1.96 for a 95% interval, 2.576 for 99%.
    pub fn set_z_critical(mut self, z_critical: f64) -> Self {
        self.z_critical = z_critical;
        self
    }

    /// Set the small sample threshold.
    /// * `min_expected_frequency` - Expected frequencies below this raise an advisory.
    pub fn set_min_expected_frequency(mut self, min_expected_frequency: f64) -> Self {
        self.min_expected_frequency = min_expected_frequency;
        self
    }

    /// Set the report precision.
    /// * `decimals` - Decimal places kept for every reported value.
    pub fn set_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// Set the degenerate input policy.
    /// * `degenerate_policy` - Fail the analysis, or report missing fields.
    pub fn set_degenerate_policy(mut self, degenerate_policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = degenerate_policy;
        self
    }

    pub fn validate(&self) -> Result<(), AdverseImpactError> {
        validate_positive_float_parameter(self.z_critical, "z_critical")?;
        if self.min_expected_frequency.is_nan() || self.min_expected_frequency < 0.0 {
            return Err(AdverseImpactError::InvalidParameter(
                "min_expected_frequency".to_string(),
                "a non-negative value".to_string(),
                self.min_expected_frequency.to_string(),
            ));
        }
        if self.decimals > 15 {
            return Err(AdverseImpactError::InvalidParameter(
                "decimals".to_string(),
                "at most 15".to_string(),
                self.decimals.to_string(),
            ));
        }
        Ok(())
    }
}

/// IO
pub trait ConfigIO: Serialize + DeserializeOwned + Sized {
    /// Save as a json object to a file.
    ///
    /// * `path` - Path to save to.
    fn save_config<P: AsRef<Path>>(&self, path: P) -> Result<(), AdverseImpactError> {
        fs::write(path, self.json_dump()?).map_err(|e| AdverseImpactError::UnableToWrite(e.to_string()))
    }

    /// Dump as a json object.
    fn json_dump(&self) -> Result<String, AdverseImpactError> {
        serde_json::to_string(self).map_err(|e| AdverseImpactError::UnableToWrite(e.to_string()))
    }

    /// Load from a json string.
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, AdverseImpactError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| AdverseImpactError::UnableToRead(e.to_string()))
    }

    /// Load from a path to a json object.
    ///
    /// * `path` - Path to load from.
    fn load_config<P: AsRef<Path>>(path: P) -> Result<Self, AdverseImpactError> {
        let json_str = fs::read_to_string(path).map_err(|e| AdverseImpactError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ConfigIO for ImpactConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_impact_config_default() {
        let config = ImpactConfig::default();
        assert_eq!(config.z_critical, 1.96);
        assert_eq!(config.min_expected_frequency, 10.0);
        assert_eq!(config.decimals, 3);
        assert_eq!(config.degenerate_policy, DegeneratePolicy::Fatal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_io_json() {
        let config = ImpactConfig::default()
            .set_z_critical(2.576)
            .set_degenerate_policy(DegeneratePolicy::Partial);
        let json = config.json_dump().unwrap();
        let config2 = ImpactConfig::from_json(&json).unwrap();
        assert_eq!(config, config2);
    }

    #[test]
    fn test_config_io_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("impact.json");
        let config = ImpactConfig::default().set_decimals(4);
        config.save_config(&file_path).unwrap();
        let config2 = ImpactConfig::load_config(&file_path).unwrap();
        assert_eq!(config, config2);
    }

    #[test]
    fn test_parse_defaults() {
        let config = ImpactConfig::from_json(r#"{"degenerate_policy": "Partial"}"#).unwrap();
        assert_eq!(config.z_critical, 1.96);
        assert_eq!(config.decimals, 3);
        assert_eq!(config.degenerate_policy, DegeneratePolicy::Partial);

        let config = ImpactConfig::from_json("{}").unwrap();
        assert_eq!(config, ImpactConfig::default());

        assert!(ImpactConfig::from_json(r#"{"degenerate_policy": "Lenient"}"#).is_err());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Partial".parse::<DegeneratePolicy>().unwrap(), DegeneratePolicy::Partial);
        let err = "lenient".parse::<DegeneratePolicy>().unwrap_err();
        assert!(err.to_string().contains("Fatal, Partial"));
    }

    #[test]
    fn test_validate() {
        assert!(ImpactConfig::default().set_z_critical(0.0).validate().is_err());
        assert!(ImpactConfig::default().set_min_expected_frequency(-1.0).validate().is_err());
        assert!(ImpactConfig::default().set_decimals(20).validate().is_err());
        assert!(ImpactConfig::default().set_min_expected_frequency(0.0).validate().is_ok());
    }
}
