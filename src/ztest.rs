//! Z Tests
//!
//! Normal approximation tests of the difference between selection rates.
//! Both tests report a two sided p-value, `2 * (1 - Phi(|z|))`.
use crate::errors::AdverseImpactError;
use crate::rates::DerivedRates;
use crate::utils::two_sided_normal_p;

/// Pooled two-sample z-test, the "2 standard deviation test".
///
/// `z = (sr_min - sr_maj) / sqrt(sr_total * (1 - sr_total) / (n * p * (1 - p)))`
pub fn z_test(rates: &DerivedRates) -> Result<f64, AdverseImpactError> {
    let DerivedRates {
        sr_min,
        sr_maj,
        sr_total,
        n,
        p,
        ..
    } = *rates;
    if n <= 0.0 || p <= 0.0 || p >= 1.0 {
        return Err(AdverseImpactError::degenerate(
            "z-test",
            "both groups need applicants",
        ));
    }
    if sr_total <= 0.0 || sr_total >= 1.0 {
        return Err(AdverseImpactError::degenerate(
            "z-test",
            "pooled selection rate must be strictly between 0 and 1",
        ));
    }
    Ok((sr_min - sr_maj) / (sr_total * (1.0 - sr_total) / (n * p * (1.0 - p))).sqrt())
}

/// Z-test of the log ratio of selection rates (ZIR).
///
/// `z_ir = ln(sr_min / sr_maj) / sqrt((1 - sr_total) / (sr_total * n * p * (1 - p)))`
pub fn z_test_ir(rates: &DerivedRates) -> Result<f64, AdverseImpactError> {
    let DerivedRates {
        sr_min,
        sr_maj,
        sr_total,
        n,
        p,
        ..
    } = *rates;
    if sr_min <= 0.0 || sr_maj <= 0.0 {
        return Err(AdverseImpactError::degenerate(
            "z-test-ir",
            "both selection rates must be positive",
        ));
    }
    if n <= 0.0 || p <= 0.0 || p >= 1.0 || sr_total >= 1.0 {
        return Err(AdverseImpactError::degenerate(
            "z-test-ir",
            "variance of the log ratio is zero",
        ));
    }
    Ok((sr_min / sr_maj).ln() / ((1.0 - sr_total) / (sr_total * n * p * (1.0 - p))).sqrt())
}

/// A z statistic with its two sided p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScore {
    pub z: f64,
    pub p_value: f64,
}

impl ZScore {
    pub fn from_z(z: f64) -> Result<Self, AdverseImpactError> {
        Ok(ZScore {
            z,
            p_value: two_sided_normal_p(z)?,
        })
    }
}

/// Both z-tests computed on the same rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZTests {
    pub pooled: ZScore,
    pub log_ratio: ZScore,
}

impl ZTests {
    pub fn compute(rates: &DerivedRates) -> Result<Self, AdverseImpactError> {
        Ok(ZTests {
            pooled: ZScore::from_z(z_test(rates)?)?,
            log_ratio: ZScore::from_z(z_test_ir(rates)?)?,
        })
    }
}
