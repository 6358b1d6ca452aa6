//! Impact Ratio
//!
//! The ratio of minority to majority selection rates, with a confidence interval
//! built on the log scale and transformed back.
use crate::errors::AdverseImpactError;
use crate::rates::DerivedRates;

/// Selection rate minority / selection rate majority.
pub fn impact_ratio(sr_min: f64, sr_maj: f64) -> Result<f64, AdverseImpactError> {
    if sr_maj == 0.0 {
        return Err(AdverseImpactError::degenerate("impact ratio", "majority selection rate is zero"));
    }
    Ok(sr_min / sr_maj)
}

/// Standard error of the log impact ratio.
pub fn standard_error(rates: &DerivedRates) -> Result<f64, AdverseImpactError> {
    if rates.sr_min <= 0.0 || rates.sr_maj <= 0.0 {
        return Err(AdverseImpactError::degenerate(
            "standard error",
            "both selection rates must be positive",
        ));
    }
    Ok(((1.0 - rates.sr_min) / (rates.n_min * rates.sr_min) + (1.0 - rates.sr_maj) / (rates.n_maj * rates.sr_maj)).sqrt())
}

/// Confidence bounds `(lower, upper)` of `ir`, symmetric around `ln(ir)`.
///
/// * `ir` - Impact ratio, must be positive.
/// * `se` - Standard error of `ln(ir)`.
/// * `z_critical` - Normal critical value, 1.96 for a 95% interval.
pub fn confidence_interval(ir: f64, se: f64, z_critical: f64) -> Result<(f64, f64), AdverseImpactError> {
    if ir <= 0.0 {
        return Err(AdverseImpactError::degenerate("confidence interval", "impact ratio must be positive"));
    }
    let log_ir = ir.ln();
    Ok(((log_ir - z_critical * se).exp(), (log_ir + z_critical * se).exp()))
}

/// Impact ratio with its standard error and confidence bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactRatio {
    pub ir: f64,
    pub se: f64,
    pub lower_ci: f64,
    pub upper_ci: f64,
}

impl ImpactRatio {
    pub fn estimate(rates: &DerivedRates, z_critical: f64) -> Result<Self, AdverseImpactError> {
        let ir = impact_ratio(rates.sr_min, rates.sr_maj)?;
        let se = standard_error(rates)?;
        let (lower_ci, upper_ci) = confidence_interval(ir, se, z_critical)?;
        Ok(ImpactRatio {
            ir,
            se,
            lower_ci,
            upper_ci,
        })
    }
}
