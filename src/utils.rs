use crate::errors::AdverseImpactError;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Create a string of all available items.
pub fn items_to_strings(items: &[&str]) -> String {
    items.join(", ")
}

// Validation
pub fn validate_positive_float_parameter(value: f64, parameter: &str) -> Result<(), AdverseImpactError> {
    if value.is_nan() || value <= 0.0 || value.is_infinite() {
        Err(AdverseImpactError::InvalidParameter(
            parameter.to_string(),
            "a finite positive value".to_string(),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Round to a number of decimal places, sending ties to the even neighbour.
#[inline]
pub fn precision_round(n: f64, decimals: u32) -> f64 {
    if !n.is_finite() {
        return n;
    }
    let p = (10.0_f64).powi(decimals as i32);
    (n * p).round_ties_even() / p
}

/// Two sided normal approximation p-value, `2 * (1 - Phi(|z|))`.
pub fn two_sided_normal_p(z: f64) -> Result<f64, AdverseImpactError> {
    let standard = Normal::new(0.0, 1.0)?;
    Ok((2.0 * (1.0 - standard.cdf(z.abs()))).clamp(0.0, 1.0))
}

/// Upper tail probability of a chi-square distribution.
pub fn chi2_upper_tail(stat: f64, dof: usize) -> Result<f64, AdverseImpactError> {
    let dist = ChiSquared::new(dof as f64)?;
    Ok((1.0 - dist.cdf(stat)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round() {
        assert_eq!(0.3, precision_round(0.3333, 1));
        assert_eq!(0.2343, precision_round(0.2343123123123, 4));
        assert_eq!(0.132, precision_round(0.1322875655532295, 3));
        assert_eq!(-5.774, precision_round(-5.773502691896258, 3));
    }

    #[test]
    fn test_round_ties_even() {
        assert_eq!(2.0, precision_round(2.5, 0));
        assert_eq!(4.0, precision_round(3.5, 0));
        assert!(precision_round(f64::INFINITY, 3).is_infinite());
    }

    #[test]
    fn test_two_sided_normal_p() {
        assert!((two_sided_normal_p(0.0).unwrap() - 1.0).abs() < 1e-12);
        assert!((two_sided_normal_p(1.96).unwrap() - 0.05).abs() < 1e-3);
        assert_eq!(two_sided_normal_p(-2.5).unwrap(), two_sided_normal_p(2.5).unwrap());
    }

    #[test]
    fn test_chi2_upper_tail() {
        assert!((chi2_upper_tail(0.0, 1).unwrap() - 1.0).abs() < 1e-12);
        // 3.841 is the 95th percentile of chi-square with one degree of freedom.
        assert!((chi2_upper_tail(3.841458820694124, 1).unwrap() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_validate_positive_float_parameter() {
        assert!(validate_positive_float_parameter(1.96, "z_critical").is_ok());
        assert!(validate_positive_float_parameter(0.0, "z_critical").is_err());
        assert!(validate_positive_float_parameter(f64::NAN, "z_critical").is_err());
    }

    #[test]
    fn test_items_to_strings() {
        assert_eq!(items_to_strings(&["majority", "minority"]), "majority, minority");
    }
}
