use crate::constants::{FISHER_MAX_TOTAL, FISHER_RELATIVE_TOLERANCE, FISHER_TAIL_EPSILON};
use crate::errors::AdverseImpactError;
use crate::table::{ContingencyTable, COLUMN_LABELS, ROW_LABELS};
use statrs::function::factorial::ln_binomial;

/// Result of Fisher's exact test on a 2x2 table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FisherExact {
    /// Minority odds of selection over majority odds of selection.
    /// Below one whenever the minority selection rate is below the majority rate.
    pub odds_ratio: f64,
    /// Two sided exact p-value.
    pub p_value: f64,
}

fn integral_count(cell: &str, value: f64) -> Result<u64, AdverseImpactError> {
    if value.fract() != 0.0 || value < 0.0 || !value.is_finite() {
        return Err(AdverseImpactError::InvalidCount(
            cell.to_string(),
            value,
            "Fisher's exact test needs whole counts".to_string(),
        ));
    }
    if value > FISHER_MAX_TOTAL as f64 {
        return Err(AdverseImpactError::InvalidCount(
            cell.to_string(),
            value,
            format!("Fisher's exact test supports at most {} applicants", FISHER_MAX_TOTAL),
        ));
    }
    Ok(value as u64)
}

fn checked_total(cells: &[[u64; 2]; 2]) -> Result<u64, AdverseImpactError> {
    let total = cells
        .iter()
        .flatten()
        .try_fold(0_u64, |acc, v| acc.checked_add(*v))
        .filter(|n| *n <= FISHER_MAX_TOTAL);
    total.ok_or_else(|| {
        AdverseImpactError::InvalidCount(
            "total".to_string(),
            cells.iter().flatten().map(|v| *v as f64).sum(),
            format!("Fisher's exact test supports at most {} applicants", FISHER_MAX_TOTAL),
        )
    })
}

/// Hypergeometric distribution of the majority/selected cell given the table margins.
struct Margins {
    n: u64,
    draws: u64,
    successes: u64,
    ln_total: f64,
}

impl Margins {
    fn new(cells: &[[u64; 2]; 2]) -> Result<Self, AdverseImpactError> {
        let n = checked_total(cells)?;
        // Majority applicants drawn from all applicants, with the selected
        // applicants as successes.
        let draws = cells[0][0] + cells[0][1];
        let successes = cells[0][0] + cells[1][0];
        Ok(Margins {
            n,
            draws,
            successes,
            ln_total: ln_binomial(n, draws),
        })
    }

    fn support(&self) -> (u64, u64) {
        (
            self.draws.saturating_sub(self.n - self.successes),
            self.successes.min(self.draws),
        )
    }

    fn mode(&self) -> u64 {
        let (lo, hi) = self.support();
        let m = (self.draws as u128 + 1) * (self.successes as u128 + 1) / (self.n as u128 + 2);
        (m as u64).clamp(lo, hi)
    }

    fn pmf(&self, k: u64) -> f64 {
        (ln_binomial(self.successes, k) + ln_binomial(self.n - self.successes, self.draws - k) - self.ln_total).exp()
    }

    /// `pmf(k - 1) / pmf(k)`, for `k` above the bottom of the support.
    fn ratio_down(&self, k: u64) -> f64 {
        let failures_drawn = (self.n - self.successes - (self.draws - k)) as f64;
        k as f64 * failures_drawn / ((self.successes - k + 1) as f64 * (self.draws - k + 1) as f64)
    }

    /// `pmf(k + 1) / pmf(k)`, for `k` below the top of the support.
    fn ratio_up(&self, k: u64) -> f64 {
        let failures_drawn = (self.n - self.successes - (self.draws - k)) as f64;
        (self.successes - k) as f64 * (self.draws - k) as f64 / ((k + 1) as f64 * (failures_drawn + 1.0))
    }

    /// Sum the pmf from `start` outward, away from the mode, until the terms are negligible.
    fn tail_sum(&self, start: u64, upward: bool) -> f64 {
        let (lo, hi) = self.support();
        let mut k = start;
        let mut term = self.pmf(k);
        let mut sum = 0.0;
        loop {
            sum += term;
            let at_end = if upward { k == hi } else { k == lo };
            if at_end || term <= sum * FISHER_TAIL_EPSILON {
                return sum;
            }
            if upward {
                term *= self.ratio_up(k);
                k += 1;
            } else {
                term *= self.ratio_down(k);
                k -= 1;
            }
        }
    }
}

/// Odds ratio `(min_sel * maj_not) / (min_not * maj_sel)`.
/// Infinite when only the denominator is zero, NaN when both are.
pub fn odds_ratio(table: &ContingencyTable) -> f64 {
    let numerator = table.minority_selected() * table.majority_not_selected();
    let denominator = table.minority_not_selected() * table.majority_selected();
    if denominator == 0.0 {
        if numerator > 0.0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    } else {
        numerator / denominator
    }
}

/// Fisher's exact test.
///
/// The p-value sums the hypergeometric probability of every table sharing the
/// observed margins that is no more likely than the observed one. Only the
/// non-negligible part of each tail is visited, so the cost grows with the
/// spread of the distribution rather than with the counts. Totals above
/// `FISHER_MAX_TOTAL` are rejected.
pub fn fisher_exact(table: &ContingencyTable) -> Result<FisherExact, AdverseImpactError> {
    let mut cells = [[0_u64; 2]; 2];
    for (r, row) in table.as_array().iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            cells[r][c] = integral_count(&format!("{}/{}", ROW_LABELS[r], COLUMN_LABELS[c]), *value)?;
        }
    }
    let margins = Margins::new(&cells)?;
    let (lo, hi) = margins.support();
    let mode = margins.mode();
    let threshold = margins.pmf(cells[0][0]) * FISHER_RELATIVE_TOLERANCE;

    let p_value = if margins.pmf(mode) <= threshold {
        1.0
    } else {
        // The pmf is unimodal, so the tables no more likely than the observed
        // one form a lower tail ending below the mode and an upper tail
        // starting above it.
        let mut p = 0.0;
        if margins.pmf(lo) <= threshold {
            let (mut below, mut above) = (lo, mode - 1);
            while below < above {
                let mid = below + (above - below + 1) / 2;
                if margins.pmf(mid) <= threshold {
                    below = mid;
                } else {
                    above = mid - 1;
                }
            }
            p += margins.tail_sum(below, false);
        }
        if margins.pmf(hi) <= threshold {
            let (mut below, mut above) = (mode + 1, hi);
            while below < above {
                let mid = below + (above - below) / 2;
                if margins.pmf(mid) <= threshold {
                    above = mid;
                } else {
                    below = mid + 1;
                }
            }
            p += margins.tail_sum(below, true);
        }
        p
    };

    Ok(FisherExact {
        odds_ratio: odds_ratio(table),
        p_value: p_value.min(1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(a: f64, b: f64, c: f64, d: f64) -> ContingencyTable {
        ContingencyTable::new(a, b, c, d).unwrap()
    }

    #[test]
    fn test_small_table() {
        let fet = fisher_exact(&table(9., 3., 4., 6.)).unwrap();
        assert!((fet.p_value - 0.19195046439628421).abs() < 1e-9);
        assert!((fet.odds_ratio - 2. / 9.).abs() < 1e-12);

        let fet = fisher_exact(&table(10., 5., 10., 20.)).unwrap();
        assert!((fet.p_value - 0.05585789238104838).abs() < 1e-9);
        assert_eq!(fet.odds_ratio, 0.25);
    }

    #[test]
    fn test_large_difference() {
        let fet = fisher_exact(&table(80., 20., 40., 60.)).unwrap();
        assert!(fet.odds_ratio < 1.0);
        assert!((fet.p_value - 1.0636025781775168e-08).abs() < 1e-11);
    }

    #[test]
    fn test_no_association() {
        let fet = fisher_exact(&table(50., 50., 50., 50.)).unwrap();
        assert_eq!(fet.odds_ratio, 1.0);
        assert!((fet.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_p_value_invariant_to_row_swap() {
        let a = fisher_exact(&table(9., 3., 4., 6.)).unwrap();
        let b = fisher_exact(&table(4., 6., 9., 3.)).unwrap();
        assert!((a.p_value - b.p_value).abs() < 1e-12);
        assert!((a.odds_ratio * b.odds_ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_cells() {
        let fet = fisher_exact(&table(10., 10., 10., 0.)).unwrap();
        assert!(fet.odds_ratio.is_infinite());
        assert!(fet.p_value > 0.0 && fet.p_value <= 1.0);

        let fet = fisher_exact(&table(0., 0., 0., 0.)).unwrap();
        assert!(fet.odds_ratio.is_nan());
        assert_eq!(fet.p_value, 1.0);
    }

    #[test]
    fn test_fractional_counts_rejected() {
        assert!(matches!(
            fisher_exact(&table(10.5, 3., 4., 6.)),
            Err(AdverseImpactError::InvalidCount(..))
        ));
    }

    #[test]
    fn test_large_table() {
        let fet = fisher_exact(&table(20_000_000., 20_000_000., 19_990_000., 20_010_000.)).unwrap();
        assert!((fet.p_value - 0.025361962).abs() < 1e-4);
        assert!(fet.odds_ratio < 1.0);

        let fet = fisher_exact(&table(2e6, 1e6, 1e6, 2e6)).unwrap();
        assert_eq!(fet.p_value, 0.0);
    }

    #[test]
    fn test_oversized_counts_rejected() {
        assert!(matches!(
            fisher_exact(&table(5e18, 5e18, 5e18, 5e18)),
            Err(AdverseImpactError::InvalidCount(..))
        ));
        let half = (FISHER_MAX_TOTAL / 2) as f64;
        assert!(matches!(
            fisher_exact(&table(half, half, 1., 0.)),
            Err(AdverseImpactError::InvalidCount(..))
        ));
    }

    fn enumerated_p_value(cells: &[[u64; 2]; 2]) -> f64 {
        let margins = Margins::new(cells).unwrap();
        let (lo, hi) = margins.support();
        let threshold = margins.pmf(cells[0][0]) * FISHER_RELATIVE_TOLERANCE;
        let p: f64 = (lo..=hi).map(|k| margins.pmf(k)).filter(|p| *p <= threshold).sum();
        p.min(1.0)
    }

    #[test]
    fn test_matches_full_enumeration() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let cells = [
                [rng.gen_range(0..40_u64), rng.gen_range(0..40_u64)],
                [rng.gen_range(0..40_u64), rng.gen_range(0..40_u64)],
            ];
            let fet = fisher_exact(&table(
                cells[0][0] as f64,
                cells[0][1] as f64,
                cells[1][0] as f64,
                cells[1][1] as f64,
            ))
            .unwrap();
            let expected = enumerated_p_value(&cells);
            assert!(
                (fet.p_value - expected).abs() < 1e-10,
                "{:?}: {} != {}",
                cells,
                fet.p_value,
                expected
            );
        }
    }
}
