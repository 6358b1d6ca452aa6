//! Impact Analysis
//!
//! Runs the full adverse impact pipeline on one table: selection rates, the
//! impact ratio and its interval, both z-tests, Fisher's exact test and the
//! chi-square test, then the small sample check and the rounded report.
use crate::config::{DegeneratePolicy, ImpactConfig};
use crate::contingency::{chi2_contingency, fisher_exact, ChiSquareOutcome};
use crate::errors::AdverseImpactError;
use crate::impact_ratio::{confidence_interval, impact_ratio, standard_error, ImpactRatio};
use crate::rates::DerivedRates;
use crate::report::{Advisory, ImpactAnalysis, ScoreReport};
use crate::table::ContingencyTable;
use crate::utils::two_sided_normal_p;
use crate::ztest::{z_test, z_test_ir, ZScore, ZTests};
use log::{debug, info, warn};
use rayon::prelude::*;

/// Collects advisories and applies the degenerate input policy.
struct Advisories {
    policy: DegeneratePolicy,
    raised: Vec<Advisory>,
}

impl Advisories {
    fn push(&mut self, advisory: Advisory) {
        warn!("{}", advisory);
        self.raised.push(advisory);
    }

    /// Pass a result through, turning a degenerate input into a missing value
    /// when partial reports are allowed.
    fn resolve<T>(&mut self, metric: &str, result: Result<T, AdverseImpactError>) -> Result<Option<T>, AdverseImpactError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_degenerate() && self.policy == DegeneratePolicy::Partial => {
                self.push(Advisory::MetricNotComputable {
                    metric: metric.to_string(),
                    reason: e.to_string(),
                });
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve a z statistic and attach its p-value.
    fn z_score(
        &mut self,
        metric: &str,
        rates: Option<&DerivedRates>,
        statistic: fn(&DerivedRates) -> Result<f64, AdverseImpactError>,
    ) -> Result<Option<ZScore>, AdverseImpactError> {
        let z = match rates {
            Some(r) => self.resolve(metric, statistic(r))?,
            None => None,
        };
        z.map(ZScore::from_z).transpose()
    }
}

/// Compute adverse impact statistics with the default configuration.
///
/// * `table` - Selection counts for the majority and minority groups.
pub fn compute(table: &ContingencyTable) -> Result<ImpactAnalysis, AdverseImpactError> {
    compute_with_config(table, &ImpactConfig::default())
}

/// Compute adverse impact statistics.
///
/// If nobody in either group was rejected there is nothing to compare, the
/// report is empty and an `Advisory::AllSelected` is returned instead.
///
/// * `table` - Selection counts for the majority and minority groups.
/// * `cfg` - Analysis configuration.
pub fn compute_with_config(table: &ContingencyTable, cfg: &ImpactConfig) -> Result<ImpactAnalysis, AdverseImpactError> {
    cfg.validate()?;
    debug!("Computing adverse impact for table {:?}", table.as_array());

    let [_, not_selected] = table.column_totals();
    if not_selected == 0.0 {
        info!("{}", Advisory::AllSelected);
        return Ok(ImpactAnalysis::all_selected());
    }

    let mut advisories = Advisories {
        policy: cfg.degenerate_policy,
        raised: Vec::new(),
    };

    // Selection rates and impact ratio
    let rates = advisories.resolve("selection rates", DerivedRates::from_table(table))?;
    let ir = match &rates {
        Some(r) => advisories.resolve("ir", impact_ratio(r.sr_min, r.sr_maj))?,
        None => None,
    };
    let se = match &rates {
        Some(r) => advisories.resolve("se", standard_error(r))?,
        None => None,
    };
    let ci = match (ir, se) {
        (Some(ir), Some(se)) => advisories.resolve("confidence interval", confidence_interval(ir, se, cfg.z_critical))?,
        _ => None,
    };

    // Z tests
    let pooled = advisories.z_score("z-test", rates.as_ref(), z_test)?;
    let log_ratio = advisories.z_score("z-test-ir", rates.as_ref(), z_test_ir)?;

    // Exact and chi-square tests
    let fisher = fisher_exact(table)?;
    let chi_square = chi2_contingency(table)?;

    let min_expected = match &chi_square {
        ChiSquareOutcome::Computed(test) => {
            let min_expected = test.min_expected_frequency();
            if min_expected < cfg.min_expected_frequency {
                advisories.push(Advisory::LowExpectedFrequency {
                    min_expected,
                    threshold: cfg.min_expected_frequency,
                });
            }
            Some(min_expected)
        }
        ChiSquareOutcome::NotComputable { reason } => {
            advisories.push(Advisory::ChiSquareNotComputable { reason: reason.clone() });
            None
        }
    };
    let chi = chi_square.computed();

    // A report holds finite values only.
    let fet_odds_ratio = if fisher.odds_ratio.is_nan() {
        advisories.resolve(
            "fet-odds-ratio",
            Err::<f64, _>(AdverseImpactError::degenerate("fet-odds-ratio", "both odds are zero")),
        )?
    } else if fisher.odds_ratio.is_infinite() {
        advisories.push(Advisory::MetricNotComputable {
            metric: "fet-odds-ratio".to_string(),
            reason: "odds ratio is infinite, no minority applicant was rejected".to_string(),
        });
        None
    } else {
        Some(fisher.odds_ratio)
    };

    let report = ScoreReport::from_values(
        [
            rates.map(|r| r.sr_min),
            rates.map(|r| r.sr_maj),
            ir,
            ci.map(|(lower, _)| lower),
            ci.map(|(_, upper)| upper),
            se,
            pooled.map(|z| z.z),
            pooled.map(|z| z.p_value),
            log_ratio.map(|z| z.z),
            log_ratio.map(|z| z.p_value),
            min_expected,
            fet_odds_ratio,
            Some(fisher.p_value),
            chi.map(|c| c.statistic),
            chi.map(|c| c.p_value),
        ],
        cfg.decimals,
    );

    let impact_ratio = match (ir, se, ci) {
        (Some(ir), Some(se), Some((lower_ci, upper_ci))) => Some(ImpactRatio {
            ir,
            se,
            lower_ci,
            upper_ci,
        }),
        _ => None,
    };
    let z_tests = match (pooled, log_ratio) {
        (Some(pooled), Some(log_ratio)) => Some(ZTests { pooled, log_ratio }),
        _ => None,
    };

    Ok(ImpactAnalysis {
        report,
        advisories: advisories.raised,
        rates,
        impact_ratio,
        z_tests,
        fisher: Some(fisher),
        chi_square: Some(chi_square),
    })
}

/// Validate labeled, untyped input and compute adverse impact statistics.
///
/// * `row_labels` - Must be exactly `majority` and `minority`, in any order.
/// * `column_labels` - Must be exactly `selected` and `not-selected`, in any order.
/// * `cells` - Row major counts, positioned to match the labels.
/// * `cfg` - Analysis configuration.
pub fn compute_labeled(
    row_labels: &[&str],
    column_labels: &[&str],
    cells: &[Vec<f64>],
    cfg: &ImpactConfig,
) -> Result<ImpactAnalysis, AdverseImpactError> {
    let table = ContingencyTable::from_labeled(row_labels, column_labels, cells)?;
    compute_with_config(&table, cfg)
}

/// Parse a labeled json table and compute adverse impact statistics.
pub fn compute_json(json_str: &str, cfg: &ImpactConfig) -> Result<ImpactAnalysis, AdverseImpactError> {
    let table = ContingencyTable::from_json(json_str)?;
    compute_with_config(&table, cfg)
}

/// Compute adverse impact statistics for many independent tables.
///
/// * `tables` - Tables to analyse.
/// * `cfg` - Analysis configuration shared by every table.
/// * `parallel` - If `true`, tables are analysed in parallel using Rayon.
///
/// Results are returned in the order of `tables`.
pub fn compute_many(
    tables: &[ContingencyTable],
    cfg: &ImpactConfig,
    parallel: bool,
) -> Vec<Result<ImpactAnalysis, AdverseImpactError>> {
    if parallel {
        tables.par_iter().map(|t| compute_with_config(t, cfg)).collect()
    } else {
        tables.iter().map(|t| compute_with_config(t, cfg)).collect()
    }
}
