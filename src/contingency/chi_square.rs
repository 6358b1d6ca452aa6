use crate::constants::CHI2_DOF_2X2;
use crate::errors::AdverseImpactError;
use crate::table::{ContingencyTable, COLUMN_LABELS, ROW_LABELS};
use crate::utils::chi2_upper_tail;

/// Pearson's chi-square test of independence, without continuity correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
    /// Expected frequencies under independence, laid out like `ContingencyTable::as_array`.
    pub expected: [[f64; 2]; 2],
}

impl ChiSquareTest {
    /// Smallest cell of the expected frequency table.
    pub fn min_expected_frequency(&self) -> f64 {
        self.expected.iter().flatten().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Either a computed test, or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq)]
pub enum ChiSquareOutcome {
    Computed(ChiSquareTest),
    NotComputable { reason: String },
}

impl ChiSquareOutcome {
    pub fn computed(&self) -> Option<&ChiSquareTest> {
        match self {
            ChiSquareOutcome::Computed(test) => Some(test),
            ChiSquareOutcome::NotComputable { .. } => None,
        }
    }
}

/// Expected cell counts, `row_total * column_total / n`.
pub fn expected_frequencies(table: &ContingencyTable) -> [[f64; 2]; 2] {
    let rows = table.row_totals();
    let cols = table.column_totals();
    let n = table.total();
    let mut expected = [[0.0; 2]; 2];
    if n > 0.0 {
        for (r, row_total) in rows.iter().enumerate() {
            for (c, col_total) in cols.iter().enumerate() {
                expected[r][c] = row_total * col_total / n;
            }
        }
    }
    expected
}

/// Chi-square test of independence on a 2x2 table.
///
/// A table with an empty row or column has a zero expected frequency, the
/// statistic is undefined and `ChiSquareOutcome::NotComputable` is returned.
/// Errors are only returned if the reference distribution can not be built.
pub fn chi2_contingency(table: &ContingencyTable) -> Result<ChiSquareOutcome, AdverseImpactError> {
    let expected = expected_frequencies(table);
    for (r, row) in expected.iter().enumerate() {
        for (c, e) in row.iter().enumerate() {
            if *e <= 0.0 {
                return Ok(ChiSquareOutcome::NotComputable {
                    reason: format!(
                        "expected frequency table has a zero element at {}/{}",
                        ROW_LABELS[r], COLUMN_LABELS[c]
                    ),
                });
            }
        }
    }

    let observed = table.as_array();
    let statistic: f64 = observed
        .iter()
        .flatten()
        .zip(expected.iter().flatten())
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum();

    Ok(ChiSquareOutcome::Computed(ChiSquareTest {
        statistic,
        p_value: chi2_upper_tail(statistic, CHI2_DOF_2X2)?,
        dof: CHI2_DOF_2X2,
        expected,
    }))
}
