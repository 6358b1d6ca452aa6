//! Contingency Table
//!
//! The 2x2 selection table every statistic in this crate is computed from.
//! Rows are the majority and minority groups, columns are the selected and
//! not-selected outcomes. Counts are held as named fields, so a table built in
//! Rust can not be mislabeled; label checks only run when a table arrives from
//! untyped input (`from_labeled`, `from_json`, or a `serde_json::Value`).
use crate::errors::AdverseImpactError;
use crate::utils::items_to_strings;
use serde_json::{Map, Value};

/// Row labels, in row order.
pub const ROW_LABELS: [&str; 2] = ["majority", "minority"];
/// Column labels, in column order.
pub const COLUMN_LABELS: [&str; 2] = ["selected", "not-selected"];

/// Counts of a 2x2 group by outcome table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContingencyTable {
    majority_selected: f64,
    majority_not_selected: f64,
    minority_selected: f64,
    minority_not_selected: f64,
}

fn validate_count(cell: &str, value: f64) -> Result<f64, AdverseImpactError> {
    if !value.is_finite() {
        Err(AdverseImpactError::InvalidCount(
            cell.to_string(),
            value,
            "counts must be finite".to_string(),
        ))
    } else if value < 0.0 {
        Err(AdverseImpactError::InvalidCount(
            cell.to_string(),
            value,
            "counts must be non-negative".to_string(),
        ))
    } else {
        Ok(value)
    }
}

/// Map each expected label to its position in `found`, failing unless
/// `found` holds exactly the expected labels, in any order.
fn label_positions(axis: &str, expected: &[&str; 2], found: &[&str]) -> Result<[usize; 2], AdverseImpactError> {
    let shape_error = || {
        AdverseImpactError::InvalidTableShape(
            axis.to_string(),
            format!("[{}]", items_to_strings(expected)),
            format!("[{}]", items_to_strings(found)),
        )
    };
    if found.len() != expected.len() {
        return Err(shape_error());
    }
    let mut positions = [0; 2];
    for (slot, label) in positions.iter_mut().zip(expected.iter()) {
        let mut matches = found.iter().enumerate().filter(|(_, f)| *f == label);
        match (matches.next(), matches.next()) {
            (Some((i, _)), None) => *slot = i,
            _ => return Err(shape_error()),
        }
    }
    Ok(positions)
}

impl ContingencyTable {
    /// Create a table from the four counts.
    ///
    /// * `majority_selected` - Majority applicants selected.
    /// * `majority_not_selected` - Majority applicants not selected.
    /// * `minority_selected` - Minority applicants selected.
    /// * `minority_not_selected` - Minority applicants not selected.
    pub fn new(
        majority_selected: f64,
        majority_not_selected: f64,
        minority_selected: f64,
        minority_not_selected: f64,
    ) -> Result<Self, AdverseImpactError> {
        Ok(ContingencyTable {
            majority_selected: validate_count("majority/selected", majority_selected)?,
            majority_not_selected: validate_count("majority/not-selected", majority_not_selected)?,
            minority_selected: validate_count("minority/selected", minority_selected)?,
            minority_not_selected: validate_count("minority/not-selected", minority_not_selected)?,
        })
    }

    /// Create a table from labeled rows and columns, looking each cell up by label.
    ///
    /// * `row_labels` - Must be exactly `majority` and `minority`, in any order.
    /// * `column_labels` - Must be exactly `selected` and `not-selected`, in any order.
    /// * `cells` - Row major counts, `cells[row][column]`, positioned to match the labels.
    pub fn from_labeled(
        row_labels: &[&str],
        column_labels: &[&str],
        cells: &[Vec<f64>],
    ) -> Result<Self, AdverseImpactError> {
        let rows = label_positions("row", &ROW_LABELS, row_labels)?;
        let cols = label_positions("column", &COLUMN_LABELS, column_labels)?;
        if cells.len() != 2 || cells.iter().any(|r| r.len() != 2) {
            let found: Vec<String> = cells.iter().map(|r| r.len().to_string()).collect();
            return Err(AdverseImpactError::InvalidTableShape(
                "cell".to_string(),
                "2 rows of 2 counts".to_string(),
                format!("{} rows of [{}] counts", cells.len(), found.join(", ")),
            ));
        }
        let cell = |r: usize, c: usize| cells[rows[r]][cols[c]];
        ContingencyTable::new(cell(0, 0), cell(0, 1), cell(1, 0), cell(1, 1))
    }

    /// Parse a table from a json object of the form
    /// `{"majority": {"selected": 80, "not-selected": 20}, "minority": {...}}`.
    ///
    /// * `json_str` - String object, which can be parsed to json.
    pub fn from_json(json_str: &str) -> Result<Self, AdverseImpactError> {
        let value: Value =
            serde_json::from_str(json_str).map_err(|e| AdverseImpactError::UnableToRead(format!("table: {}", e)))?;
        ContingencyTable::try_from(&value)
    }

    /// Dump the table as a labeled json object.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "majority": {"selected": self.majority_selected, "not-selected": self.majority_not_selected},
            "minority": {"selected": self.minority_selected, "not-selected": self.minority_not_selected},
        })
    }

    /// Counts in row major order, rows `[majority, minority]`, columns `[selected, not-selected]`.
    pub fn as_array(&self) -> [[f64; 2]; 2] {
        [
            [self.majority_selected, self.majority_not_selected],
            [self.minority_selected, self.minority_not_selected],
        ]
    }

    pub fn majority_selected(&self) -> f64 {
        self.majority_selected
    }
    pub fn majority_not_selected(&self) -> f64 {
        self.majority_not_selected
    }
    pub fn minority_selected(&self) -> f64 {
        self.minority_selected
    }
    pub fn minority_not_selected(&self) -> f64 {
        self.minority_not_selected
    }

    /// Row sums, `[majority, minority]`.
    pub fn row_totals(&self) -> [f64; 2] {
        [
            self.majority_selected + self.majority_not_selected,
            self.minority_selected + self.minority_not_selected,
        ]
    }

    /// Column sums, `[selected, not-selected]`.
    pub fn column_totals(&self) -> [f64; 2] {
        [
            self.majority_selected + self.minority_selected,
            self.majority_not_selected + self.minority_not_selected,
        ]
    }

    pub fn total(&self) -> f64 {
        self.row_totals().iter().sum()
    }
}

fn labeled_object<'a>(
    axis: &str,
    expected: &[&str; 2],
    value: &'a Value,
) -> Result<&'a Map<String, Value>, AdverseImpactError> {
    value.as_object().ok_or_else(|| {
        AdverseImpactError::InvalidTableShape(
            axis.to_string(),
            format!("[{}]", items_to_strings(expected)),
            format!("non-object value {}", value),
        )
    })
}

impl TryFrom<&Value> for ContingencyTable {
    type Error = AdverseImpactError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let rows = labeled_object("row", &ROW_LABELS, value)?;
        let row_keys: Vec<&str> = rows.keys().map(String::as_str).collect();
        label_positions("row", &ROW_LABELS, &row_keys)?;

        let mut counts = [[0.0; 2]; 2];
        for (r, row_label) in ROW_LABELS.iter().enumerate() {
            let columns = labeled_object("column", &COLUMN_LABELS, &rows[*row_label])?;
            let column_keys: Vec<&str> = columns.keys().map(String::as_str).collect();
            label_positions("column", &COLUMN_LABELS, &column_keys)?;
            for (c, column_label) in COLUMN_LABELS.iter().enumerate() {
                let cell = &columns[*column_label];
                counts[r][c] = cell.as_f64().ok_or_else(|| {
                    AdverseImpactError::UnableToRead(format!(
                        "table: cell {}/{} is not a number ({})",
                        row_label, column_label, cell
                    ))
                })?;
            }
        }
        ContingencyTable::new(counts[0][0], counts[0][1], counts[1][0], counts[1][1])
    }
}
