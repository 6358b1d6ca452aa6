//! Contingency Tests
//!
//! Tests of association computed directly on the raw 2x2 counts:
//! Fisher's exact test and Pearson's chi-square test of independence.
pub mod chi_square;
pub mod fisher;

pub use chi_square::{chi2_contingency, ChiSquareOutcome, ChiSquareTest};
pub use fisher::{fisher_exact, FisherExact};
