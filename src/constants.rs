/// Two-sided standard normal critical value for a 95% interval.
pub const Z_CRITICAL_95: f64 = 1.96;
/// Expected cell frequencies below this flag the table as small.
pub const MIN_EXPECTED_FREQUENCY: f64 = 10.0;
/// Decimal places kept in a score report.
pub const REPORT_DECIMALS: u32 = 3;
/// Relative tolerance used when comparing hypergeometric probabilities in Fisher's exact test.
pub const FISHER_RELATIVE_TOLERANCE: f64 = 1.0 + 1e-7;
/// Degrees of freedom of a chi-square test on a 2x2 table.
pub const CHI2_DOF_2X2: usize = 1;
/// Largest applicant total accepted by Fisher's exact test, every count up to it is exact in `f64`.
pub const FISHER_MAX_TOTAL: u64 = 1 << 53;
/// Tail summation in Fisher's exact test stops once a term falls below this share of the running sum.
pub const FISHER_TAIL_EPSILON: f64 = 1e-17;
