// Modules
pub mod analysis;
pub mod config;
pub mod constants;
pub mod contingency;
pub mod errors;
pub mod impact_ratio;
pub mod rates;
pub mod report;
pub mod table;
pub mod utils;
pub mod ztest;

// Individual classes, and functions
pub use analysis::{compute, compute_json, compute_labeled, compute_many, compute_with_config};
pub use config::{ConfigIO, DegeneratePolicy, ImpactConfig};
pub use errors::AdverseImpactError;
pub use report::{Advisory, ImpactAnalysis, ScoreReport};
pub use table::ContingencyTable;
