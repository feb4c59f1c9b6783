//! Fraud detection core
//!
//! Pure risk evaluation over a user's recent transaction window. No I/O
//! happens here: callers fetch the transaction snapshot and pass it in
//! together with the per-request thresholds.

pub mod evaluator;
pub mod geo;

pub use evaluator::{evaluate, EvaluationThresholds, Signal};
pub use geo::haversine_km;
