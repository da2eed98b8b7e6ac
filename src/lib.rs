//! Social cost-benefit analysis of electricity-supply pathways for an island power system.

pub mod analysis;
pub mod config;
pub mod economics;
pub mod error;
pub mod io;
/// Demand, fleet, dispatch and per-scenario evaluation.
pub mod model;
pub mod params;
pub mod reporting;
pub mod runner;
