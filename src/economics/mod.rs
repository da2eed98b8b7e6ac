//! Economic evaluation layered on top of scenario outcomes.
//!
//! - `metrics`: NPV, BCR and IRR of each alternative against the status quo
//! - `financing`: grant and loan mix, debt service and grant elements
//! - `distribution`: tariff impact by income quintile with equity weights

pub mod distribution;
pub mod financing;
pub mod metrics;
