pub mod demand;
pub mod discount;
pub mod dispatch;
pub mod engine;
pub mod fleet;
pub mod scenario;
/// Battery state-of-charge model used by the dispatch.
pub mod storage;
pub mod types;
