//! The minimization search engine.
//!
//! Control flow per round: the driver asks the generator for a batch of
//! leave-one-out candidates, the scheduler runs them through the oracle
//! with bounded parallelism, and the reducer intersects the successful
//! outcomes into a narrower baseline.

pub mod candidates;
pub mod driver;
pub mod reduce;
pub mod scheduler;

pub use driver::minimize;
pub use scheduler::{TrialOutcome, TrialScheduler};
