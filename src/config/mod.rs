//! Run configuration and shared types.

pub mod types;
