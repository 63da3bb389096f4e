//! Shared helpers for Arrow data, logging and tests

pub mod arrow;
pub mod logging;
pub mod test;
