//! E2E test scenarios.

mod aggregation;
mod fault_isolation;
mod lifecycle;
mod shutdown;
