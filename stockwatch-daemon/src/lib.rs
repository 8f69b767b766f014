//! Stockwatch daemon library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `stockwatch-daemon` is used as a binary (main.rs).

pub mod cli;
pub mod logging;
pub mod orchestrator;
pub mod pool;
pub mod reporter;
pub mod scan_task;
pub mod simulator;
