//! E2E integration tests for stockwatch-daemon.
//!
//! These tests drive the full orchestrator (pool, consumers, reporter,
//! two-phase shutdown) against scripted scanners.
//!
//! # Test Structure
//!
//! - `helpers/` -- Shared test utilities (scripted scanners, config builders)
//! - `scenarios/` -- Test files organized by scenario
//!
//! # Running
//!
//! ```bash
//! cargo test -p stockwatch-daemon --test e2e
//! ```

mod helpers;
mod scenarios;
