//! Autoplay Test Harness - deterministic simulation and validation
//!
//! This crate provides:
//! - Recording collaborators (trigger, affordance sink, switchable block)
//! - A virtual-time event loop driving a real engine
//! - Randomized signal fuzzing against the reconciliation invariant
//! - The end-to-end scenario suite

pub mod recorder;
pub mod simulator;
pub mod fuzzer;
pub mod scenarios;

pub use recorder::*;
pub use simulator::*;
pub use fuzzer::*;
pub use scenarios::*;
