//! Autoplay State - intent/run reconciliation
//!
//! This crate decides whether the cycle timer should be running:
//! - Environmental inputs (viewport and tab visibility)
//! - The page-wide block predicate
//! - The single reconciliation rule and the transitions it yields

pub mod inputs;
pub mod reconcile;

pub use inputs::*;
pub use reconcile::*;
