//! Autoplay Time - clocks and the resumable cycle timer
//!
//! This crate implements the timing half of the engine:
//! - Clock sources (monotonic for hosts, manual for simulation)
//! - The cycle clock, which remembers elapsed time across pauses
//! - A one-shot deadline timer with generation tokens

pub mod clock;
pub mod cycle;
pub mod timer;

pub use clock::*;
pub use cycle::*;
pub use timer::*;
