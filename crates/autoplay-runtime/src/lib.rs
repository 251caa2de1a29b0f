//! Autoplay Runtime - one engine per carousel
//!
//! This crate assembles the engine and everything around it:
//! 1. Collaborator seams (advance trigger, affordance sinks)
//! 2. The engine: intent/run reconciliation driving the cycle clock
//! 3. Progress sampling on the display-refresh cadence
//! 4. Drag gesture tracking for manual navigation
//! 5. Configuration layering and validation
//! 6. Page bootstrap and the page-wide engine registry
//! 7. A tokio driver that plays the role of the event loop
//! 8. Logging setup

pub mod collab;
pub mod engine;
pub mod progress;
pub mod gesture;
pub mod config;
pub mod bootstrap;
pub mod registry;
pub mod driver;
pub mod logging;

pub use collab::*;
pub use engine::*;
pub use progress::*;
pub use gesture::*;
pub use config::*;
pub use bootstrap::*;
pub use registry::*;
pub use driver::*;
