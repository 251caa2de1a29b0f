//! Autoplay Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by every autoplay crate:
//! - Identifiers (EngineId, TimerToken)
//! - Time primitives (Timestamp)
//! - Intent and run states
//! - Navigation events and their origin
//! - Direction resolution
//! - The construction-time error type

pub mod id;
pub mod time;
pub mod state;
pub mod event;
pub mod direction;
pub mod error;

pub use id::*;
pub use time::*;
pub use state::*;
pub use event::*;
pub use direction::*;
pub use error::*;
