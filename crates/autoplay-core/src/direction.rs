//! Direction resolution
//!
//! Maps a configured direction token onto one of the two navigation
//! controls (index 0 = previous, index 1 = next).

use std::fmt;

/// Tokens that select the previous control, compared case-insensitively
const BACKWARD_TOKENS: [&str; 6] = ["0", "left", "back", "backwards", "prev", "previous"];

/// Which way the carousel auto-advances
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    Backwards,
    #[default]
    Forwards,
}

impl Direction {
    /// Resolve a direction token. Unknown tokens mean forwards.
    pub fn resolve(token: &str) -> Self {
        let token = token.trim().to_ascii_lowercase();
        if BACKWARD_TOKENS.contains(&token.as_str()) {
            Direction::Backwards
        } else {
            Direction::Forwards
        }
    }

    /// Index of the navigation control acting as advance trigger
    #[inline]
    pub fn control_index(self) -> usize {
        match self {
            Direction::Backwards => 0,
            Direction::Forwards => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Backwards => f.write_str("backwards"),
            Direction::Forwards => f.write_str("forwards"),
        }
    }
}
