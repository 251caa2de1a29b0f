//! Intent and run states
//!
//! Two orthogonal enums: [`Intent`] is what the user asked for, [`RunState`]
//! is what the cycle timer is actually doing. Only play/pause touch the
//! former; the latter is always derived.

use std::fmt;

/// The user's explicit play/pause desire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Intent {
    #[default]
    Playing,
    Paused,
}

impl Intent {
    #[inline]
    pub fn is_paused(self) -> bool {
        matches!(self, Intent::Paused)
    }

    #[inline]
    pub fn is_playing(self) -> bool {
        matches!(self, Intent::Playing)
    }

    /// The opposite intent, as applied by the play/pause toggle
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            Intent::Playing => Intent::Paused,
            Intent::Paused => Intent::Playing,
        }
    }

    /// Accessible label of the button that changes this intent
    pub fn action_label(self) -> &'static str {
        match self {
            Intent::Playing => "Pause",
            Intent::Paused => "Play",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Playing => f.write_str("playing"),
            Intent::Paused => f.write_str("paused"),
        }
    }
}

/// Whether the cycle timer is armed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    Active,
    #[default]
    Idle,
}

impl RunState {
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, RunState::Active)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Active => f.write_str("running"),
            RunState::Idle => f.write_str("stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_toggle() {
        assert_eq!(Intent::Playing.toggled(), Intent::Paused);
        assert_eq!(Intent::Paused.toggled(), Intent::Playing);
        assert_eq!(Intent::default(), Intent::Playing);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Intent::Paused.action_label(), "Play");
        assert_eq!(Intent::Playing.action_label(), "Pause");
        assert_eq!(RunState::Active.to_string(), "running");
        assert!(!RunState::default().is_active());
    }
}
