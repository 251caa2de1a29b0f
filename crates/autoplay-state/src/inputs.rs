//! Environmental inputs
//!
//! Viewport and tab visibility are pushed to the engine as they change.
//! The block predicate is pulled: it is queried fresh on every
//! reconciliation and never cached.

use std::fmt;
use std::str::FromStr;

/// Page-wide condition that forbids autoplay (editor open, modal, menu...)
pub trait BlockPredicate: Send {
    fn is_blocked(&self) -> bool;
}

impl<F> BlockPredicate for F
where
    F: Fn() -> bool + Send,
{
    fn is_blocked(&self) -> bool {
        self()
    }
}

/// Predicate for pages that never block autoplay
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverBlocked;

impl BlockPredicate for NeverBlocked {
    fn is_blocked(&self) -> bool {
        false
    }
}

/// What hiding the browser tab does to the user's intent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TabPolicy {
    /// Stop silently and resume when the tab comes back
    #[default]
    PreserveIntent,
    /// Switch intent to paused; the user must press play again
    ForcePause,
}

impl FromStr for TabPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" | "preserve-intent" | "resume" => Ok(TabPolicy::PreserveIntent),
            "pause" | "force-pause" => Ok(TabPolicy::ForcePause),
            other => Err(format!("unknown tab policy {other:?}")),
        }
    }
}

impl fmt::Display for TabPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabPolicy::PreserveIntent => f.write_str("preserve"),
            TabPolicy::ForcePause => f.write_str("pause"),
        }
    }
}

/// Last known environmental signals of one carousel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Environment {
    /// Carousel root intersects the (margin-adjusted) viewport
    pub visible: bool,
    /// Hosting tab is hidden
    pub tab_hidden: bool,
}

impl Default for Environment {
    fn default() -> Self {
        // Assume on screen until the visibility source says otherwise
        Environment {
            visible: true,
            tab_hidden: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_predicate() {
        let blocked = || true;
        assert!(blocked.is_blocked());
        assert!(!NeverBlocked.is_blocked());
    }

    #[test]
    fn test_tab_policy_parse() {
        assert_eq!("Pause".parse::<TabPolicy>(), Ok(TabPolicy::ForcePause));
        assert_eq!(" preserve ".parse::<TabPolicy>(), Ok(TabPolicy::PreserveIntent));
        assert!("sometimes".parse::<TabPolicy>().is_err());
    }

    #[test]
    fn test_environment_starts_visible() {
        let env = Environment::default();
        assert!(env.visible);
        assert!(!env.tab_hidden);
    }
}
