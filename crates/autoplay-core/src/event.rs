//! Navigation events
//!
//! Every carousel navigation carries its origin. The engine's own advances
//! are tagged [`NavigationOrigin::Programmatic`]; anything a person did is
//! [`NavigationOrigin::User`]. Only the latter resets the cycle.

/// Who caused a navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavigationOrigin {
    /// Issued by the engine through its advance trigger
    Programmatic,
    /// A human clicked a control or dragged the track
    User,
}

/// How the carousel was moved
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavigationKind {
    /// A previous/next control was activated
    ControlActivated,
    /// A drag gesture moved past the movement threshold
    Drag,
}

/// A navigation of the carousel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NavigationEvent {
    pub origin: NavigationOrigin,
    pub kind: NavigationKind,
}

impl NavigationEvent {
    #[inline]
    pub fn new(origin: NavigationOrigin, kind: NavigationKind) -> Self {
        NavigationEvent { origin, kind }
    }

    /// The event produced when the engine activates its advance control
    #[inline]
    pub fn programmatic() -> Self {
        Self::new(NavigationOrigin::Programmatic, NavigationKind::ControlActivated)
    }

    /// A person clicked a navigation control
    #[inline]
    pub fn user_activation() -> Self {
        Self::new(NavigationOrigin::User, NavigationKind::ControlActivated)
    }

    /// A person completed a drag gesture
    #[inline]
    pub fn user_drag() -> Self {
        Self::new(NavigationOrigin::User, NavigationKind::Drag)
    }

    #[inline]
    pub fn is_user(&self) -> bool {
        self.origin == NavigationOrigin::User
    }
}
