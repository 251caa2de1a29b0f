//! Collaborator seams
//!
//! The engine owns none of the page. It talks to the carousel through the
//! traits below; hosts implement them over real elements, tests over
//! recorders.

use autoplay_core::NavigationEvent;

/// A navigation control the engine can activate once per cycle
pub trait AdvanceTrigger: Send {
    /// Activate the control
    ///
    /// `event` is the tagged navigation the host must report back to
    /// [`crate::Engine::on_navigation`] if it observes the activation, so
    /// the engine can tell its own advances apart from a person's.
    fn activate(&mut self, event: NavigationEvent);
}

impl<F> AdvanceTrigger for F
where
    F: FnMut(NavigationEvent) + Send,
{
    fn activate(&mut self, event: NavigationEvent) {
        self(event)
    }
}

/// Play/pause button and progress ring of one carousel
pub trait AffordanceSink: Send {
    /// Show the paused (play icon) or playing (pause icon) affordance
    fn show_paused(&mut self, paused: bool);

    /// Show cycle progress, in degrees of a full ring
    fn show_progress(&mut self, degrees: f64);

    /// Accessible label of the play/pause button ("Play" or "Pause")
    fn show_action_label(&mut self, _label: &'static str) {}
}

/// The carousel's previous/next controls, in that order
#[derive(Default)]
pub struct NavigationControls {
    controls: Vec<Option<Box<dyn AdvanceTrigger>>>,
}

impl NavigationControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both controls present
    pub fn pair(previous: Box<dyn AdvanceTrigger>, next: Box<dyn AdvanceTrigger>) -> Self {
        NavigationControls {
            controls: vec![Some(previous), Some(next)],
        }
    }

    /// Append the next control in document order
    pub fn push(&mut self, control: Box<dyn AdvanceTrigger>) {
        self.controls.push(Some(control));
    }

    /// Number of controls found
    pub fn len(&self) -> usize {
        self.controls.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return the control at `index`
    pub fn take(&mut self, index: usize) -> Option<Box<dyn AdvanceTrigger>> {
        self.controls.get_mut(index).and_then(Option::take)
    }
}

impl std::fmt::Debug for NavigationControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationControls")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_leaves_gap() {
        let mut controls = NavigationControls::pair(
            Box::new(|_: NavigationEvent| {}),
            Box::new(|_: NavigationEvent| {}),
        );
        assert_eq!(controls.len(), 2);

        assert!(controls.take(1).is_some());
        assert!(controls.take(1).is_none());
        assert_eq!(controls.len(), 1);
        assert!(controls.take(5).is_none());
    }

    #[test]
    fn test_single_control() {
        let mut controls = NavigationControls::new();
        assert!(controls.is_empty());

        controls.push(Box::new(|_: NavigationEvent| {}));
        assert!(controls.take(0).is_some());
        assert!(controls.take(1).is_none());
    }
}
