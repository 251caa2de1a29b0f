//! Drag gesture tracking
//!
//! Turns pointer press/move/release on the carousel track into manual
//! navigation events. A press that never moves further than the threshold
//! is a click on the track, not a drag, and produces nothing.

use autoplay_core::NavigationEvent;

/// Movement, in pixels along either axis, beyond which a press is a drag
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

/// Pointer tracker for one carousel track
#[derive(Clone, Debug)]
pub struct DragTracker {
    threshold: f64,
    origin: Option<(f64, f64)>,
    moved: bool,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::with_threshold(DRAG_THRESHOLD_PX)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        DragTracker {
            threshold,
            origin: None,
            moved: false,
        }
    }

    /// Mouse down / touch start
    pub fn press(&mut self, x: f64, y: f64) {
        self.origin = Some((x, y));
        self.moved = false;
    }

    /// Mouse / touch move. Ignored without a prior press.
    pub fn motion(&mut self, x: f64, y: f64) {
        let Some((ox, oy)) = self.origin else {
            return;
        };
        if (x - ox).abs() > self.threshold || (y - oy).abs() > self.threshold {
            self.moved = true;
        }
    }

    /// Mouse up / touch end. Yields a drag event if the pointer moved.
    pub fn release(&mut self) -> Option<NavigationEvent> {
        let dragged = self.origin.take().is_some() && self.moved;
        self.moved = false;
        dragged.then(NavigationEvent::user_drag)
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.origin.is_some()
    }
}

impl Default for DragTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_beyond_threshold() {
        let mut tracker = DragTracker::new();
        tracker.press(100.0, 50.0);
        tracker.motion(106.0, 50.0);

        assert_eq!(tracker.release(), Some(NavigationEvent::user_drag()));
        assert!(!tracker.is_pressed());
    }

    #[test]
    fn test_click_without_movement() {
        let mut tracker = DragTracker::new();
        tracker.press(100.0, 50.0);

        assert_eq!(tracker.release(), None);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut tracker = DragTracker::new();
        tracker.press(0.0, 0.0);
        tracker.motion(5.0, -5.0);

        assert_eq!(tracker.release(), None);
    }

    #[test]
    fn test_vertical_drag_counts() {
        let mut tracker = DragTracker::new();
        tracker.press(0.0, 0.0);
        tracker.motion(0.0, 12.0);
        tracker.motion(0.0, 1.0);

        assert!(tracker.release().is_some());
    }

    #[test]
    fn test_motion_without_press() {
        let mut tracker = DragTracker::new();
        tracker.motion(50.0, 50.0);

        assert_eq!(tracker.release(), None);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_drag_iff_any_motion_beyond_threshold(
                path in prop::collection::vec((-30.0f64..30.0, -30.0f64..30.0), 0..12)
            ) {
                let mut tracker = DragTracker::new();
                tracker.press(0.0, 0.0);
                for &(x, y) in &path {
                    tracker.motion(x, y);
                }
                let expected = path
                    .iter()
                    .any(|(x, y)| x.abs() > DRAG_THRESHOLD_PX || y.abs() > DRAG_THRESHOLD_PX);

                prop_assert_eq!(tracker.release().is_some(), expected);
                prop_assert_eq!(tracker.release(), None);
            }
        }
    }
}
