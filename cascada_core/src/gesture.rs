// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Swipe classification and the server sheet's open/closed state.
//!
//! Only vertical swipes do anything: up opens the server sheet, down closes
//! it. Horizontal swipes are ignored so a gesture can never change channel.

/// A touch position in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position (grows downwards).
    pub y: f64,
}

impl TouchPoint {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a completed swipe asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwipeAction {
    /// Swipe up.
    OpenSheet,
    /// Swipe down.
    CloseSheet,
}

/// Classifies a swipe by its delta.
///
/// Deltas under `threshold` on both axes are taps; mostly-horizontal swipes
/// (including exact diagonals) are ignored.
#[must_use]
pub fn classify(dx: f64, dy: f64, threshold: f64) -> Option<SwipeAction> {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax < threshold && ay < threshold {
        return None;
    }
    if ay <= ax {
        return None;
    }
    Some(if dy < 0.0 {
        SwipeAction::OpenSheet
    } else {
        SwipeAction::CloseSheet
    })
}

/// Tracks one touch from start to end.
#[derive(Clone, Copy, Debug)]
pub struct SwipeTracker {
    threshold: f64,
    start: Option<TouchPoint>,
}

impl SwipeTracker {
    /// Creates a tracker with the given minimum delta.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            start: None,
        }
    }

    /// Records the start of a touch.
    pub fn touch_start(&mut self, at: TouchPoint) {
        self.start = Some(at);
    }

    /// Completes the touch and classifies it. A touch end without a start is
    /// ignored.
    pub fn touch_end(&mut self, at: TouchPoint) -> Option<SwipeAction> {
        let start = self.start.take()?;
        classify(at.x - start.x, at.y - start.y, self.threshold)
    }
}

/// Open/closed state of the server selection sheet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SheetState {
    open: bool,
}

impl SheetState {
    /// Returns `true` if the sheet is open.
    #[must_use]
    pub const fn is_open(self) -> bool {
        self.open
    }

    /// Sets the state. Returns `true` if it changed.
    pub fn set_open(&mut self, open: bool) -> bool {
        let changed = self.open != open;
        self.open = open;
        changed
    }

    /// Applies a swipe.
    pub fn apply(&mut self, action: SwipeAction) -> bool {
        self.set_open(action == SwipeAction::OpenSheet)
    }

    /// Value for the toggle button's `aria-expanded` attribute.
    #[must_use]
    pub const fn aria_expanded(self) -> &'static str {
        if self.open { "true" } else { "false" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_swipes_open_and_close() {
        assert_eq!(classify(5.0, -80.0, 30.0), Some(SwipeAction::OpenSheet));
        assert_eq!(classify(-5.0, 80.0, 30.0), Some(SwipeAction::CloseSheet));
    }

    #[test]
    fn small_and_horizontal_swipes_are_ignored() {
        assert_eq!(classify(10.0, -29.0, 30.0), None);
        assert_eq!(classify(120.0, 40.0, 30.0), None);
        assert_eq!(classify(-60.0, -60.0, 30.0), None);
    }

    #[test]
    fn one_axis_over_threshold_is_enough() {
        assert_eq!(classify(0.0, -30.0, 30.0), Some(SwipeAction::OpenSheet));
    }

    #[test]
    fn tracker_needs_a_start() {
        let mut tracker = SwipeTracker::new(30.0);
        assert_eq!(tracker.touch_end(TouchPoint::new(0.0, 100.0)), None);

        tracker.touch_start(TouchPoint::new(10.0, 300.0));
        assert_eq!(
            tracker.touch_end(TouchPoint::new(12.0, 200.0)),
            Some(SwipeAction::OpenSheet)
        );
        assert_eq!(tracker.touch_end(TouchPoint::new(12.0, 500.0)), None);
    }

    #[test]
    fn sheet_reports_changes() {
        let mut sheet = SheetState::default();
        assert_eq!(sheet.aria_expanded(), "false");
        assert!(sheet.apply(SwipeAction::OpenSheet));
        assert!(!sheet.set_open(true));
        assert_eq!(sheet.aria_expanded(), "true");
        assert!(sheet.apply(SwipeAction::CloseSheet));
        assert!(!sheet.is_open());
    }
}
