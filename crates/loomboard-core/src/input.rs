//! Low-level input types and click classification.
//!
//! Pointer timestamps are host-supplied milliseconds from any monotonic
//! clock; nothing here reads a real clock, so classification is fully
//! deterministic under test.

use crate::block::BlockId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Multi-select toggle modifier (Ctrl, or Cmd on macOS hosts).
    pub fn toggle_select(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Connect-gesture modifier.
    pub fn connect(&self) -> bool {
        self.shift
    }
}

/// Two consecutive qualifying clicks within this window form a double-click.
pub const DOUBLE_CLICK_WINDOW_MS: f64 = 300.0;

/// Outcome of classifying a qualifying pointer-up against the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    Double,
}

/// Classify a click from the previous click timestamp and the current one.
///
/// A double-click requires `0 < now - prev < 300ms`; the strict lower bound
/// means a previous timestamp of `0.0` ("no earlier click") never pairs with
/// a click at time zero.
pub fn classify_click(prev_timestamp_ms: f64, now_ms: f64) -> ClickKind {
    let dt = now_ms - prev_timestamp_ms;
    if dt > 0.0 && dt < DOUBLE_CLICK_WINDOW_MS {
        ClickKind::Double
    } else {
        ClickKind::Single
    }
}

/// What a click landed on, for per-target double-click bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickTarget {
    Canvas,
    Block(BlockId),
}

/// Tracks the last qualifying click per target.
///
/// After a double-click the stored timestamp resets to zero so a third rapid
/// click starts a fresh single/double pair instead of chaining.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last: HashMap<ClickTarget, f64>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a qualifying pointer-up on a target and classify it.
    pub fn click(&mut self, target: ClickTarget, now_ms: f64) -> ClickKind {
        let prev = self.last.get(&target).copied().unwrap_or(0.0);
        match classify_click(prev, now_ms) {
            ClickKind::Double => {
                self.last.insert(target, 0.0);
                ClickKind::Double
            }
            ClickKind::Single => {
                self.last.insert(target, now_ms);
                ClickKind::Single
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_classify_within_window() {
        assert_eq!(classify_click(1000.0, 1150.0), ClickKind::Double);
        assert_eq!(classify_click(1000.0, 1299.0), ClickKind::Double);
    }

    #[test]
    fn test_classify_outside_window() {
        assert_eq!(classify_click(1000.0, 1400.0), ClickKind::Single);
        assert_eq!(classify_click(1000.0, 1300.0), ClickKind::Single);
    }

    #[test]
    fn test_classify_zero_delta_is_single() {
        assert_eq!(classify_click(0.0, 0.0), ClickKind::Single);
        assert_eq!(classify_click(500.0, 500.0), ClickKind::Single);
    }

    #[test]
    fn test_tracker_double_then_reset() {
        let mut tracker = ClickTracker::new();
        let target = ClickTarget::Block(Uuid::new_v4());

        assert_eq!(tracker.click(target, 1000.0), ClickKind::Single);
        assert_eq!(tracker.click(target, 1150.0), ClickKind::Double);
        // Third rapid click must not chain into another double
        assert_eq!(tracker.click(target, 1250.0), ClickKind::Single);
        assert_eq!(tracker.click(target, 1350.0), ClickKind::Double);
    }

    #[test]
    fn test_tracker_slow_clicks_stay_single() {
        let mut tracker = ClickTracker::new();
        let target = ClickTarget::Canvas;

        assert_eq!(tracker.click(target, 0.0), ClickKind::Single);
        assert_eq!(tracker.click(target, 400.0), ClickKind::Single);
        assert_eq!(tracker.click(target, 800.0), ClickKind::Single);
    }

    #[test]
    fn test_tracker_targets_are_independent() {
        let mut tracker = ClickTracker::new();
        let a = ClickTarget::Block(Uuid::new_v4());
        let b = ClickTarget::Block(Uuid::new_v4());

        assert_eq!(tracker.click(a, 1000.0), ClickKind::Single);
        // Fast click on a different block is still that block's first click
        assert_eq!(tracker.click(b, 1100.0), ClickKind::Single);
        assert_eq!(tracker.click(a, 1200.0), ClickKind::Double);
    }

    #[test]
    fn test_modifier_roles() {
        let mods = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        assert!(mods.connect());
        assert!(!mods.toggle_select());

        let mods = Modifiers {
            meta: true,
            ..Modifiers::default()
        };
        assert!(mods.toggle_select());
    }
}
