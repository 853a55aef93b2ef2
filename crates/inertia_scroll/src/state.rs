//! Scroll state machine

use inertia_core::{event_types, EventType, StateTransitions};
use serde::{Deserialize, Serialize};

/// Scroll-specific event ids, fired by the engine itself
pub mod scroll_events {
    use inertia_core::EventType;

    /// Momentum crossed a content edge with bounce enabled
    pub const HIT_EDGE: EventType = 100;
    /// Overshoot reached its limit; settling begins
    pub const REACHED_LIMIT: EventType = 101;
    /// Motion finished
    pub const SETTLED: EventType = 102;
}

/// Phase of one scroll axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollState {
    /// Nothing moving
    #[default]
    Idle,
    /// Pointer is down, offset follows it synchronously
    Dragging,
    /// Released, momentum decaying frame by frame
    Decelerating,
    /// Momentum carried past an edge, running out toward the bounce limit
    BounceOvershoot,
    /// Overshoot shrinking back onto the edge
    SettleFix,
}

impl ScrollState {
    /// Any state other than Idle
    pub fn is_active(&self) -> bool {
        !matches!(self, ScrollState::Idle)
    }

    /// States driven by scheduled frames rather than pointer input
    pub fn is_animating(&self) -> bool {
        matches!(
            self,
            ScrollState::Decelerating | ScrollState::BounceOvershoot | ScrollState::SettleFix
        )
    }
}

impl StateTransitions for ScrollState {
    fn on_event(&self, event: EventType) -> Option<Self> {
        use scroll_events::*;
        match (self, event) {
            // A press always starts a fresh gesture, interrupting any animation
            (_, event_types::POINTER_DOWN) => Some(ScrollState::Dragging),
            (ScrollState::Dragging, event_types::POINTER_UP | event_types::POINTER_CANCEL) => {
                Some(ScrollState::Decelerating)
            }
            (ScrollState::Decelerating, HIT_EDGE) => Some(ScrollState::BounceOvershoot),
            (ScrollState::Decelerating | ScrollState::BounceOvershoot, REACHED_LIMIT) => {
                Some(ScrollState::SettleFix)
            }
            (_, SETTLED) => Some(ScrollState::Idle),
            (_, event_types::SCROLL_TO) => Some(ScrollState::Idle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scroll_events::*;

    #[test]
    fn test_full_bounce_path() {
        let mut state = ScrollState::Idle;
        assert!(state.apply(event_types::POINTER_DOWN));
        assert_eq!(state, ScrollState::Dragging);
        assert!(state.apply(event_types::POINTER_UP));
        assert_eq!(state, ScrollState::Decelerating);
        assert!(state.apply(HIT_EDGE));
        assert_eq!(state, ScrollState::BounceOvershoot);
        assert!(state.apply(REACHED_LIMIT));
        assert_eq!(state, ScrollState::SettleFix);
        assert!(state.apply(SETTLED));
        assert_eq!(state, ScrollState::Idle);
    }

    #[test]
    fn test_release_ignored_when_idle() {
        let mut state = ScrollState::Idle;
        assert!(!state.apply(event_types::POINTER_UP));
        assert!(!state.apply(HIT_EDGE));
        assert_eq!(state, ScrollState::Idle);
    }

    #[test]
    fn test_press_interrupts_animation() {
        for from in [
            ScrollState::Decelerating,
            ScrollState::BounceOvershoot,
            ScrollState::SettleFix,
        ] {
            assert_eq!(
                from.on_event(event_types::POINTER_DOWN),
                Some(ScrollState::Dragging)
            );
            assert_eq!(from.on_event(event_types::SCROLL_TO), Some(ScrollState::Idle));
        }
    }

    #[test]
    fn test_edge_before_release_is_ignored() {
        assert_eq!(ScrollState::Dragging.on_event(HIT_EDGE), None);
        assert_eq!(ScrollState::SettleFix.on_event(HIT_EDGE), None);
    }

    #[test]
    fn test_activity_flags() {
        assert!(!ScrollState::Idle.is_active());
        assert!(ScrollState::Dragging.is_active());
        assert!(!ScrollState::Dragging.is_animating());
        assert!(ScrollState::SettleFix.is_animating());
    }
}
