//! Pointer event model
//!
//! The scroll engine only consumes a scalar position per sample, so events
//! carry one coordinate along the scrolled axis plus the time it was observed.

use std::time::Instant;

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    pub const POINTER_DOWN: EventType = 1;
    pub const POINTER_UP: EventType = 2;
    pub const POINTER_MOVE: EventType = 3;
    /// Pointer stream interrupted by the platform (e.g. touch cancel)
    pub const POINTER_CANCEL: EventType = 4;
    /// Programmatic offset change
    pub const SCROLL_TO: EventType = 30;
}

/// A single pointer sample along the scrolled axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub event_type: EventType,
    /// Position along the axis. Ignored for `POINTER_CANCEL`.
    pub pos: f64,
    pub timestamp: Instant,
}

impl PointerEvent {
    pub fn down(pos: f64, timestamp: Instant) -> Self {
        Self {
            event_type: event_types::POINTER_DOWN,
            pos,
            timestamp,
        }
    }

    pub fn moved(pos: f64, timestamp: Instant) -> Self {
        Self {
            event_type: event_types::POINTER_MOVE,
            pos,
            timestamp,
        }
    }

    pub fn up(pos: f64, timestamp: Instant) -> Self {
        Self {
            event_type: event_types::POINTER_UP,
            pos,
            timestamp,
        }
    }

    pub fn cancel(timestamp: Instant) -> Self {
        Self {
            event_type: event_types::POINTER_CANCEL,
            pos: f64::NAN,
            timestamp,
        }
    }
}
