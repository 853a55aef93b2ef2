//! Event-driven state transitions
//!
//! State enums implement [`StateTransitions`] to map an incoming event id to
//! the next state. Returning `None` means the event is ignored in that state.
//!
//! ```rust
//! use inertia_core::{event_types::*, StateTransitions};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
//! enum Press {
//!     #[default]
//!     Up,
//!     Down,
//! }
//!
//! impl StateTransitions for Press {
//!     fn on_event(&self, event: u32) -> Option<Self> {
//!         match (self, event) {
//!             (Press::Up, POINTER_DOWN) => Some(Press::Down),
//!             (Press::Down, POINTER_UP) => Some(Press::Up),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! assert_eq!(Press::Up.on_event(POINTER_DOWN), Some(Press::Down));
//! assert_eq!(Press::Up.on_event(POINTER_UP), None);
//! ```

use std::hash::Hash;

/// Trait for state types that can handle event transitions
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + Send + Sync + std::fmt::Debug + 'static
{
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: u32) -> Option<Self>;

    /// Apply an event in place, returning true if the state changed
    fn apply(&mut self, event: u32) -> bool {
        match self.on_event(event) {
            Some(next) if next != *self => {
                tracing::trace!("state {:?} -> {:?} (event {})", self, next, event);
                *self = next;
                true
            }
            Some(_) | None => false,
        }
    }
}
