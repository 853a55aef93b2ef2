//! Inertia Core
//!
//! Foundational primitives shared by the Inertia crates:
//!
//! - **Pointer Events**: Press/move/release/cancel samples along one axis
//! - **State Transitions**: Event-driven enum state machines
//! - **Clocks**: Wall-clock and manually driven time sources for frame loops
//!
//! # Example
//!
//! ```rust
//! use inertia_core::{Clock, ManualClock};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_millis(16));
//! assert_eq!(clock.now() - start, Duration::from_millis(16));
//! ```

pub mod clock;
pub mod events;
pub mod transitions;

pub use clock::{elapsed_ms, millis, Clock, ManualClock, SystemClock};
pub use events::{event_types, EventType, PointerEvent};
pub use transitions::StateTransitions;
