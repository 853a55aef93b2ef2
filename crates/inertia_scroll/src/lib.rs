//! Inertia Scroll
//!
//! Inertial scrolling for a single axis: the offset follows the pointer while
//! pressed, coasts after release, and springs back when it overshoots an
//! edge.
//!
//! # Features
//!
//! - **Rubber-band edges**: Drags past an edge are resisted, more so the further they go
//! - **Momentum**: Flicks keep moving with a cosine-shaped decay
//! - **Overshoot and settle**: Momentum that crosses an edge runs out, then eases back
//! - **Host-driven frames**: No threads or timers; call [`Scroll::tick`] once per frame
//! - **Tunable**: Every feel constant is a [`ScrollConfig`] field with iOS/Android presets
//!
//! 2D scrolling is two independent [`Scroll`] instances.

pub mod config;
pub mod error;
pub mod scroll;
pub mod state;
pub mod velocity;

pub use config::{FlickTiming, ScrollConfig};
pub use error::{ConfigError, Result};
pub use scroll::{Action, Scroll, ScrollCallback, ScrollEndCallback};
pub use state::{scroll_events, ScrollState};
pub use velocity::{Sample, VelocityTracker, HISTORY_CAPACITY};
