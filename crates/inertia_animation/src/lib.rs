//! Inertia Animation System
//!
//! Frame-driven scheduling and the decay curves used by momentum scrolling.
//!
//! # Features
//!
//! - **Message Scheduler**: Delayed, cancelable messages dispatched from a host tick
//! - **Cosine Decay**: Velocity that eases to zero along a quarter cosine
//! - **Exponential Settle**: Excess offsets that shrink geometrically onto a target

pub mod decay;
pub mod scheduler;

pub use decay::{CosineDecay, ExponentialSettle};
pub use scheduler::{Msg, MsgHandler, MsgId};
