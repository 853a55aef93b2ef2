//! Single-axis scroll engine with rubber-band edges
//!
//! Follows the pointer while pressed, keeps moving after release with a
//! cosine-shaped momentum decay, and springs back onto the content edge when
//! it overshoots. All animation runs off a [`MsgHandler`] that the host
//! drives by calling [`Scroll::tick`] once per frame.
//!
//! # Example
//!
//! ```rust
//! use inertia_core::{Clock, ManualClock};
//! use inertia_scroll::{Scroll, ScrollConfig, ScrollState};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut scroll = Scroll::with_clock(ScrollConfig::default(), clock.clone())
//!     .with_geometry(100.0, 1000.0);
//!
//! let t0 = clock.now();
//! scroll.on_down(0.0, t0);
//! scroll.on_move(-30.0, t0 + Duration::from_millis(16));
//! assert_eq!(scroll.offset(), 30.0);
//!
//! scroll.on_up(-30.0, t0 + Duration::from_millis(600));
//! while scroll.tick() {
//!     clock.advance(Duration::from_millis(17));
//! }
//! assert_eq!(scroll.state(), ScrollState::Idle);
//! ```
//!
//! Offsets grow as content moves toward its end: dragging the pointer up by
//! 30 scrolls to offset 30. The valid range is `0..=content_len - view_len`.

use std::fmt;
use std::time::Instant;

use inertia_animation::{CosineDecay, ExponentialSettle, MsgHandler};
use inertia_core::{elapsed_ms, event_types, Clock, PointerEvent, StateTransitions, SystemClock};

use crate::config::ScrollConfig;
use crate::state::{scroll_events, ScrollState};
use crate::velocity::{Sample, VelocityTracker};

/// Largest fraction of the elastic ceiling a restarted drag maps back from
const STRETCH_CEILING: f64 = 0.99;

/// Callback fired with the new offset whenever it changes
pub type ScrollCallback = Box<dyn FnMut(f64) + Send>;

/// Callback fired when motion ends; `true` when it came to rest on its own
pub type ScrollEndCallback = Box<dyn FnMut(bool) + Send>;

/// Scheduled work for one scroll axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// One momentum or overshoot frame
    ScrollT,
    /// One settle frame
    ScrollTFix,
}

/// Scroll physics for one axis
pub struct Scroll<C: Clock = SystemClock> {
    config: ScrollConfig,
    view_len: f64,
    content_len: f64,

    // Gesture
    is_down: bool,
    is_move_committed: bool,
    down_pos: f64,
    last_pos: f64,
    gesture_start_pos: f64,
    gesture_start_time: Option<Instant>,
    /// Unstretched offset at press
    prev_scroll_t: f64,
    history: VelocityTracker,

    // Motion
    scroll_t: f64,
    state: ScrollState,
    bounce_limit_t: f64,
    decay: CosineDecay,
    msgs: MsgHandler<Action, C>,

    on_scroll: Option<ScrollCallback>,
    on_scroll_end: Option<ScrollEndCallback>,
}

impl Scroll<SystemClock> {
    /// Create a scroll driven by the wall clock
    pub fn new(config: ScrollConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Scroll<C> {
    /// Create a scroll that reads time from `clock`
    pub fn with_clock(config: ScrollConfig, clock: C) -> Self {
        Self {
            config: config.sanitized(),
            view_len: 0.0,
            content_len: 0.0,
            is_down: false,
            is_move_committed: false,
            down_pos: 0.0,
            last_pos: 0.0,
            gesture_start_pos: 0.0,
            gesture_start_time: None,
            prev_scroll_t: 0.0,
            history: VelocityTracker::new(),
            scroll_t: 0.0,
            state: ScrollState::Idle,
            bounce_limit_t: 0.0,
            decay: CosineDecay::none(),
            msgs: MsgHandler::with_clock(clock),
            on_scroll: None,
            on_scroll_end: None,
        }
    }

    /// Set viewport and content lengths
    pub fn with_geometry(mut self, view_len: f64, content_len: f64) -> Self {
        self.view_len = sanitize_len(view_len);
        self.content_len = sanitize_len(content_len);
        self
    }

    /// Start at `offset` instead of 0 (clamped into range)
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.scroll_t = self.clamp_to_range(offset);
        self
    }

    /// Register the offset callback
    pub fn on_scroll<F>(mut self, callback: F) -> Self
    where
        F: FnMut(f64) + Send + 'static,
    {
        self.on_scroll = Some(Box::new(callback));
        self
    }

    /// Register the motion-finished callback
    pub fn on_scroll_end<F>(mut self, callback: F) -> Self
    where
        F: FnMut(bool) + Send + 'static,
    {
        self.on_scroll_end = Some(Box::new(callback));
        self
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace geometry and the most common tuning knobs
    ///
    /// Must not be called while a gesture is in progress; doing so logs a
    /// warning and the new geometry takes effect from the next sample.
    pub fn configure(
        &mut self,
        view_len: f64,
        content_len: f64,
        use_bounce: bool,
        move_threshold: Option<f64>,
        fps: f64,
    ) {
        self.warn_if_dragging("configure");
        self.view_len = sanitize_len(view_len);
        self.content_len = sanitize_len(content_len);
        self.config = ScrollConfig {
            use_bounce,
            move_threshold,
            fps,
            ..self.config
        }
        .sanitized();
    }

    /// Replace the whole tuning config
    pub fn set_config(&mut self, config: ScrollConfig) {
        self.warn_if_dragging("set_config");
        self.config = config.sanitized();
    }

    pub fn set_view_len(&mut self, view_len: f64) {
        self.warn_if_dragging("set_view_len");
        self.view_len = sanitize_len(view_len);
    }

    pub fn set_content_len(&mut self, content_len: f64) {
        self.warn_if_dragging("set_content_len");
        self.content_len = sanitize_len(content_len);
    }

    fn warn_if_dragging(&self, what: &str) {
        if self.is_down {
            tracing::warn!("{} called during an active gesture", what);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The published offset
    pub fn offset(&self) -> f64 {
        self.scroll_t
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn view_len(&self) -> f64 {
        self.view_len
    }

    pub fn content_len(&self) -> f64 {
        self.content_len
    }

    pub fn is_down(&self) -> bool {
        self.is_down
    }

    /// Whether frames are scheduled or the pointer is down
    pub fn is_animating(&self) -> bool {
        self.state.is_active()
    }

    /// Largest valid offset (0 when content fits the viewport)
    pub fn max_offset(&self) -> f64 {
        (self.content_len - self.view_len).max(0.0)
    }

    pub fn is_overscrolling(&self) -> bool {
        self.overscroll_amount() != 0.0
    }

    /// Distance past the nearest edge: negative before 0, positive past the end
    pub fn overscroll_amount(&self) -> f64 {
        if self.scroll_t < 0.0 {
            self.scroll_t
        } else if self.scroll_t > self.max_offset() {
            self.scroll_t - self.max_offset()
        } else {
            0.0
        }
    }

    /// Current velocity in offset units per second
    pub fn velocity(&self) -> f64 {
        if self.is_down {
            let window = inertia_core::millis(self.config.timing.sample_window_ms);
            -self.history.velocity(window)
        } else if self.state.is_animating() && self.state != ScrollState::SettleFix {
            self.decay.velocity() * self.config.reference_fps
        } else {
            0.0
        }
    }

    /// Pending scheduler messages
    pub fn pending_frames(&self) -> usize {
        self.msgs.len()
    }

    pub fn now(&self) -> Instant {
        self.msgs.now()
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    /// Route a pointer event to the matching handler
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event.event_type {
            event_types::POINTER_DOWN => self.on_down(event.pos, event.timestamp),
            event_types::POINTER_MOVE => self.on_move(event.pos, event.timestamp),
            event_types::POINTER_UP => self.on_up(event.pos, event.timestamp),
            event_types::POINTER_CANCEL => self.on_cancel(event.timestamp),
            other => tracing::trace!("ignoring pointer event type {}", other),
        }
    }

    /// Pointer pressed: start a fresh gesture
    pub fn on_down(&mut self, pos: f64, t: Instant) {
        if !pos.is_finite() {
            return;
        }
        let interrupted = self.state.is_animating();

        self.msgs.clear(None);
        self.decay = CosineDecay::none();
        self.is_down = true;
        self.is_move_committed = self.config.move_threshold.is_none();
        self.down_pos = pos;
        self.last_pos = pos;
        self.gesture_start_pos = pos;
        self.gesture_start_time = Some(t);
        self.prev_scroll_t = self.unstretch(self.scroll_t);
        self.history.clear();
        self.state.apply(event_types::POINTER_DOWN);
        self.msgs.start();

        tracing::debug!("scroll down at {:.1}, offset {:.1}", pos, self.scroll_t);
        if interrupted {
            self.emit_scroll_end(false);
        }
    }

    /// Pointer moved while pressed
    pub fn on_move(&mut self, pos: f64, t: Instant) {
        if !self.is_down || !pos.is_finite() {
            return;
        }
        self.last_pos = pos;

        if !self.is_move_committed {
            let threshold = self.config.move_threshold.unwrap_or(0.0);
            if (pos - self.down_pos).abs() <= threshold {
                return;
            }
            // Drag starts here, without jumping by the dead zone
            self.is_move_committed = true;
            self.down_pos = pos;
            self.gesture_start_pos = pos;
            self.gesture_start_time = Some(t);
            tracing::debug!("drag committed at {:.1}", pos);
            return;
        }

        self.history.push(Sample { pos, time: t });

        let since_start = self
            .gesture_start_time
            .map_or(0.0, |start| elapsed_ms(start, t));
        if since_start > self.config.timing.gesture_window_ms {
            self.gesture_start_pos = pos;
            self.gesture_start_time = Some(t);
        }

        let raw = self.prev_scroll_t - (pos - self.down_pos);
        let next = self.stretch(raw);
        self.publish(next);
    }

    /// Pointer released
    pub fn on_up(&mut self, pos: f64, t: Instant) {
        if !self.is_down {
            return;
        }
        let pos = if pos.is_finite() { pos } else { self.last_pos };
        self.release(pos, t, true);
    }

    /// Pointer stream cancelled: release in place with no momentum
    pub fn on_cancel(&mut self, t: Instant) {
        if !self.is_down {
            return;
        }
        self.release(self.last_pos, t, false);
    }

    fn release(&mut self, pos: f64, t: Instant, allow_momentum: bool) {
        self.is_down = false;
        self.msgs.clear(None);

        // Nothing to scroll: straight back to Idle
        if self.max_offset() <= 0.0 {
            self.publish(0.0);
            self.finish(true);
            return;
        }
        self.state.apply(event_types::POINTER_UP);

        let duration_ms = self
            .gesture_start_time
            .map_or(0.0, |start| elapsed_ms(start, t));
        let timing = self.config.timing;
        let fast = allow_momentum
            && self.is_move_committed
            && duration_ms > 0.0
            && duration_ms < timing.max_gesture_ms
            && self
                .history
                .is_fast_flick(Sample { pos, time: t }, self.gesture_start_pos, &timing);

        self.decay = if fast {
            let velocity = -(pos - self.gesture_start_pos) * self.config.speed_factor;
            CosineDecay::for_gesture(velocity, duration_ms)
        } else {
            CosineDecay::none()
        };

        tracing::debug!(
            "scroll release at {:.1}: fast={} duration={:.0}ms velocity={:.2}",
            pos,
            fast,
            duration_ms,
            self.decay.velocity()
        );

        self.msgs.start();
        self.msgs.schedule(Action::ScrollT, 0.0, 0.0, 0.0);
    }

    // =========================================================================
    // Programmatic control
    // =========================================================================

    /// Jump to `offset` (clamped) without animating
    pub fn set_pos(&mut self, offset: f64) {
        let offset = if offset.is_finite() { offset } else { 0.0 };
        let target = self.clamp_to_range(offset);

        self.msgs.clear(None);
        self.msgs.stop();
        self.is_down = false;
        self.decay = CosineDecay::none();
        self.state.apply(event_types::SCROLL_TO);
        self.scroll_t = target;

        self.emit_scroll(target);
        self.emit_scroll_end(true);
    }

    /// Re-publish the current offset, pulling it back into range if the
    /// geometry shrank while idle
    pub fn refresh(&mut self) {
        if self.state == ScrollState::Idle {
            self.scroll_t = self.clamp_to_range(self.scroll_t);
        }
        self.emit_scroll(self.scroll_t);
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Dispatch due frames. Returns true while the host should keep ticking.
    pub fn tick(&mut self) -> bool {
        for id in self.msgs.due() {
            let Some(msg) = self.msgs.take(id) else {
                continue;
            };
            match msg.action {
                Action::ScrollT => self.step_scroll(),
                Action::ScrollTFix => self.step_fix(),
            }
        }
        self.msgs.should_continue()
    }

    fn schedule_frame(&mut self, action: Action) {
        let interval = self.config.frame_interval_ms();
        self.msgs.schedule(action, interval, 0.0, 0.0);
    }

    fn step_scroll(&mut self) {
        let ratio = self.config.frame_ratio();
        if self.state == ScrollState::BounceOvershoot {
            self.step_overshoot(ratio);
            return;
        }

        let max = self.max_offset();
        let velocity = self.decay.step();
        let next = self.scroll_t + velocity * ratio;
        tracing::trace!(
            "decelerate: offset {:.2} velocity {:.3} phase {:.3}",
            next,
            velocity,
            self.decay.phase()
        );

        let below = next < 0.0;
        if below || next > max {
            if !self.config.use_bounce {
                self.publish(next.clamp(0.0, max));
                self.finish(true);
                return;
            }

            let next = self.cap_overshoot(next);
            self.publish(next);
            self.bounce_limit_t = self.overshoot_limit(next, velocity, below);
            let reached = if below {
                next <= self.bounce_limit_t
            } else {
                next >= self.bounce_limit_t
            };
            if reached {
                self.enter_settle();
            } else {
                self.state.apply(scroll_events::HIT_EDGE);
                tracing::debug!("overshoot toward {:.1}", self.bounce_limit_t);
                self.schedule_frame(Action::ScrollT);
            }
            return;
        }

        self.publish(next);
        if self.decay.is_finished(self.config.rest_velocity) {
            self.finish(true);
        } else {
            self.schedule_frame(Action::ScrollT);
        }
    }

    /// Keep momentum within `max_overshoot` of the range
    ///
    /// An excess already present when momentum set off (a drag released
    /// past the edge) is kept, never pulled in with a jump.
    fn cap_overshoot(&self, next: f64) -> f64 {
        let cap = self.config.max_overshoot;
        let low = (-cap).min(self.scroll_t);
        let high = (self.max_offset() + cap).max(self.scroll_t);
        next.clamp(low, high)
    }

    /// Where an overshoot starting at `next` with `velocity` may run out to
    ///
    /// Never closer to the edge than `next` itself, so motion that is
    /// already at or past its reach settles immediately.
    fn overshoot_limit(&self, next: f64, velocity: f64, below: bool) -> f64 {
        let reach = velocity * self.config.overshoot_reach;
        let cap = self.config.max_overshoot;
        if below {
            reach.max(-cap).min(next)
        } else {
            let max = self.max_offset();
            max + reach.min(cap).max(next - max)
        }
    }

    fn step_overshoot(&mut self, ratio: f64) {
        let limit = self.bounce_limit_t;
        let delta = self.decay.velocity() * ratio;
        let toward_limit = (limit - self.scroll_t) * delta > 0.0;

        let next = if !toward_limit {
            limit
        } else if limit < self.scroll_t {
            (self.scroll_t + delta).max(limit)
        } else {
            (self.scroll_t + delta).min(limit)
        };
        tracing::trace!("overshoot: offset {:.2} limit {:.2}", next, limit);
        self.publish(next);

        if next == limit {
            self.enter_settle();
        } else {
            self.schedule_frame(Action::ScrollT);
        }
    }

    fn enter_settle(&mut self) {
        self.msgs.clear(Some(Action::ScrollT));
        self.msgs.clear(Some(Action::ScrollTFix));
        self.state.apply(scroll_events::REACHED_LIMIT);
        tracing::debug!("settling from {:.1}", self.scroll_t);
        self.schedule_frame(Action::ScrollTFix);
    }

    fn step_fix(&mut self) {
        let edge = self.clamp_to_range(self.scroll_t);
        if edge == self.scroll_t {
            self.finish(true);
            return;
        }

        let settle = ExponentialSettle::new(edge, self.config.bounce_speed);
        let (next, snapped) = settle.step(self.scroll_t, self.config.frame_ratio());
        tracing::trace!("settle: offset {:.2} toward {:.1}", next, edge);
        self.publish(next);

        if snapped {
            self.finish(true);
        } else {
            self.schedule_frame(Action::ScrollTFix);
        }
    }

    /// Stop all motion and report it
    fn finish(&mut self, settled: bool) {
        self.msgs.clear(None);
        self.msgs.stop();
        self.decay = CosineDecay::none();
        self.state.apply(scroll_events::SETTLED);
        tracing::debug!("scroll settled at {:.1}", self.scroll_t);
        self.emit_scroll_end(settled);
    }

    // =========================================================================
    // Elastic edges
    // =========================================================================

    fn clamp_to_range(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_offset())
    }

    /// Map an unresisted offset to the published one
    ///
    /// Inside the range offsets pass through. Past an edge the excess `d`
    /// becomes `e * d * v / (v + d)`: always below `e * d`, and flattening
    /// out toward `e * v` the further the drag goes.
    fn stretch(&self, raw: f64) -> f64 {
        let max = self.max_offset();
        if max <= 0.0 {
            return 0.0;
        }
        if raw < 0.0 {
            -self.damp(-raw)
        } else if raw > max {
            max + self.damp(raw - max)
        } else {
            raw
        }
    }

    fn damp(&self, excess: f64) -> f64 {
        let e = self.config.elasticity;
        let v = self.view_len;
        if v > 0.0 {
            e * excess * v / (v + excess)
        } else {
            e * excess
        }
    }

    /// Inverse of [`Self::stretch`], so a drag that starts mid-overshoot
    /// continues from where the content is shown
    fn unstretch(&self, shown: f64) -> f64 {
        let max = self.max_offset();
        if shown < 0.0 {
            -self.undamp(-shown)
        } else if shown > max {
            max + self.undamp(shown - max)
        } else {
            shown
        }
    }

    fn undamp(&self, shown: f64) -> f64 {
        let e = self.config.elasticity;
        let v = self.view_len;
        if v > 0.0 {
            let shown = shown.min(e * v * STRETCH_CEILING);
            shown * v / (e * v - shown)
        } else {
            shown / e
        }
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Set the offset and notify if it changed
    fn publish(&mut self, offset: f64) {
        if offset != self.scroll_t {
            self.scroll_t = offset;
            self.emit_scroll(offset);
        }
    }

    fn emit_scroll(&mut self, offset: f64) {
        if let Some(callback) = self.on_scroll.as_mut() {
            callback(offset);
        }
    }

    fn emit_scroll_end(&mut self, settled: bool) {
        if let Some(callback) = self.on_scroll_end.as_mut() {
            callback(settled);
        }
    }
}

impl<C: Clock> fmt::Debug for Scroll<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scroll")
            .field("offset", &self.scroll_t)
            .field("state", &self.state)
            .field("view_len", &self.view_len)
            .field("content_len", &self.content_len)
            .field("is_down", &self.is_down)
            .field("pending_frames", &self.msgs.len())
            .finish()
    }
}

/// NaN and negative lengths count as 0
fn sanitize_len(len: f64) -> f64 {
    if len.is_finite() && len > 0.0 {
        len
    } else {
        0.0
    }
}
