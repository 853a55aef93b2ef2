//! Pointer sample history
//!
//! A fixed-capacity ring of recent `(pos, time)` samples. Used to decide
//! whether a release was a flick and to report the current drag velocity.

use std::time::{Duration, Instant};

use inertia_core::millis;

use crate::config::FlickTiming;

/// Samples kept per gesture; older ones are overwritten
pub const HISTORY_CAPACITY: usize = 50;

/// One pointer observation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub pos: f64,
    pub time: Instant,
}

/// Bounded ring buffer of pointer samples
#[derive(Clone, Debug)]
pub struct VelocityTracker {
    samples: Vec<Sample>,
    /// Slot of the oldest sample once the ring is full
    head: usize,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self {
            samples: Vec::with_capacity(HISTORY_CAPACITY),
            head: 0,
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.head = 0;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append a sample, evicting the oldest when full
    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() < HISTORY_CAPACITY {
            self.samples.push(sample);
        } else {
            self.samples[self.head] = sample;
            self.head = (self.head + 1) % HISTORY_CAPACITY;
        }
    }

    /// Samples from newest to oldest
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &Sample> + '_ {
        let len = self.samples.len();
        (0..len).map(move |i| &self.samples[(self.head + len - 1 - i) % len])
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.iter_newest_first().next()
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.iter_newest_first().last()
    }

    /// Oldest sample no more than `window` before `now`
    fn oldest_within(&self, now: Instant, window: Duration) -> Option<&Sample> {
        self.iter_newest_first()
            .take_while(|s| now.saturating_duration_since(s.time) <= window)
            .last()
    }

    /// Pointer velocity in px/s over the samples within `window` of the newest one
    pub fn velocity(&self, window: Duration) -> f64 {
        let Some(newest) = self.newest() else {
            return 0.0;
        };
        let Some(oldest) = self.oldest_within(newest.time, window) else {
            return 0.0;
        };
        let dt = newest.time.saturating_duration_since(oldest.time).as_secs_f64();
        if dt > 0.0 {
            (newest.pos - oldest.pos) / dt
        } else {
            0.0
        }
    }

    /// Whether a release at `release` is a flick
    ///
    /// Fast when the pointer was still moving within the sample window before
    /// release, or when only a few samples arrived but the gesture covered
    /// more than the flick distance.
    pub fn is_fast_flick(
        &self,
        release: Sample,
        gesture_start_pos: f64,
        timing: &FlickTiming,
    ) -> bool {
        let window = millis(timing.sample_window_ms);
        let moving = self
            .oldest_within(release.time, window)
            .is_some_and(|s| (release.pos - s.pos).abs() > 0.0);

        let jumped = self.len() < timing.few_samples
            && (release.pos - gesture_start_pos).abs() > timing.flick_distance;

        tracing::debug!(
            "release classification: samples={} moving={} jumped={}",
            self.len(),
            moving,
            jumped
        );
        moving || jumped
    }
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new()
    }
}
