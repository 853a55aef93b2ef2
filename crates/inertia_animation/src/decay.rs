//! Decay curves for momentum and edge settling

use std::f64::consts::FRAC_PI_2;

/// Upper bound on the number of frames a decay can be stretched over
pub const MAX_DECAY_FRAMES: f64 = 600.0;

/// Gesture duration scale: a gesture of `d` ms decays over `DECAY_SCALE_MS / d` frames
pub const DECAY_SCALE_MS: f64 = 30_000.0;

/// Excess below which a settle snaps onto its target
pub const SNAP_DISTANCE: f64 = 1.0;

/// Velocity that decays along a quarter cosine
///
/// Every step multiplies the velocity by `cos(phase)` and advances the phase
/// toward π/2, where the velocity is zero. A smaller phase step keeps the
/// velocity alive for more frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CosineDecay {
    velocity: f64,
    phase: f64,
    phase_step: f64,
}

impl CosineDecay {
    /// A decay with an explicit phase step
    pub fn new(velocity: f64, phase_step: f64) -> Self {
        let phase_step = if phase_step.is_finite() && phase_step > 0.0 {
            phase_step.min(FRAC_PI_2)
        } else {
            FRAC_PI_2
        };
        Self {
            velocity: if velocity.is_finite() { velocity } else { 0.0 },
            phase: 0.0,
            phase_step,
        }
    }

    /// A decay that carries no momentum and finishes on its first step
    pub fn none() -> Self {
        Self::new(0.0, FRAC_PI_2)
    }

    /// A decay sized from the duration of the gesture that produced it
    ///
    /// Shorter gestures get a finer step and so travel further.
    pub fn for_gesture(velocity: f64, gesture_ms: f64) -> Self {
        if !(gesture_ms.is_finite() && gesture_ms > 0.0) {
            return Self::none();
        }
        let frames = MAX_DECAY_FRAMES.min(DECAY_SCALE_MS / gesture_ms);
        Self::new(velocity, FRAC_PI_2 / frames)
    }

    /// Advance one frame and return the velocity to apply for it
    pub fn step(&mut self) -> f64 {
        self.velocity *= self.phase.cos();
        self.phase = (self.phase + self.phase_step).min(FRAC_PI_2);
        self.velocity
    }

    /// True once the phase reached π/2 or the velocity fell below `rest_velocity`
    pub fn is_finished(&self, rest_velocity: f64) -> bool {
        self.phase >= FRAC_PI_2 || self.velocity.abs() < rest_velocity
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn phase_step(&self) -> f64 {
        self.phase_step
    }
}

impl Default for CosineDecay {
    fn default() -> Self {
        Self::none()
    }
}

/// Geometric shrink of the distance to a target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExponentialSettle {
    target: f64,
    factor: f64,
}

impl ExponentialSettle {
    /// `factor` must be greater than 1; anything else falls back to 1.15
    pub fn new(target: f64, factor: f64) -> Self {
        let factor = if factor.is_finite() && factor > 1.0 {
            factor
        } else {
            1.15
        };
        Self { target, factor }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Divide the excess of `value` over the target by `factor^frame_ratio`
    ///
    /// Returns the new value and whether it snapped onto the target.
    pub fn step(&self, value: f64, frame_ratio: f64) -> (f64, bool) {
        let excess = (value - self.target) / self.factor.powf(frame_ratio.max(0.0));
        if !excess.is_finite() || excess.abs() < SNAP_DISTANCE {
            (self.target, true)
        } else {
            (self.target + excess, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_finishes_after_one_step() {
        let mut decay = CosineDecay::none();
        assert_eq!(decay.step(), 0.0);
        assert!(decay.is_finished(0.0));
    }

    #[test]
    fn test_first_step_keeps_full_velocity() {
        let mut decay = CosineDecay::new(10.0, 0.1);
        assert_eq!(decay.step(), 10.0);
        assert!(decay.step() < 10.0);
    }

    #[test]
    fn test_velocity_decays_monotonically_to_zero() {
        let mut decay = CosineDecay::for_gesture(-6.0, 100.0);
        let mut last = decay.step().abs();
        let mut frames = 1;
        while !decay.is_finished(0.0) {
            let v = decay.step().abs();
            assert!(v <= last);
            last = v;
            frames += 1;
        }
        assert!(frames <= 301);
        assert!(last < 1e-9);
    }

    #[test]
    fn test_shorter_gesture_gets_finer_step() {
        let quick = CosineDecay::for_gesture(5.0, 80.0);
        let slow = CosineDecay::for_gesture(5.0, 400.0);
        assert!(quick.phase_step() < slow.phase_step());

        // Capped at MAX_DECAY_FRAMES for very quick gestures
        let instant = CosineDecay::for_gesture(5.0, 1.0);
        assert!((instant.phase_step() - FRAC_PI_2 / MAX_DECAY_FRAMES).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_gesture_has_no_momentum() {
        assert_eq!(CosineDecay::for_gesture(12.0, 0.0), CosineDecay::none());
        assert_eq!(CosineDecay::for_gesture(12.0, f64::NAN), CosineDecay::none());
    }

    #[test]
    fn test_settle_shrinks_then_snaps() {
        let settle = ExponentialSettle::new(0.0, 1.15);
        let mut value = -40.0;
        let mut frames = 0;
        loop {
            let (next, snapped) = settle.step(value, 1.0);
            frames += 1;
            if snapped {
                assert_eq!(next, 0.0);
                break;
            }
            assert!(next.abs() < value.abs());
            assert!(next < 0.0);
            value = next;
        }
        // 40 / 1.15^n < 1 after 27 frames
        assert_eq!(frames, 27);
    }

    #[test]
    fn test_settle_rejects_non_growing_factor() {
        let settle = ExponentialSettle::new(10.0, 0.5);
        let (next, _) = settle.step(30.0, 1.0);
        assert!(next < 30.0);
    }
}
