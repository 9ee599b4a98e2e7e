//! Temporal filtering of the extracted signal.
//!
//! The steering axis runs through a single-pole exponential moving average
//! whose rate comes from the active game's input profile. A raw value
//! inside the dead zone is treated as "no intentional input": instead of
//! averaging toward it, the filter pulls the smoothed value straight back
//! to center at its own fixed rate, so jitter near zero self-cancels
//! rather than drifting. Throttle gets the same EMA treatment at a fixed
//! rate so continuous effects ramp instead of snapping on and off.

/// Raw magnitude below which input counts as unintentional.
pub const DEAD_ZONE: f32 = 0.05;
/// Rate of the snap-back-to-center pull, independent of the primary alpha.
const SNAP_RATE: f32 = 0.1;
/// Fixed EMA rate for the throttle axis.
const THROTTLE_RATE: f32 = 0.1;

/// Minimum spacing between stride samples, in milliseconds.
const STRIDE_SAMPLE_MS: f64 = 60.0;
/// Vertical displacement below this contributes no effort.
const STRIDE_NOISE_FLOOR: f32 = 0.03;
/// Displacement-to-effort gain before the ease-out curve.
const STRIDE_GAIN: f32 = 5.0;

/// Persistent smoothed state, updated in place each tick.
pub struct SignalSmoother {
    alpha: f32,
    steer: f32,
    throttle: f32,
}

impl SignalSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            steer: 0.0,
            throttle: 0.0,
        }
    }

    /// Swap in a different primary rate (on game/mode change). Smoothed
    /// state carries over so the handoff does not jump.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    /// Feed one raw steering value, returning the updated smoothed value.
    pub fn update(&mut self, raw: f32) -> f32 {
        if raw.abs() < DEAD_ZONE {
            self.steer += (0.0 - self.steer) * SNAP_RATE;
        } else {
            self.steer += (raw - self.steer) * self.alpha;
        }
        self.steer
    }

    /// Feed one raw throttle value in [0, 1].
    pub fn update_throttle(&mut self, raw: f32) -> f32 {
        self.throttle += (raw.clamp(0.0, 1.0) - self.throttle) * THROTTLE_RATE;
        self.throttle
    }

    pub fn steer(&self) -> f32 {
        self.steer
    }

    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    pub fn reset(&mut self) {
        self.steer = 0.0;
        self.throttle = 0.0;
    }
}

/// Derives raw throttle from vertical landmark motion for the run mode.
///
/// Samples the tracked landmark's vertical coordinate at least 60 ms
/// apart. Small displacement (idle sway) contributes nothing; larger
/// periodic displacement maps to effort in [0, 1] through an ease-out
/// curve, so running in place ramps the throttle toward full.
pub struct StrideMeter {
    last_sample: Option<(f64, f32)>,
    effort: f32,
}

impl StrideMeter {
    pub fn new() -> Self {
        Self {
            last_sample: None,
            effort: 0.0,
        }
    }

    /// Observe the landmark's vertical coordinate at `now_ms`. Returns the
    /// current raw effort; between samples the previous effort is held.
    pub fn observe(&mut self, now_ms: f64, y: f32) -> f32 {
        match self.last_sample {
            None => {
                self.last_sample = Some((now_ms, y));
            }
            Some((t0, y0)) if now_ms - t0 >= STRIDE_SAMPLE_MS => {
                let delta = (y - y0).abs();
                self.effort = if delta < STRIDE_NOISE_FLOOR {
                    0.0
                } else {
                    let effort = (delta * STRIDE_GAIN).min(1.0);
                    1.0 - (1.0 - effort) * (1.0 - effort)
                };
                self.last_sample = Some((now_ms, y));
            }
            Some(_) => {}
        }
        self.effort
    }

    pub fn reset(&mut self) {
        self.last_sample = None;
        self.effort = 0.0;
    }
}

impl Default for StrideMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::InputProfile;

    #[test]
    fn ema_step_is_bounded_by_alpha() {
        for profile in [InputProfile::STEER, InputProfile::RUN, InputProfile::ZEN] {
            let mut smoother = SignalSmoother::new(profile.alpha);
            let mut prev = smoother.steer();
            for raw in [1.0, 1.5, -0.8, 0.4, 1.2_f32] {
                let next = smoother.update(raw);
                let step = (next - prev).abs();
                let bound = profile.alpha * (raw - prev).abs();
                assert!(
                    step <= bound + 1e-6,
                    "step {step} exceeds alpha bound {bound}"
                );
                prev = next;
            }
        }
    }

    #[test]
    fn ema_converges_to_constant_input() {
        let mut smoother = SignalSmoother::new(0.18);
        let mut value = 0.0;
        // O(1/alpha) ticks: with alpha 0.18, 60 ticks leaves well under 1%.
        for _ in 0..60 {
            value = smoother.update(1.0);
        }
        assert!((value - 1.0).abs() < 0.01, "converged to {value}");
    }

    #[test]
    fn dead_zone_snaps_back_monotonically() {
        let mut smoother = SignalSmoother::new(0.18);
        // Build up a nonzero smoothed value first.
        for _ in 0..20 {
            smoother.update(1.0);
        }
        let mut prev = smoother.steer().abs();
        assert!(prev > DEAD_ZONE);
        for _ in 0..80 {
            let next = smoother.update(0.0).abs();
            assert!(next < prev, "magnitude must strictly decrease");
            prev = next;
        }
        assert!(prev < DEAD_ZONE);
    }

    #[test]
    fn dead_zone_ignores_small_nonzero_jitter() {
        let mut smoother = SignalSmoother::new(0.18);
        for _ in 0..20 {
            smoother.update(1.0);
        }
        // Raw jitter inside the dead zone decays toward zero, not toward
        // the jitter value.
        for _ in 0..300 {
            smoother.update(0.04);
        }
        assert!(smoother.steer().abs() < 0.001);
    }

    #[test]
    fn throttle_ramps_instead_of_snapping() {
        let mut smoother = SignalSmoother::new(0.18);
        let first = smoother.update_throttle(1.0);
        assert!((first - 0.1).abs() < 1e-6);
        let mut value = first;
        for _ in 0..80 {
            value = smoother.update_throttle(1.0);
        }
        assert!(value > 0.99);
    }

    #[test]
    fn stride_below_noise_floor_yields_zero() {
        let mut meter = StrideMeter::new();
        meter.observe(0.0, 0.50);
        let effort = meter.observe(70.0, 0.52);
        assert_eq!(effort, 0.0);
    }

    #[test]
    fn stride_large_delta_saturates_at_full_effort() {
        let mut meter = StrideMeter::new();
        meter.observe(0.0, 0.3);
        // delta 0.2 -> effort min(1, 1.0) = 1, curved 1 - (1-1)^2 = 1.
        let effort = meter.observe(70.0, 0.5);
        assert_eq!(effort, 1.0);
    }

    #[test]
    fn stride_mid_delta_is_eased_out() {
        let mut meter = StrideMeter::new();
        meter.observe(0.0, 0.50);
        // delta 0.1 -> effort 0.5, curved 1 - 0.25 = 0.75.
        let effort = meter.observe(70.0, 0.60);
        assert!((effort - 0.75).abs() < 1e-6);
    }

    #[test]
    fn stride_ignores_samples_closer_than_spacing() {
        let mut meter = StrideMeter::new();
        meter.observe(0.0, 0.3);
        // Big jump, but only 30 ms later: not a valid sample pair yet.
        let effort = meter.observe(30.0, 0.7);
        assert_eq!(effort, 0.0);
        // At 60 ms the pair is valid, measured against the first sample.
        let effort = meter.observe(60.0, 0.7);
        assert_eq!(effort, 1.0);
    }
}
