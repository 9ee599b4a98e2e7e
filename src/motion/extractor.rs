//! Signal extraction: one frame (or pose) in, one [`MotionSignal`] out.
//!
//! Two interchangeable strategies sit behind [`SignalStrategy`]. The
//! centroid tracker works on raw pixels and emits discrete swipe events;
//! the pose tracker reads landmark coordinates from an external model and
//! emits a continuous steering value. Which one runs is a startup choice
//! ([`StrategyKind`]), never a runtime probe for whichever backend happens
//! to be loaded.

use crate::motion::frame::Frame;
use crate::motion::landmarks::PoseFrame;
use crate::motion::{MotionSignal, SwipeDirection, STEER_RANGE};

/// Sample every Nth pixel of the RGBA buffer rather than all of them.
const SAMPLE_STRIDE: usize = 80;
/// R+G+B sum above which a sampled pixel counts as "bright".
const BRIGHT_THRESHOLD: u32 = 500;
/// Bright-sample count that must be exceeded for a centroid to be valid.
const MIN_BRIGHT_SAMPLES: usize = 30;
/// Horizontal centroid delta (pixels) that reads as a deliberate swipe.
const SWIPE_DELTA_PX: f32 = 20.0;

/// Inputs available to a strategy on one capture tick. Either half may be
/// missing; a strategy uses what it understands and ignores the rest.
#[derive(Clone, Copy)]
pub struct CaptureSample<'a> {
    pub frame: Option<&'a Frame>,
    pub pose: Option<&'a PoseFrame>,
}

/// Per-tick strategy output.
#[derive(Clone, Copy, Debug)]
pub struct StrategyTick {
    pub signal: MotionSignal,
    pub swipe: Option<SwipeDirection>,
    pub spread: bool,
}

impl StrategyTick {
    fn quiet() -> Self {
        Self {
            signal: MotionSignal::absent(),
            swipe: None,
            spread: false,
        }
    }
}

/// A motion-extraction strategy: produce a signal from whatever the capture
/// loop sampled this tick.
pub trait SignalStrategy {
    fn produce(&mut self, sample: CaptureSample<'_>) -> StrategyTick;
}

/// Which strategy the pipeline runs, decided once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    /// Brightness-centroid delta tracking over raw pixels.
    Centroid,
    /// Landmark readout from an external pose-estimation model.
    Pose,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn SignalStrategy + Send> {
        match self {
            Self::Centroid => Box::new(CentroidTracker::new()),
            Self::Pose => Box::new(PoseTracker),
        }
    }
}

/// Horizontal centroid of bright samples, if enough of them exist.
///
/// Subsamples at a fixed stride for speed. A hand or face under typical
/// lighting against a darker background clears the brightness threshold;
/// too few bright samples means the tick has no usable signal-to-noise and
/// yields nothing.
pub fn bright_centroid(frame: &Frame) -> Option<f32> {
    let mut sum = 0usize;
    let mut count = 0usize;
    let mut idx = 0;
    while idx < frame.pixel_count() {
        if frame.brightness(idx) > BRIGHT_THRESHOLD {
            sum += frame.x_of(idx);
            count += 1;
        }
        idx += SAMPLE_STRIDE;
    }
    if count > MIN_BRIGHT_SAMPLES {
        Some(sum as f32 / count as f32)
    } else {
        None
    }
}

/// Strategy A: track the bright-region centroid across consecutive frames
/// and emit a swipe event when it jumps far enough sideways.
pub struct CentroidTracker {
    prev_centroid: Option<f32>,
}

impl CentroidTracker {
    pub fn new() -> Self {
        Self {
            prev_centroid: None,
        }
    }

    /// Feed one centroid observation; returns the swipe it completes, if
    /// any. Exposed separately so round logic can be driven directly.
    pub fn observe(&mut self, centroid: f32) -> Option<SwipeDirection> {
        let swipe = self.prev_centroid.and_then(|prev| {
            let delta = centroid - prev;
            if delta > SWIPE_DELTA_PX {
                Some(SwipeDirection::Right)
            } else if delta < -SWIPE_DELTA_PX {
                Some(SwipeDirection::Left)
            } else {
                None
            }
        });
        self.prev_centroid = Some(centroid);
        swipe
    }
}

impl Default for CentroidTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalStrategy for CentroidTracker {
    fn produce(&mut self, sample: CaptureSample<'_>) -> StrategyTick {
        let Some(frame) = sample.frame else {
            return StrategyTick::quiet();
        };
        let Some(centroid) = bright_centroid(frame) else {
            // Insufficient signal-to-noise: no update this tick. The
            // previous centroid stays put for the next comparison.
            return StrategyTick::quiet();
        };
        let swipe = self.observe(centroid);
        let signal = MotionSignal {
            x: (0.5 - centroid / frame.width as f32) * STEER_RANGE * 2.0,
            y: 0.0,
            presence: true,
            confidence: 1.0,
        };
        StrategyTick {
            signal,
            swipe,
            spread: false,
        }
    }
}

/// Strategy B: read normalized landmarks from the pose model. Steering is
/// the mirrored, scaled nose offset from frame center; the vertical nose
/// coordinate rides along for the stride meter.
pub struct PoseTracker;

impl SignalStrategy for PoseTracker {
    fn produce(&mut self, sample: CaptureSample<'_>) -> StrategyTick {
        let Some(pose) = sample.pose else {
            return StrategyTick::quiet();
        };
        let nose = pose.nose();
        let signal = MotionSignal {
            x: (0.5 - nose.x) * STEER_RANGE * 2.0,
            y: nose.y,
            presence: true,
            confidence: nose.visibility.clamp(0.0, 1.0),
        };
        StrategyTick {
            signal,
            swipe: None,
            spread: pose.arms_spread(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::landmarks::{LEFT_WRIST, RIGHT_WRIST};

    fn set_bright(frame: &mut Frame, idx: usize) {
        let base = idx * 4;
        frame.data[base..base + 4].copy_from_slice(&[200, 200, 200, 255]);
    }

    /// With width 100 and stride 80, sampled pixel indices 80·(5j+3) all
    /// land at x = 40. Painting `n` of them bright gives `n` bright
    /// samples sharing one x-coordinate.
    fn frame_with_bright_samples_at_x40(n: usize) -> Frame {
        let mut frame = Frame::blank(100, 170);
        for j in 0..n {
            set_bright(&mut frame, 80 * (5 * j + 3));
        }
        frame
    }

    #[test]
    fn centroid_is_exact_for_forty_bright_samples_at_one_x() {
        let frame = frame_with_bright_samples_at_x40(40);
        assert_eq!(bright_centroid(&frame), Some(40.0));
    }

    #[test]
    fn too_few_bright_samples_yield_no_centroid() {
        let frame = frame_with_bright_samples_at_x40(29);
        assert!(bright_centroid(&frame).is_none());
    }

    #[test]
    fn dark_frame_yields_no_centroid() {
        assert!(bright_centroid(&Frame::blank(100, 170)).is_none());
    }

    #[test]
    fn swipe_right_on_positive_delta_past_threshold() {
        let mut tracker = CentroidTracker::new();
        assert_eq!(tracker.observe(100.0), None);
        assert_eq!(tracker.observe(100.0), None);
        assert_eq!(tracker.observe(125.0), Some(SwipeDirection::Right));
    }

    #[test]
    fn swipe_left_on_negative_delta_past_threshold() {
        let mut tracker = CentroidTracker::new();
        assert_eq!(tracker.observe(100.0), None);
        assert_eq!(tracker.observe(100.0), None);
        assert_eq!(tracker.observe(75.0), Some(SwipeDirection::Left));
    }

    #[test]
    fn small_oscillation_emits_nothing() {
        let mut tracker = CentroidTracker::new();
        assert_eq!(tracker.observe(100.0), None);
        assert_eq!(tracker.observe(105.0), None);
        assert_eq!(tracker.observe(100.0), None);
    }

    #[test]
    fn exact_threshold_delta_is_not_a_swipe() {
        let mut tracker = CentroidTracker::new();
        tracker.observe(100.0);
        assert_eq!(tracker.observe(120.0), None);
    }

    #[test]
    fn pose_steering_is_mirrored_and_scaled() {
        let mut tracker = PoseTracker;
        let pose = PoseFrame::uniform(0.5, 0.4, 0.9);
        let tick = tracker.produce(CaptureSample {
            frame: None,
            pose: Some(&pose),
        });
        assert!(tick.signal.presence);
        assert_eq!(tick.signal.x, 0.0);
        assert_eq!(tick.signal.y, 0.4);

        let pose = PoseFrame::uniform(0.0, 0.4, 0.9);
        let tick = tracker.produce(CaptureSample {
            frame: None,
            pose: Some(&pose),
        });
        assert_eq!(tick.signal.x, STEER_RANGE);
    }

    #[test]
    fn pose_confidence_is_clamped() {
        let mut tracker = PoseTracker;
        let pose = PoseFrame::uniform(0.5, 0.5, 3.0);
        let tick = tracker.produce(CaptureSample {
            frame: None,
            pose: Some(&pose),
        });
        assert_eq!(tick.signal.confidence, 1.0);
    }

    #[test]
    fn pose_tracker_reports_spread_gesture() {
        let mut tracker = PoseTracker;
        let mut pose = PoseFrame::uniform(0.5, 0.5, 1.0);
        pose.points[LEFT_WRIST].x = 0.95;
        pose.points[RIGHT_WRIST].x = 0.05;
        let tick = tracker.produce(CaptureSample {
            frame: None,
            pose: Some(&pose),
        });
        assert!(tick.spread);
    }

    #[test]
    fn missing_input_means_absent_signal() {
        let mut centroid = CentroidTracker::new();
        let tick = centroid.produce(CaptureSample {
            frame: None,
            pose: None,
        });
        assert!(!tick.signal.presence);

        let mut pose = PoseTracker;
        let tick = pose.produce(CaptureSample {
            frame: None,
            pose: None,
        });
        assert!(!tick.signal.presence);
        assert_eq!(tick.signal.confidence, 0.0);
    }
}
