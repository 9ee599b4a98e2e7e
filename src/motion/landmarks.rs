//! Pose landmark data delivered by an external estimation model.
//!
//! The model hands back a fixed-size ordered set of 33 landmarks in
//! normalized [0, 1] frame coordinates. Only a handful of indices matter
//! here; the convention follows the common full-body pose layout.

pub const LANDMARK_COUNT: usize = 33;

pub const NOSE: usize = 0;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;

/// Wrist separation (fraction of frame width) that counts as arms spread.
pub const SPREAD_THRESHOLD: f32 = 0.65;

/// A single landmark in normalized frame coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Model-reported visibility score in [0, 1].
    pub visibility: f32,
}

/// One detected pose: the full landmark set for a single tick.
#[derive(Clone, Debug)]
pub struct PoseFrame {
    pub points: [Landmark; LANDMARK_COUNT],
}

impl PoseFrame {
    /// A pose with every landmark at a given position, for tests.
    pub fn uniform(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            points: [Landmark { x, y, visibility }; LANDMARK_COUNT],
        }
    }

    pub fn nose(&self) -> Landmark {
        self.points[NOSE]
    }

    /// True when the wrists are far enough apart horizontally to read as a
    /// deliberate arms-spread gesture.
    pub fn arms_spread(&self) -> bool {
        let lw = self.points[LEFT_WRIST];
        let rw = self.points[RIGHT_WRIST];
        (lw.x - rw.x).abs() > SPREAD_THRESHOLD
    }
}

/// Asynchronous pose supplier. The estimation model runs outside the render
/// path and publishes its most recent result; `latest_pose` never blocks
/// and returns the last completed detection, which may be a tick stale.
pub trait PoseFeed {
    fn latest_pose(&mut self) -> Option<PoseFrame>;
}

/// Replays a fixed pose sequence for deterministic tests. Once the script
/// runs out, the final entry keeps being reported, matching the "most
/// recent completed detection" contract.
#[cfg(test)]
pub struct ScriptedPoses {
    poses: std::collections::VecDeque<Option<PoseFrame>>,
    current: Option<PoseFrame>,
}

#[cfg(test)]
impl ScriptedPoses {
    pub fn new(poses: Vec<Option<PoseFrame>>) -> Self {
        Self {
            poses: poses.into(),
            current: None,
        }
    }
}

#[cfg(test)]
impl PoseFeed for ScriptedPoses {
    fn latest_pose(&mut self) -> Option<PoseFrame> {
        if let Some(next) = self.poses.pop_front() {
            self.current = next;
        }
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arms_spread_triggers_past_threshold() {
        let mut pose = PoseFrame::uniform(0.5, 0.5, 1.0);
        pose.points[LEFT_WRIST].x = 0.9;
        pose.points[RIGHT_WRIST].x = 0.1;
        assert!(pose.arms_spread());

        pose.points[LEFT_WRIST].x = 0.7;
        pose.points[RIGHT_WRIST].x = 0.3;
        assert!(!pose.arms_spread());
    }

    #[test]
    fn spread_is_symmetric_in_wrist_order() {
        let mut pose = PoseFrame::uniform(0.5, 0.5, 1.0);
        pose.points[LEFT_WRIST].x = 0.05;
        pose.points[RIGHT_WRIST].x = 0.95;
        assert!(pose.arms_spread());
    }
}
