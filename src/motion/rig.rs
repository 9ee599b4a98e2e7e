//! Capture worker: runs the sample → extract loop off the render thread.
//!
//! The rig owns a video source, an optional pose feed, and one strategy.
//! Its worker thread polls them at frame cadence and publishes the most
//! recent result into shared state. There is exactly one writer (the
//! worker) and one reader (the render loop); reading last tick's result
//! during this tick's render is acceptable, so a mutex around the small
//! state struct is all the coordination needed.
//!
//! Stopping is cooperative: `stop` flips a flag that both sides check. An
//! extraction already in flight when the flag flips may still complete,
//! but readers consult the flag first and discard such results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;
use thiserror::Error;

use crate::motion::extractor::{CaptureSample, StrategyKind};
use crate::motion::frame::VideoSource;
use crate::motion::landmarks::PoseFeed;
use crate::motion::{MotionSignal, SwipeDirection};

/// Worker poll cadence, matching the nominal display tick.
const CAPTURE_TICK: Duration = Duration::from_millis(16);

/// Failures acquiring a capture path at startup. None of these are fatal:
/// the caller logs, tells the user, and continues on keyboard input.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no camera device backend is available in this build")]
    SourceUnavailable,
}

struct SharedState {
    signal: MotionSignal,
    /// Latest unconsumed swipe event. Held until a reader takes it so an
    /// event cannot fall between two render ticks.
    swipe: Option<SwipeDirection>,
    spread: bool,
}

impl SharedState {
    fn new() -> Self {
        Self {
            signal: MotionSignal::absent(),
            swipe: None,
            spread: false,
        }
    }
}

/// Handle to the running capture worker.
pub struct CaptureRig {
    shared: Arc<Mutex<SharedState>>,
    stopped: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl CaptureRig {
    /// Start a worker over the given source/feed with the given strategy.
    pub fn spawn(
        mut source: Box<dyn VideoSource + Send>,
        mut poses: Option<Box<dyn PoseFeed + Send>>,
        kind: StrategyKind,
    ) -> Self {
        let shared = Arc::new(Mutex::new(SharedState::new()));
        let stopped = Arc::new(AtomicBool::new(false));

        let worker_shared = Arc::clone(&shared);
        let worker_stopped = Arc::clone(&stopped);
        let worker = thread::spawn(move || {
            let mut strategy = kind.build();
            debug!("capture worker started ({kind:?})");
            while !worker_stopped.load(Ordering::Relaxed) {
                let frame = source.poll_frame();
                let pose = poses.as_mut().and_then(|feed| feed.latest_pose());
                let tick = strategy.produce(CaptureSample {
                    frame: frame.as_ref(),
                    pose: pose.as_ref(),
                });
                // Re-check after the (possibly slow) extraction so a result
                // that raced a stop request is dropped, not published.
                if worker_stopped.load(Ordering::Relaxed) {
                    break;
                }
                if let Ok(mut state) = worker_shared.lock() {
                    state.signal = tick.signal;
                    state.swipe = tick.swipe.or(state.swipe);
                    state.spread = state.spread || tick.spread;
                }
                thread::sleep(CAPTURE_TICK);
            }
            debug!("capture worker stopped");
        });

        Self {
            shared,
            stopped,
            worker: Some(worker),
        }
    }

    /// Most recent signal, or absent once the rig is stopped.
    pub fn latest_signal(&self) -> MotionSignal {
        if self.stopped.load(Ordering::Relaxed) {
            return MotionSignal::absent();
        }
        self.shared
            .lock()
            .map(|state| state.signal)
            .unwrap_or_else(|_| MotionSignal::absent())
    }

    /// Take and clear any pending swipe/spread events. Stopped rigs report
    /// nothing even if the worker wrote after the flag flipped.
    pub fn take_events(&self) -> (Option<SwipeDirection>, bool) {
        if self.stopped.load(Ordering::Relaxed) {
            return (None, false);
        }
        match self.shared.lock() {
            Ok(mut state) => {
                let swipe = state.swipe.take();
                let spread = state.spread;
                state.spread = false;
                (swipe, spread)
            }
            Err(_) => (None, false),
        }
    }

    /// Request shutdown and wait for the worker to exit.
    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for CaptureRig {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Open the default camera capture path.
///
/// Device backends plug in here by constructing a [`CaptureRig`] over their
/// [`VideoSource`]/[`PoseFeed`]. This build ships none, which is the same
/// situation as a denied camera permission: the caller must carry on with
/// keyboard input and never block waiting for a signal.
pub fn open_default() -> Result<CaptureRig, CaptureError> {
    Err(CaptureError::SourceUnavailable)
}
