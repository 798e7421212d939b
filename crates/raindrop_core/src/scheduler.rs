//! Frame scheduling
//!
//! The orchestrator never talks to a display loop directly. It asks a
//! [`FrameScheduler`] for "call me on the next frame" and gets back a
//! [`FrameHandle`] it can cancel. Two implementations live here:
//!
//! - [`ManualScheduler`] fires frames on fixed interval boundaries when time
//!   is advanced explicitly. Used by tests and headless runs.
//! - [`HostScheduler`] queues callbacks until the host loop (e.g. a winit
//!   `RedrawRequested` event) calls [`HostScheduler::run_frame`].

use std::cell::{Cell, RefCell};
use std::time::Duration;

/// Callback run when a scheduled frame fires; receives the frame timestamp
pub type FrameCallback = Box<dyn FnOnce(Duration)>;

/// Opaque token identifying one scheduled frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

/// Per-frame deferred callback primitive
///
/// `request_frame` must not invoke the callback before returning.
pub trait FrameScheduler {
    /// Run `callback` once on a future frame
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Drop a scheduled callback; unknown or fired handles are ignored
    fn cancel_frame(&self, handle: FrameHandle);
}

// ==================== ManualScheduler ====================

struct ScheduledFrame {
    handle: FrameHandle,
    due: Duration,
    callback: FrameCallback,
}

struct ManualState {
    now: Duration,
    next_id: u64,
    pending: Vec<ScheduledFrame>,
    requested: Vec<FrameHandle>,
    cancelled: Vec<FrameHandle>,
}

/// Deterministic scheduler driven by [`advance`](Self::advance)
///
/// A requested frame is due at the next multiple of the frame interval after
/// the current time. Request and cancel calls are recorded.
pub struct ManualScheduler {
    interval: Duration,
    state: RefCell<ManualState>,
}

impl ManualScheduler {
    /// Default frame interval (~60 Hz)
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(16);

    pub fn new() -> Self {
        Self::with_interval(Self::DEFAULT_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        assert!(!interval.is_zero(), "frame interval must be non-zero");
        Self {
            interval,
            state: RefCell::new(ManualState {
                now: Duration::ZERO,
                next_id: 1,
                pending: Vec::new(),
                requested: Vec::new(),
                cancelled: Vec::new(),
            }),
        }
    }

    /// Current scheduler time
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Move time forward, firing every frame that falls due
    ///
    /// Frames requested by callbacks during the advance fire too if they
    /// fall due before the target time. Returns the number of callbacks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.borrow().now + by;
        let mut fired = 0;

        loop {
            let due = self
                .state
                .borrow()
                .pending
                .iter()
                .map(|frame| frame.due)
                .filter(|due| *due <= target)
                .min();
            let Some(due) = due else { break };

            let batch: Vec<ScheduledFrame> = {
                let mut state = self.state.borrow_mut();
                state.now = due;
                let (ready, waiting) = std::mem::take(&mut state.pending)
                    .into_iter()
                    .partition(|frame| frame.due == due);
                state.pending = waiting;
                ready
            };

            // Callbacks run with no borrow held so they can reschedule
            for frame in batch {
                (frame.callback)(due);
                fired += 1;
            }
        }

        self.state.borrow_mut().now = target;
        fired
    }

    /// Advance by `count` frame intervals
    pub fn advance_frames(&self, count: u32) -> usize {
        self.advance(self.interval * count)
    }

    pub fn request_count(&self) -> usize {
        self.state.borrow().requested.len()
    }

    pub fn cancel_count(&self) -> usize {
        self.state.borrow().cancelled.len()
    }

    /// Every handle passed to `cancel_frame`, in order
    pub fn cancelled_handles(&self) -> Vec<FrameHandle> {
        self.state.borrow().cancelled.clone()
    }

    pub fn last_requested(&self) -> Option<FrameHandle> {
        self.state.borrow().requested.last().copied()
    }

    /// Frames scheduled but not yet fired or cancelled
    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    fn next_boundary(&self, now: Duration) -> Duration {
        let interval = self.interval.as_nanos();
        let ticks = now.as_nanos() / interval + 1;
        Duration::from_nanos((ticks * interval) as u64)
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        let handle = FrameHandle(state.next_id);
        state.next_id += 1;
        let due = self.next_boundary(state.now);
        state.pending.push(ScheduledFrame { handle, due, callback });
        state.requested.push(handle);
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        state.cancelled.push(handle);
        state.pending.retain(|frame| frame.handle != handle);
    }
}

// ==================== HostScheduler ====================

/// Scheduler fed by an external frame loop
///
/// Callbacks queue up until the host calls [`run_frame`](Self::run_frame).
/// An optional hook runs on every request so the host can wake up (winit's
/// `Window::request_redraw`, for instance).
pub struct HostScheduler {
    next_id: Cell<u64>,
    queue: RefCell<Vec<(FrameHandle, FrameCallback)>>,
    on_request: RefCell<Option<Box<dyn Fn()>>>,
}

impl HostScheduler {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            queue: RefCell::new(Vec::new()),
            on_request: RefCell::new(None),
        }
    }

    /// Set the hook called whenever a frame is requested
    pub fn set_frame_requested_hook(&self, hook: impl Fn() + 'static) {
        *self.on_request.borrow_mut() = Some(Box::new(hook));
    }

    /// Run the callbacks queued before this call
    ///
    /// Callbacks requested while running wait for the next `run_frame`.
    /// Returns the number of callbacks run.
    pub fn run_frame(&self, timestamp: Duration) -> usize {
        let batch = std::mem::take(&mut *self.queue.borrow_mut());
        let count = batch.len();
        for (_, callback) in batch {
            callback(timestamp);
        }
        count
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }
}

impl Default for HostScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for HostScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next_id.get());
        self.next_id.set(handle.0 + 1);
        self.queue.borrow_mut().push((handle, callback));

        if let Some(hook) = self.on_request.borrow().as_ref() {
            hook();
        }
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.queue.borrow_mut().retain(|(queued, _)| *queued != handle);
    }
}
