//! The raindrop effect orchestrator
//!
//! [`RaindropFx`] owns the configuration, one simulator and one renderer, and
//! runs the frame loop: simulate, render, reschedule. Everything happens on
//! one thread. Asset loading and background reloads are the only suspension
//! points, and every continuation re-checks the lifecycle after resuming.
//!
//! ```text
//! NotStarted --start()--> Running --stop()--> NotStarted
//! NotStarted/Running --destroy()--> Destroyed (terminal, every op is a no-op)
//! ```

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::clock::FrameTimer;
use crate::collaborator::{Renderer, Simulator};
use crate::error::FxError;
use crate::options::{Background, FxConfig, FxOptions};
use crate::scheduler::{FrameHandle, FrameScheduler};

/// Lifecycle of an effect
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed or stopped; `start` may be called
    NotStarted,
    /// Loading assets or looping
    Running,
    /// Torn down for good
    Destroyed,
}

/// A scheduled frame. `seq` tells the firing callback whether it is still
/// the frame the loop is waiting for.
#[derive(Clone, Copy, Debug)]
struct PendingFrame {
    handle: FrameHandle,
    seq: u64,
}

struct LoopState {
    lifecycle: Lifecycle,
    pending: Option<PendingFrame>,
    frame_seq: u64,
    start_attempt: u64,
    assets_loaded: bool,
    timer: FrameTimer,
}

struct Shared<S, R>
where
    R: Renderer<S>,
{
    config: RefCell<FxConfig<R::Canvas>>,
    state: RefCell<LoopState>,
    simulator: RefCell<S>,
    renderer: RefCell<R>,
    scheduler: Rc<dyn FrameScheduler>,
}

/// Rain overlay effect: lifecycle and frame loop around a simulator and renderer
///
/// All operations take `&self`. Dropping the effect destroys it.
pub struct RaindropFx<S, R>
where
    S: Simulator + 'static,
    R: Renderer<S> + 'static,
{
    shared: Rc<Shared<S, R>>,
}

impl<S, R> RaindropFx<S, R>
where
    S: Simulator + 'static,
    R: Renderer<S> + 'static,
{
    /// Build the effect and its collaborators
    ///
    /// Neither loads assets nor schedules anything; call [`start`](Self::start).
    pub fn new(
        options: FxOptions<R::Canvas>,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> Result<Self, FxError> {
        let config = options.resolve()?;

        let simulator = S::new(&config.simulator, config.viewport);
        let renderer = R::new(config.canvas.clone(), &config.renderer, config.viewport)?;

        log::info!(
            "Raindrop effect created ({}x{}, background {})",
            config.width,
            config.height,
            config.background
        );

        let timer = FrameTimer::new(config.max_frame_dt);
        Ok(Self {
            shared: Rc::new(Shared {
                config: RefCell::new(config),
                state: RefCell::new(LoopState {
                    lifecycle: Lifecycle::NotStarted,
                    pending: None,
                    frame_seq: 0,
                    start_attempt: 0,
                    assets_loaded: false,
                    timer,
                }),
                simulator: RefCell::new(simulator),
                renderer: RefCell::new(renderer),
                scheduler,
            }),
        })
    }

    /// Load assets, then schedule the first frame
    ///
    /// Resolves immediately if already running or destroyed. Assets are
    /// loaded once; restarting after [`stop`](Self::stop) schedules directly.
    /// If the effect is stopped or destroyed while loading, nothing is
    /// scheduled. A failed load leaves the effect `NotStarted`.
    pub async fn start(&self) -> Result<(), FxError> {
        let (attempt, needs_load) = {
            let mut state = self.shared.state.borrow_mut();
            if state.lifecycle != Lifecycle::NotStarted {
                log::debug!("start ignored: effect is {:?}", state.lifecycle);
                return Ok(());
            }
            state.lifecycle = Lifecycle::Running;
            state.start_attempt += 1;
            state.timer.pause();
            (state.start_attempt, !state.assets_loaded)
        };

        if needs_load {
            let load = self.shared.renderer.borrow_mut().load_assets();
            let result = load.await;

            let mut state = self.shared.state.borrow_mut();
            if let Err(err) = result {
                if state.start_attempt == attempt
                    && state.lifecycle == Lifecycle::Running
                    && state.pending.is_none()
                {
                    state.lifecycle = Lifecycle::NotStarted;
                }
                log::warn!("Asset loading failed: {}", err);
                return Err(FxError::AssetLoad(err));
            }

            if state.lifecycle == Lifecycle::Destroyed {
                log::debug!("Assets loaded after destroy; not scheduling");
                return Ok(());
            }
            state.assets_loaded = true;

            if state.lifecycle != Lifecycle::Running
                || state.start_attempt != attempt
                || state.pending.is_some()
            {
                log::debug!("Assets loaded but start #{} was superseded", attempt);
                return Ok(());
            }
        }

        Shared::schedule_frame(&self.shared);
        log::info!("Raindrop loop started");
        Ok(())
    }

    /// Pause the loop, cancelling the pending frame
    ///
    /// No-op unless running. The effect can be started again.
    pub fn stop(&self) {
        let pending = {
            let mut state = self.shared.state.borrow_mut();
            if state.lifecycle != Lifecycle::Running {
                return;
            }
            state.lifecycle = Lifecycle::NotStarted;
            state.timer.pause();
            state.pending.take()
        };

        if let Some(frame) = pending {
            self.shared.scheduler.cancel_frame(frame.handle);
            log::debug!("Cancelled frame {:?}", frame.handle);
        }
        log::info!("Raindrop loop stopped");
    }

    /// Resize the effect to `width` x `height` pixels
    pub fn resize(&self, width: u32, height: u32) {
        if self.is_destroyed() {
            return;
        }

        let viewport = self.shared.config.borrow_mut().set_size(width, height);
        self.shared.renderer.borrow_mut().resize(width, height);
        self.shared.simulator.borrow_mut().resize(viewport);
        log::debug!("Resized to {}x{}", width, height);
    }

    /// Swap the background and wait for the renderer to apply it
    ///
    /// Concurrent calls are not serialized: the last configuration write
    /// wins, and each caller awaits its own reload.
    pub async fn set_background(&self, source: impl Into<Background>) -> Result<(), FxError> {
        if self.is_destroyed() {
            return Ok(());
        }

        let background = source.into();
        log::info!("Setting background to {}", background);
        self.shared.config.borrow_mut().set_background(background.clone());

        let reload = {
            let mut renderer = self.shared.renderer.borrow_mut();
            renderer.set_background(background);
            renderer.reload_background()
        };
        reload.await.map_err(|err| {
            log::warn!("Background reload failed: {}", err);
            FxError::BackgroundReload(err)
        })
    }

    /// Tear the effect down; later calls do nothing
    pub fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }

        self.stop();
        self.shared.renderer.borrow_mut().destroy();
        self.shared.simulator.borrow_mut().destroy();
        self.shared.state.borrow_mut().lifecycle = Lifecycle::Destroyed;
        log::info!("Raindrop effect destroyed");
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.state.borrow().lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle() == Lifecycle::Running
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle() == Lifecycle::Destroyed
    }

    /// Whether a frame is scheduled and not yet fired
    pub fn has_pending_frame(&self) -> bool {
        self.shared.state.borrow().pending.is_some()
    }

    /// Seconds of simulated loop time so far
    pub fn elapsed(&self) -> f64 {
        self.shared.state.borrow().timer.total()
    }

    /// Read-only view of the current configuration
    pub fn config(&self) -> Ref<'_, FxConfig<R::Canvas>> {
        self.shared.config.borrow()
    }

    /// Read-only view of the simulator
    pub fn simulator(&self) -> Ref<'_, S> {
        self.shared.simulator.borrow()
    }

    /// Read-only view of the renderer (e.g. to confirm its applied options)
    pub fn renderer(&self) -> Ref<'_, R> {
        self.shared.renderer.borrow()
    }
}

impl<S, R> Drop for RaindropFx<S, R>
where
    S: Simulator + 'static,
    R: Renderer<S> + 'static,
{
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<S, R> Shared<S, R>
where
    S: Simulator + 'static,
    R: Renderer<S> + 'static,
{
    /// Request the next frame and record its handle
    fn schedule_frame(shared: &Rc<Self>) {
        let seq = {
            let mut state = shared.state.borrow_mut();
            state.frame_seq += 1;
            state.frame_seq
        };

        let weak: Weak<Self> = Rc::downgrade(shared);
        let handle = shared.scheduler.request_frame(Box::new(move |timestamp| {
            if let Some(shared) = weak.upgrade() {
                Shared::step(&shared, seq, timestamp);
            }
        }));

        shared.state.borrow_mut().pending = Some(PendingFrame { handle, seq });
        log::trace!("Scheduled frame {:?}", handle);
    }

    /// One frame: simulate, render, reschedule
    fn step(shared: &Rc<Self>, seq: u64, timestamp: Duration) {
        let clock = {
            let mut state = shared.state.borrow_mut();
            if state.lifecycle != Lifecycle::Running {
                return;
            }
            match state.pending {
                Some(frame) if frame.seq == seq => {}
                _ => return,
            }
            state.pending = None;
            state.timer.tick(timestamp)
        };

        shared.simulator.borrow_mut().update(clock);
        {
            let simulator = shared.simulator.borrow();
            shared.renderer.borrow_mut().render(&simulator, clock);
        }

        let keep_going = {
            let state = shared.state.borrow();
            state.lifecycle == Lifecycle::Running && state.pending.is_none()
        };
        if keep_going {
            Shared::schedule_frame(shared);
        }
    }
}
