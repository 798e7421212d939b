//! Recording collaborators for orchestrator tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{self, FutureExt};
use raindrop_core::{
    AssetError, Background, Canvas, FrameClock, FxOptions, LoadFuture, ManualScheduler,
    RaindropFx, RenderError, RenderOptions, Renderer, Simulator, SimulatorOptions, Viewport,
};

pub type LoadSender = oneshot::Sender<Result<(), AssetError>>;
pub type TestFx = RaindropFx<RecordingSimulator, RecordingRenderer>;

/// Knobs the test uses to steer the renderer's async operations
#[derive(Default)]
pub struct RendererControl {
    load_gates: RefCell<VecDeque<oneshot::Receiver<Result<(), AssetError>>>>,
    reload_gates: RefCell<VecDeque<oneshot::Receiver<Result<(), AssetError>>>>,
    fail_next_load: Cell<bool>,
    fail_next_reload: Cell<bool>,
    refuse_construction: Cell<bool>,
}

impl RendererControl {
    /// The next `load_assets` stays pending until the sender fires
    pub fn gate_next_load(&self) -> LoadSender {
        let (tx, rx) = oneshot::channel();
        self.load_gates.borrow_mut().push_back(rx);
        tx
    }

    /// The next `reload_background` stays pending until the sender fires
    pub fn gate_next_reload(&self) -> LoadSender {
        let (tx, rx) = oneshot::channel();
        self.reload_gates.borrow_mut().push_back(rx);
        tx
    }

    pub fn fail_next_load(&self) {
        self.fail_next_load.set(true);
    }

    pub fn fail_next_reload(&self) {
        self.fail_next_reload.set(true);
    }

    pub fn refuse_construction(&self) {
        self.refuse_construction.set(true);
    }

    fn next_future(
        gates: &RefCell<VecDeque<oneshot::Receiver<Result<(), AssetError>>>>,
        fail: &Cell<bool>,
        what: &str,
    ) -> LoadFuture {
        if let Some(gate) = gates.borrow_mut().pop_front() {
            return async move { gate.await.unwrap_or(Err(AssetError::Cancelled)) }.boxed_local();
        }
        if fail.replace(false) {
            return future::ready(Err(AssetError::NotFound(what.to_string()))).boxed_local();
        }
        future::ready(Ok(())).boxed_local()
    }
}

#[derive(Clone)]
pub struct TestCanvas {
    pub width: u32,
    pub height: u32,
    pub control: Rc<RendererControl>,
}

impl TestCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            control: Rc::new(RendererControl::default()),
        }
    }
}

impl Canvas for TestCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Default)]
pub struct RecordingSimulator {
    pub updates: Vec<FrameClock>,
    pub resizes: Vec<Viewport>,
    pub destroy_calls: usize,
    pub viewport: Viewport,
}

impl Simulator for RecordingSimulator {
    fn new(_options: &SimulatorOptions, viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    fn update(&mut self, clock: FrameClock) {
        self.updates.push(clock);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.resizes.push(viewport);
    }

    fn destroy(&mut self) {
        self.destroy_calls += 1;
    }
}

pub struct RecordingRenderer {
    control: Rc<RendererControl>,
    options: RenderOptions,
    pub load_calls: usize,
    pub resizes: Vec<(u32, u32)>,
    pub reloads: Vec<Background>,
    /// Simulator update count seen by each render call
    pub renders: Vec<usize>,
    pub destroy_calls: usize,
}

impl Renderer<RecordingSimulator> for RecordingRenderer {
    type Canvas = TestCanvas;

    fn new(canvas: TestCanvas, options: &RenderOptions, _viewport: Viewport) -> Result<Self, RenderError> {
        if canvas.control.refuse_construction.get() {
            return Err(RenderError::AdapterUnavailable);
        }
        Ok(Self {
            control: canvas.control.clone(),
            options: options.clone(),
            load_calls: 0,
            resizes: Vec::new(),
            reloads: Vec::new(),
            renders: Vec::new(),
            destroy_calls: 0,
        })
    }

    fn load_assets(&mut self) -> LoadFuture {
        self.load_calls += 1;
        RendererControl::next_future(
            &self.control.load_gates,
            &self.control.fail_next_load,
            "shaders",
        )
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }

    fn set_background(&mut self, background: Background) {
        self.options.background = background;
    }

    fn reload_background(&mut self) -> LoadFuture {
        self.reloads.push(self.options.background.clone());
        RendererControl::next_future(
            &self.control.reload_gates,
            &self.control.fail_next_reload,
            "background",
        )
    }

    fn render(&mut self, simulator: &RecordingSimulator, _clock: FrameClock) {
        self.renders.push(simulator.updates.len());
    }

    fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn destroy(&mut self) {
        self.destroy_calls += 1;
    }
}

/// Effect over an 800x600 canvas with a fresh manual scheduler
pub fn effect(background: &str) -> (TestFx, Rc<ManualScheduler>, Rc<RendererControl>) {
    let canvas = TestCanvas::new(800, 600);
    let control = canvas.control.clone();
    let scheduler = Rc::new(ManualScheduler::new());
    let fx = TestFx::new(FxOptions::new(canvas, background), scheduler.clone())
        .expect("effect should construct");
    (fx, scheduler, control)
}

/// Counters the no-op-after-destroy checks compare before and after
#[derive(Debug, PartialEq)]
pub struct Snapshot {
    pub requests: usize,
    pub cancels: usize,
    pub updates: usize,
    pub sim_resizes: usize,
    pub sim_destroys: usize,
    pub loads: usize,
    pub resizes: usize,
    pub reloads: usize,
    pub renders: usize,
    pub destroys: usize,
    pub width: u32,
    pub height: u32,
    pub background: Background,
}

pub fn snapshot(fx: &TestFx, scheduler: &ManualScheduler) -> Snapshot {
    let sim = fx.simulator();
    let renderer = fx.renderer();
    let config = fx.config();
    Snapshot {
        requests: scheduler.request_count(),
        cancels: scheduler.cancel_count(),
        updates: sim.updates.len(),
        sim_resizes: sim.resizes.len(),
        sim_destroys: sim.destroy_calls,
        loads: renderer.load_calls,
        resizes: renderer.resizes.len(),
        reloads: renderer.reloads.len(),
        renders: renderer.renders.len(),
        destroys: renderer.destroy_calls,
        width: config.width,
        height: config.height,
        background: config.background.clone(),
    }
}
