//! Integration tests for the effect lifecycle and frame loop
//!
//! The renderer and simulator are recording doubles; time is driven by a
//! `ManualScheduler` with a 16 ms frame interval.

mod common;

use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use raindrop_core::{
    AssetError, FrameScheduler, FxError, FxOptions, Lifecycle, ManualScheduler, Viewport,
};

use common::{effect, snapshot, TestCanvas, TestFx};

fn frame() -> Duration {
    ManualScheduler::DEFAULT_INTERVAL
}

// ==================== Construction ====================

#[test]
fn test_construction_does_not_load_or_schedule() {
    let (fx, scheduler, _) = effect("a.png");

    assert_eq!(fx.lifecycle(), Lifecycle::NotStarted);
    assert_eq!(fx.renderer().load_calls, 0);
    assert_eq!(scheduler.request_count(), 0);
    assert_eq!(fx.config().viewport, Viewport::new(800, 600));
    assert_eq!(fx.simulator().viewport, Viewport::new(800, 600));
}

#[test]
fn test_construction_requires_canvas() {
    let scheduler = Rc::new(ManualScheduler::new());
    let result = TestFx::new(FxOptions::default(), scheduler);
    assert!(matches!(result, Err(FxError::MissingCanvas)));
}

#[test]
fn test_renderer_construction_failure_surfaces() {
    let canvas = TestCanvas::new(10, 10);
    canvas.control.refuse_construction();
    let scheduler = Rc::new(ManualScheduler::new());
    let result = TestFx::new(FxOptions::new(canvas, "a.png"), scheduler);
    assert!(matches!(result, Err(FxError::Renderer(_))));
}

// ==================== start / frame loop ====================

#[test]
fn test_start_loads_assets_then_schedules_once() {
    let (fx, scheduler, _) = effect("a.png");

    pollster::block_on(fx.start()).unwrap();

    assert_eq!(fx.renderer().load_calls, 1);
    assert_eq!(scheduler.request_count(), 1);
    assert!(fx.is_running());
    assert!(fx.has_pending_frame());
}

#[test]
fn test_each_step_schedules_exactly_one_frame() {
    let (fx, scheduler, _) = effect("a.png");
    pollster::block_on(fx.start()).unwrap();

    for n in 1..=5 {
        scheduler.advance(frame());
        assert_eq!(fx.simulator().updates.len(), n);
        assert_eq!(fx.renderer().renders.len(), n);
        assert_eq!(scheduler.request_count(), n + 1);
        assert_eq!(scheduler.pending_count(), 1);
    }
}

#[test]
fn test_simulate_happens_before_render() {
    let (fx, scheduler, _) = effect("a.png");
    pollster::block_on(fx.start()).unwrap();
    scheduler.advance(frame() * 3);

    // Each render saw the update from its own frame
    assert_eq!(fx.renderer().renders, vec![1, 2, 3]);
}

#[test]
fn test_frame_clock_is_monotonic() {
    let (fx, scheduler, _) = effect("a.png");
    pollster::block_on(fx.start()).unwrap();
    scheduler.advance(frame() * 4);

    let sim = fx.simulator();
    assert_eq!(sim.updates[0].dt, 0.0);
    assert!(sim.updates.iter().all(|clock| clock.dt >= 0.0));
    assert!(sim.updates.windows(2).all(|w| w[1].total >= w[0].total));
    assert!((sim.updates[1].dt - 0.016).abs() < 1e-6);
    assert!((fx.elapsed() - 0.048).abs() < 1e-6);
}

#[test]
fn test_start_while_running_is_noop() {
    let (fx, scheduler, _) = effect("a.png");
    pollster::block_on(fx.start()).unwrap();
    pollster::block_on(fx.start()).unwrap();

    assert_eq!(fx.renderer().load_calls, 1);
    assert_eq!(scheduler.request_count(), 1);
}

#[test]
fn test_no_frames_before_assets_load() {
    let (fx, scheduler, control) = effect("a.png");
    let release = control.gate_next_load();

    let mut start = Box::pin(fx.start());
    assert!(start.as_mut().now_or_never().is_none());
    assert!(fx.is_running());

    // Time passes while loading; nothing may run
    scheduler.advance(Duration::from_secs(1));
    assert_eq!(scheduler.request_count(), 0);
    assert!(fx.simulator().updates.is_empty());
    assert!(fx.renderer().renders.is_empty());

    release.send(Ok(())).unwrap();
    pollster::block_on(start).unwrap();
    assert_eq!(scheduler.request_count(), 1);

    scheduler.advance(frame());
    assert_eq!(fx.simulator().updates.len(), 1);
}

#[test]
fn test_concurrent_start_while_loading_is_noop() {
    let (fx, scheduler, control) = effect("a.png");
    let release = control.gate_next_load();

    let mut first = Box::pin(fx.start());
    assert!(first.as_mut().now_or_never().is_none());

    // Second start resolves immediately without a second load
    pollster::block_on(fx.start()).unwrap();
    assert_eq!(fx.renderer().load_calls, 1);

    release.send(Ok(())).unwrap();
    pollster::block_on(first).unwrap();
    assert_eq!(scheduler.request_count(), 1);
}

#[test]
fn test_failed_start_leaves_not_started_and_can_retry() {
    let (fx, scheduler, control) = effect("a.png");
    control.fail_next_load();

    let result = pollster::block_on(fx.start());
    assert!(matches!(result, Err(FxError::AssetLoad(AssetError::NotFound(_)))));
    assert_eq!(fx.lifecycle(), Lifecycle::NotStarted);
    assert_eq!(scheduler.request_count(), 0);

    pollster::block_on(fx.start()).unwrap();
    assert_eq!(fx.renderer().load_calls, 2);
    assert_eq!(scheduler.request_count(), 1);
}

// ==================== stop ====================

#[test]
fn test_stop_cancels_last_handle_and_halts() {
    let (fx, scheduler, _) = effect("a.png");
    pollster::block_on(fx.start()).unwrap();
    scheduler.advance(frame());
    assert_eq!(scheduler.request_count(), 2);

    let last = scheduler.last_requested().unwrap();
    fx.stop();

    assert_eq!(scheduler.cancelled_handles(), vec![last]);
    assert_eq!(fx.lifecycle(), Lifecycle::NotStarted);
    assert!(!fx.has_pending_frame());

    scheduler.advance(Duration::from_millis(100));
    assert_eq!(fx.simulator().updates.len(), 1);
    assert_eq!(fx.renderer().renders.len(), 1);
    assert_eq!(scheduler.request_count(), 2);
}

#[test]
fn test_repeated_stop_cancels_once() {
    let (fx, scheduler, _) = effect("a.png");
    pollster::block_on(fx.start()).unwrap();

    fx.stop();
    fx.stop();
    fx.stop();
    assert_eq!(scheduler.cancel_count(), 1);
}

#[test]
fn test_stop_before_start_is_noop() {
    let (fx, scheduler, _) = effect("a.png");
    fx.stop();
    assert_eq!(scheduler.cancel_count(), 0);
    assert_eq!(fx.lifecycle(), Lifecycle::NotStarted);
}

#[test]
fn test_restart_after_stop_resumes_without_reloading() {
    let (fx, scheduler, _) = effect("a.png");
    pollster::block_on(fx.start()).unwrap();
    scheduler.advance(frame() * 2);
    fx.stop();
    scheduler.advance(Duration::from_secs(5));

    pollster::block_on(fx.start()).unwrap();
    assert!(fx.is_running());
    assert_eq!(fx.renderer().load_calls, 1);

    scheduler.advance(frame() * 2);
    let sim = fx.simulator();
    assert_eq!(sim.updates.len(), 4);
    // First frame after the restart does not see the paused time
    assert_eq!(sim.updates[2].dt, 0.0);
    assert!(sim.updates[2].total < 1.0);
}

#[test]
fn test_stop_during_load_schedules_nothing() {
    let (fx, scheduler, control) = effect("a.png");
    let release = control.gate_next_load();

    let mut start = Box::pin(fx.start());
    assert!(start.as_mut().now_or_never().is_none());

    fx.stop();
    assert_eq!(scheduler.cancel_count(), 0);

    release.send(Ok(())).unwrap();
    pollster::block_on(start).unwrap();
    assert_eq!(scheduler.request_count(), 0);
    assert_eq!(fx.lifecycle(), Lifecycle::NotStarted);

    // Assets are in place, so the next start schedules straight away
    pollster::block_on(fx.start()).unwrap();
    assert_eq!(fx.renderer().load_calls, 1);
    assert_eq!(scheduler.request_count(), 1);
}

#[test]
fn test_stop_and_restart_during_load_keeps_single_frame() {
    let (fx, scheduler, control) = effect("a.png");
    let first_release = control.gate_next_load();
    let second_release = control.gate_next_load();

    let mut first = Box::pin(fx.start());
    assert!(first.as_mut().now_or_never().is_none());
    fx.stop();
    let mut second = Box::pin(fx.start());
    assert!(second.as_mut().now_or_never().is_none());

    first_release.send(Ok(())).unwrap();
    pollster::block_on(first).unwrap();
    assert_eq!(scheduler.request_count(), 0);

    second_release.send(Ok(())).unwrap();
    pollster::block_on(second).unwrap();
    assert_eq!(scheduler.request_count(), 1);
    assert_eq!(scheduler.pending_count(), 1);
}

// ==================== resize ====================

#[test]
fn test_resize_updates_config_and_forwards_once() {
    let (fx, _, _) = effect("a.png");
    fx.resize(1024, 768);

    let config = fx.config();
    assert_eq!((config.width, config.height), (1024, 768));
    assert_eq!(config.viewport, Viewport::new(1024, 768));
    assert_eq!(fx.renderer().resizes, vec![(1024, 768)]);
    assert_eq!(fx.simulator().resizes, vec![Viewport::new(1024, 768)]);
}

#[test]
fn test_resize_while_running_keeps_loop() {
    let (fx, scheduler, _) = effect("a.png");
    pollster::block_on(fx.start()).unwrap();
    fx.resize(640, 480);

    assert_eq!(scheduler.request_count(), 1);
    assert_eq!(scheduler.cancel_count(), 0);
    scheduler.advance(frame());
    assert_eq!(fx.simulator().updates.len(), 1);
}

// ==================== destroy ====================

#[test]
fn test_destroy_stops_and_tears_down() {
    let (fx, scheduler, _) = effect("a.png");
    pollster::block_on(fx.start()).unwrap();

    fx.destroy();

    assert!(fx.is_destroyed());
    assert_eq!(scheduler.cancel_count(), 1);
    assert_eq!(fx.renderer().destroy_calls, 1);
    assert_eq!(fx.simulator().destroy_calls, 1);
}

#[test]
fn test_destroy_is_idempotent() {
    let (fx, scheduler, _) = effect("a.png");
    pollster::block_on(fx.start()).unwrap();

    fx.destroy();
    fx.destroy();
    fx.destroy();

    assert_eq!(scheduler.cancel_count(), 1);
    assert_eq!(fx.renderer().destroy_calls, 1);
    assert_eq!(fx.simulator().destroy_calls, 1);
}

#[test]
fn test_destroy_without_start_cancels_nothing() {
    let (fx, scheduler, _) = effect("a.png");
    fx.destroy();
    assert_eq!(scheduler.cancel_count(), 0);
    assert_eq!(fx.renderer().destroy_calls, 1);
}

#[test]
fn test_every_operation_is_noop_after_destroy() {
    let (fx, scheduler, _) = effect("a.png");
    fx.destroy();
    let before = snapshot(&fx, &scheduler);

    pollster::block_on(fx.start()).unwrap();
    scheduler.advance(Duration::from_millis(100));
    fx.stop();
    fx.resize(100, 100);
    pollster::block_on(fx.set_background("another.png")).unwrap();
    fx.destroy();

    assert_eq!(snapshot(&fx, &scheduler), before);
    assert!(fx.is_destroyed());
}

#[test]
fn test_destroy_during_load_schedules_nothing() {
    let (fx, scheduler, control) = effect("a.png");
    let release = control.gate_next_load();

    let mut start = Box::pin(fx.start());
    assert!(start.as_mut().now_or_never().is_none());

    fx.destroy();
    release.send(Ok(())).unwrap();
    pollster::block_on(start).unwrap();

    assert_eq!(scheduler.request_count(), 0);
    assert!(fx.is_destroyed());
    scheduler.advance(Duration::from_secs(1));
    assert!(fx.simulator().updates.is_empty());
}

#[test]
fn test_stale_callback_after_destroy_does_nothing() {
    // A scheduler that ignores cancellation still cannot revive the loop
    struct DeafScheduler(ManualScheduler);

    impl FrameScheduler for DeafScheduler {
        fn request_frame(&self, callback: raindrop_core::FrameCallback) -> raindrop_core::FrameHandle {
            self.0.request_frame(callback)
        }

        fn cancel_frame(&self, _handle: raindrop_core::FrameHandle) {}
    }

    let scheduler = Rc::new(DeafScheduler(ManualScheduler::new()));
    let fx = TestFx::new(FxOptions::new(TestCanvas::new(10, 10), "a.png"), scheduler.clone()).unwrap();
    pollster::block_on(fx.start()).unwrap();
    fx.destroy();

    assert_eq!(scheduler.0.advance(frame()), 1);
    assert!(fx.simulator().updates.is_empty());
    assert!(fx.renderer().renders.is_empty());
    assert_eq!(scheduler.0.request_count(), 1);
}

#[test]
fn test_stale_callback_after_stop_does_nothing() {
    struct DeafScheduler(ManualScheduler);

    impl FrameScheduler for DeafScheduler {
        fn request_frame(&self, callback: raindrop_core::FrameCallback) -> raindrop_core::FrameHandle {
            self.0.request_frame(callback)
        }

        fn cancel_frame(&self, _handle: raindrop_core::FrameHandle) {}
    }

    let scheduler = Rc::new(DeafScheduler(ManualScheduler::new()));
    let fx = TestFx::new(FxOptions::new(TestCanvas::new(10, 10), "a.png"), scheduler.clone()).unwrap();
    pollster::block_on(fx.start()).unwrap();
    fx.stop();
    pollster::block_on(fx.start()).unwrap();

    // Two callbacks are queued; only the one from the second start counts
    scheduler.0.advance(frame());
    assert_eq!(fx.simulator().updates.len(), 1);
    assert_eq!(scheduler.0.pending_count(), 1);
}

#[test]
fn test_drop_cancels_pending_frame() {
    let (fx, scheduler, _) = effect("a.png");
    pollster::block_on(fx.start()).unwrap();
    assert_eq!(scheduler.pending_count(), 1);

    drop(fx);
    assert_eq!(scheduler.cancel_count(), 1);
    assert_eq!(scheduler.pending_count(), 0);
    assert_eq!(scheduler.advance(Duration::from_secs(1)), 0);
}

// ==================== End to end ====================

#[test]
fn test_start_tick_stop_destroy() {
    let (fx, scheduler, _) = effect("a.png");

    pollster::block_on(fx.start()).unwrap();
    scheduler.advance(frame());
    assert_eq!(fx.simulator().updates.len(), 1);
    assert_eq!(fx.renderer().renders.len(), 1);
    assert_eq!(scheduler.request_count(), 2);

    let last = scheduler.last_requested().unwrap();
    fx.stop();
    assert_eq!(scheduler.cancelled_handles(), vec![last]);
    scheduler.advance(Duration::from_millis(100));
    assert_eq!(fx.simulator().updates.len(), 1);

    fx.destroy();
    fx.destroy();
    assert_eq!(fx.renderer().destroy_calls, 1);
    assert_eq!(scheduler.cancel_count(), 1);
}
