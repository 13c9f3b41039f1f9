use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use crate::config::SceneConfig;
use crate::controller::clock::{FrameClock, FrameTime, TimeSource};
use crate::controller::input::{InputEvent, InputQueue, InputState, Viewport};
use crate::model::{Camera, SceneGraph};

/// Camera-local y for a scroll offset: one viewport of scroll is one section of descent
pub fn camera_scroll_y(scroll_y: f32, viewport_height: u32, objects_distance: f32) -> f32 {
    -scroll_y / viewport_height.max(1) as f32 * objects_distance
}

/// One step of frame-rate independent exponential smoothing.
///
/// Overshoots when `factor * delta > 1` (e.g. after a long stall); callers
/// pass the raw delta.
pub fn damp_toward(current: Vec2, target: Vec2, factor: f32, delta: f32) -> Vec2 {
    current + (target - current) * factor * delta
}

/// Section mesh rotation on both axes; depends on elapsed time only
pub fn mesh_rotation(elapsed: f32, speed: f32) -> f32 {
    elapsed * speed
}

/// Write one frame's transforms into the scene
pub fn animate(scene: &mut SceneGraph, input: &InputState, time: FrameTime, viewport: &Viewport, config: &SceneConfig) {
    scene.camera.local.y = camera_scroll_y(input.scroll_y, viewport.height, config.objects_distance);

    let parallax = Vec2::new(input.cursor_x, -input.cursor_y);
    scene.rig.position = damp_toward(scene.rig.position, parallax, config.damping_factor, time.delta);

    let angle = mesh_rotation(time.elapsed, config.rotation_speed);
    for section in scene.sections.iter_mut() {
        section.rotation = Vec2::splat(angle);
    }
}

/// What the scene needs from a renderer
pub trait RenderDelegate {
    /// Logical (CSS px) size of the drawing area
    fn set_size(&mut self, width: u32, height: u32);
    fn set_pixel_ratio(&mut self, ratio: f64);
    fn render(&mut self, scene: &SceneGraph, camera: &Camera);
}

/// Externally settable stop flag for the run loop
#[derive(Debug, Clone, Default)]
pub struct LoopControl {
    stopped: Rc<Cell<bool>>,
}

impl LoopControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

/// Main loop state and update logic
pub struct FrameLoopContext<S: TimeSource> {
    pub config: SceneConfig,
    pub scene: SceneGraph,
    pub input: InputState,
    pub queue: InputQueue,
    pub viewport: Viewport,
    pub control: LoopControl,
    clock: FrameClock<S>,
}

impl<S: TimeSource> FrameLoopContext<S> {
    pub fn new(config: SceneConfig, scene: SceneGraph, viewport: Viewport, time: S) -> Self {
        Self {
            config,
            scene,
            input: InputState::new(),
            queue: InputQueue::new(),
            viewport,
            control: LoopControl::new(),
            clock: FrameClock::new(time),
        }
    }

    /// Drain queued input, advance the clock and animate. Returns the new
    /// viewport if a resize was among the drained events.
    pub fn update(&mut self) -> (FrameTime, Option<Viewport>) {
        let mut resized = None;
        for event in self.queue.drain() {
            match event {
                InputEvent::Resize { width, height, device_pixel_ratio } => {
                    self.viewport = Viewport::new(width, height, device_pixel_ratio);
                    self.scene.camera.set_aspect(width, height);
                    resized = Some(self.viewport);
                }
                other => self.input.process_event(&other, &self.viewport, self.config.cursor_mapping),
            }
        }

        let time = self.clock.tick();
        animate(&mut self.scene, &self.input, time, &self.viewport, &self.config);
        tracing::trace!(elapsed = time.elapsed, delta = time.delta, "frame");
        (time, resized)
    }

    /// Run one full frame against a renderer. Returns false once stopped,
    /// meaning the caller must not schedule another frame.
    pub fn frame<R: RenderDelegate>(&mut self, renderer: &mut R) -> bool {
        self.frame_with(renderer, |_, _, _| {})
    }

    /// Like [`frame`](Self::frame), with a hook that runs after the scene is
    /// animated and before it is drawn (used for the UI overlay).
    pub fn frame_with<R, F>(&mut self, renderer: &mut R, before_render: F) -> bool
    where
        R: RenderDelegate,
        F: FnOnce(&mut SceneGraph, FrameTime, &mut R),
    {
        if self.control.is_stopped() {
            return false;
        }

        let (time, resized) = self.update();
        if let Some(vp) = resized {
            tracing::debug!(width = vp.width, height = vp.height, "viewport resized");
            renderer.set_size(vp.width, vp.height);
            renderer.set_pixel_ratio(self.config.pixel_ratio(vp.device_pixel_ratio));
        }
        before_render(&mut self.scene, time, renderer);
        renderer.render(&self.scene, &self.scene.camera);

        !self.control.is_stopped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::clock::ManualTime;
    use crate::model::ToonGradient;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[derive(Default)]
    struct RecordingRenderer {
        sizes: Vec<(u32, u32)>,
        ratios: Vec<f64>,
        frames: usize,
        last_camera_y: f32,
    }

    impl RenderDelegate for RecordingRenderer {
        fn set_size(&mut self, width: u32, height: u32) {
            self.sizes.push((width, height));
        }
        fn set_pixel_ratio(&mut self, ratio: f64) {
            self.ratios.push(ratio);
        }
        fn render(&mut self, _scene: &SceneGraph, camera: &Camera) {
            self.frames += 1;
            self.last_camera_y = camera.local.y;
        }
    }

    fn context(width: u32, height: u32) -> (FrameLoopContext<ManualTime>, ManualTime) {
        let config = SceneConfig::default();
        let scene = SceneGraph::new(&config, ToonGradient::three_tone(), width, height);
        let time = ManualTime::new();
        let ctx = FrameLoopContext::new(config, scene, Viewport::new(width, height, 1.0), time.clone());
        (ctx, time)
    }

    #[test]
    fn test_camera_scroll_y_endpoints() {
        assert_eq!(camera_scroll_y(0.0, 800, 4.0), 0.0);
        assert!(approx(camera_scroll_y(800.0, 800, 4.0), -4.0));
        assert!(approx(camera_scroll_y(400.0, 800, 4.0), -2.0));
    }

    #[test]
    fn test_damp_step_is_exact_linear_blend() {
        let p0 = Vec2::new(0.3, -0.2);
        let target = Vec2::new(-0.5, 0.4);
        for dt in [0.0f32, 0.001, 0.016, 0.05, 0.19] {
            let expected = p0 + (target - p0) * 5.0 * dt;
            assert_eq!(damp_toward(p0, target, 5.0, dt), expected);
        }
        assert_eq!(damp_toward(p0, target, 5.0, 0.0), p0);
    }

    #[test]
    fn test_damp_converges_across_frame_rates() {
        let target = Vec2::new(0.5, 0.5);
        let mut slow = Vec2::ZERO;
        let mut fast = Vec2::ZERO;
        for _ in 0..30 {
            slow = damp_toward(slow, target, 5.0, 1.0 / 30.0);
        }
        for _ in 0..144 {
            fast = damp_toward(fast, target, 5.0, 1.0 / 144.0);
        }
        assert!((slow - target).length() < 0.01);
        assert!((fast - target).length() < 0.01);
    }

    #[test]
    fn test_mesh_rotation_is_pure_in_time() {
        assert!(approx(mesh_rotation(3.0, 0.2), 0.6));
        assert_eq!(mesh_rotation(3.0, 0.2), mesh_rotation(3.0, 0.2));
    }

    #[test]
    fn test_end_to_end_scroll_moves_camera() {
        let (mut ctx, time) = context(1200, 800);
        ctx.queue.push(InputEvent::Scroll { offset: 400.0 });
        time.advance(0.016);
        ctx.update();
        assert!(approx(ctx.scene.camera.local.y, -2.0));
        assert_eq!(ctx.scene.camera.local.z, 6.0);
    }

    #[test]
    fn test_end_to_end_rotation_at_three_seconds() {
        let (mut ctx, time) = context(800, 600);
        // rotation must not depend on how many frames got us there
        for _ in 0..7 {
            time.advance(3.0 / 7.0);
            ctx.update();
        }
        time.set(3.0);
        let (t, _) = ctx.update();
        assert!(approx(t.elapsed, 3.0));
        for section in &ctx.scene.sections {
            assert!(approx(section.rotation.x, 0.6));
            assert!(approx(section.rotation.y, 0.6));
        }
    }

    #[test]
    fn test_rig_follows_inverted_cursor() {
        let (mut ctx, time) = context(800, 800);
        ctx.queue.push(InputEvent::PointerMove { client_x: 800.0, client_y: 800.0 });
        time.advance(0.1);
        ctx.update();
        // target (0.5, -0.5), one step of 5 * 0.1
        assert!(approx(ctx.scene.rig.position.x, 0.25));
        assert!(approx(ctx.scene.rig.position.y, -0.25));
        assert_eq!(ctx.scene.camera.local.z, 6.0);
    }

    #[test]
    fn test_resize_updates_camera_and_renderer() {
        let (mut ctx, time) = context(800, 600);
        let mut renderer = RecordingRenderer::default();
        ctx.queue.push(InputEvent::Resize { width: 1000, height: 500, device_pixel_ratio: 3.0 });
        time.advance(0.016);
        assert!(ctx.frame(&mut renderer));
        assert!(approx(ctx.scene.camera.aspect, 2.0));
        assert_eq!(renderer.sizes, vec![(1000, 500)]);
        assert_eq!(renderer.ratios, vec![2.0]);
        assert_eq!(renderer.frames, 1);

        // no resize, no forwarding
        assert!(ctx.frame(&mut renderer));
        assert_eq!(renderer.sizes.len(), 1);
        assert_eq!(renderer.frames, 2);
    }

    #[test]
    fn test_scroll_uses_resized_viewport_height() {
        let (mut ctx, _time) = context(800, 800);
        ctx.queue.push(InputEvent::Resize { width: 800, height: 400, device_pixel_ratio: 1.0 });
        ctx.queue.push(InputEvent::Scroll { offset: 400.0 });
        ctx.update();
        assert!(approx(ctx.scene.camera.local.y, -4.0));
    }

    #[test]
    fn test_stop_flag_halts_frames() {
        let (mut ctx, _time) = context(800, 600);
        let mut renderer = RecordingRenderer::default();
        let control = ctx.control.clone();
        assert!(ctx.frame(&mut renderer));
        control.stop();
        assert!(!ctx.frame(&mut renderer));
        assert_eq!(renderer.frames, 1);
    }

    #[test]
    fn test_hook_runs_between_animate_and_render() {
        use crate::model::Rgb;
        let (mut ctx, time) = context(800, 800);
        let mut renderer = RecordingRenderer::default();
        time.set(3.0);
        let mut seen_rotation = 0.0;
        ctx.frame_with(&mut renderer, |scene, t, r| {
            seen_rotation = scene.sections[0].rotation.x;
            assert_eq!(r.frames, 0);
            assert!(approx(t.elapsed, 3.0));
            scene.set_material_color(Rgb::new(1, 2, 3));
        });
        assert!(approx(seen_rotation, 0.6));
        assert_eq!(renderer.frames, 1);
        assert_eq!(ctx.scene.points.color, Rgb::new(1, 2, 3));
    }

    #[test]
    fn test_renderer_sees_current_camera() {
        let (mut ctx, _time) = context(800, 800);
        let mut renderer = RecordingRenderer::default();
        ctx.queue.push(InputEvent::Scroll { offset: 800.0 });
        ctx.frame(&mut renderer);
        assert!(approx(renderer.last_camera_y, -4.0));
    }
}
