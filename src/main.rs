use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use scrollscape::controller::clock::InstantTime;
use scrollscape::controller::{FrameLoopContext, InputEvent, LoopControl, ScrollPage, Viewport};
use scrollscape::model::{SceneGraph, ToonGradient};
use scrollscape::view::{physical_size, GpuContext, Renderer};
use scrollscape::{logging, ui, SceneConfig, SceneError};

/// Pixels scrolled per wheel notch
const LINE_HEIGHT_PX: f32 = 100.0;

struct RunningScene {
    window: Arc<Window>,
    renderer: Renderer,
    frame_ctx: FrameLoopContext<InstantTime>,
    page: ScrollPage,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
}

struct App {
    config: SceneConfig,
    gradient: ToonGradient,
    control: LoopControl,
    scene: Option<RunningScene>,
}

impl App {
    fn new(config: SceneConfig, gradient: ToonGradient) -> Self {
        Self { config, gradient, control: LoopControl::new(), scene: None }
    }

    fn create_scene(&self, event_loop: &ActiveEventLoop) -> Result<RunningScene, SceneError> {
        let attributes = Window::default_attributes()
            .with_title("scrollscape")
            .with_transparent(true)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| SceneError::Dom(format!("failed to create window: {e}")))?,
        );

        let viewport = viewport_of(&window);
        let pixel_ratio = self.config.pixel_ratio(viewport.device_pixel_ratio);
        let (pw, ph) = physical_size(viewport.width, viewport.height, pixel_ratio);

        let instance = GpuContext::instance();
        let surface = instance.create_surface(window.clone())?;
        let gpu = pollster::block_on(GpuContext::new(&instance, surface, pw, ph))?;

        let scene = SceneGraph::new(&self.config, self.gradient.clone(), viewport.width, viewport.height);
        let renderer = Renderer::new(gpu, &scene, viewport.width, viewport.height, pixel_ratio);
        let mut frame_ctx = FrameLoopContext::new(self.config.clone(), scene, viewport, InstantTime::new());
        frame_ctx.control = self.control.clone();

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        Ok(RunningScene {
            window,
            renderer,
            frame_ctx,
            page: ScrollPage::new(self.config.section_count()),
            egui_ctx,
            egui_state,
        })
    }
}

fn viewport_of(window: &Window) -> Viewport {
    let scale = window.scale_factor();
    let logical = window.inner_size().to_logical::<f64>(scale);
    Viewport::new(logical.width.round() as u32, logical.height.round() as u32, scale)
}

impl RunningScene {
    fn push_resize(&mut self) {
        let vp = viewport_of(&self.window);
        if vp.width == 0 || vp.height == 0 {
            tracing::debug!("window minimized, keeping previous viewport");
            return;
        }
        self.frame_ctx.queue.push(InputEvent::Resize {
            width: vp.width,
            height: vp.height,
            device_pixel_ratio: vp.device_pixel_ratio,
        });
        let offset = self.page.reclamp(vp.height);
        self.frame_ctx.queue.push(InputEvent::Scroll { offset });
    }

    fn redraw(&mut self) -> bool {
        let RunningScene { window, renderer, frame_ctx, egui_ctx, egui_state, .. } = self;
        frame_ctx.frame_with(renderer, |scene, time, renderer| {
            let raw_input = egui_state.take_egui_input(window);
            let mut output = ui::build_ui(egui_ctx, raw_input, scene, time.delta);
            egui_state.handle_platform_output(window, std::mem::take(&mut output.platform_output));
            renderer.set_overlay(ui::into_overlay(egui_ctx, output));
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.scene.is_some() {
            return;
        }
        match self.create_scene(event_loop) {
            Ok(scene) => {
                tracing::info!("scene running");
                self.scene = Some(scene);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to start scene");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        if window_id != scene.window.id() {
            return;
        }

        // Pointer input over the color panel belongs to egui
        let consumed = scene.egui_state.on_window_event(&scene.window, &event).consumed;

        match event {
            WindowEvent::CloseRequested => {
                self.control.stop();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(KeyCode::Escape), state: ElementState::Pressed, .. },
                ..
            } => {
                self.control.stop();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => scene.push_resize(),
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT_PX,
                    MouseScrollDelta::PixelDelta(pos) => (-pos.y / scene.window.scale_factor()) as f32,
                };
                let height = scene.frame_ctx.viewport.height;
                let offset = scene.page.scroll_by(dy, height);
                scene.frame_ctx.queue.push(InputEvent::Scroll { offset });
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(scene.window.scale_factor());
                scene.frame_ctx.queue.push(InputEvent::PointerMove { client_x: logical.x, client_y: logical.y });
            }
            WindowEvent::RedrawRequested => {
                if !scene.redraw() {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.control.is_stopped() {
            event_loop.exit();
            return;
        }
        if let Some(scene) = &self.scene {
            scene.window.request_redraw();
        }
    }
}

fn load_gradient() -> Result<ToonGradient, SceneError> {
    match std::env::var("SCROLLSCAPE_GRADIENT") {
        Ok(path) => {
            tracing::info!(%path, "loading gradient map");
            ToonGradient::from_encoded(&std::fs::read(path)?)
        }
        Err(_) => Ok(ToonGradient::three_tone()),
    }
}

fn main() {
    logging::init();

    let setup = SceneConfig::from_env().and_then(|config| Ok((config, load_gradient()?)));
    let (config, gradient) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!(error = %e, "failed to create event loop");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, gradient);
    if let Err(e) = event_loop.run_app(&mut app) {
        tracing::error!(error = %e, "event loop terminated with error");
        std::process::exit(1);
    }
    if app.scene.is_none() {
        std::process::exit(1);
    }
}
