pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::SceneConfig;
pub use error::SceneError;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, HtmlCanvasElement, MouseEvent, Window};

    use crate::controller::clock::PerformanceTime;
    use crate::controller::input::wasm as dom_input;
    use crate::controller::{FrameLoopContext, InputQueue, LoopControl};
    use crate::model::{SceneGraph, ToonGradient};
    use crate::view::{physical_size, GpuContext, Renderer};
    use crate::{logging, ui, SceneConfig, SceneError};

    thread_local! {
        static ACTIVE_LOOP: RefCell<Option<LoopControl>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        let window = web_sys::window().ok_or_else(|| dom_error("no global `window`"))?;
        let document = window.document().ok_or_else(|| dom_error("no document on window"))?;
        let canvas = find_or_create_canvas(&document)?;

        // Fresh particle layout per page load
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
        let config = SceneConfig::default().with_particle_seed(seed);

        let control = setup_app(&window, &canvas, config).await?;
        ACTIVE_LOOP.with(|active| *active.borrow_mut() = Some(control));
        Ok(())
    }

    /// Stop the animation loop; the last drawn frame stays on the canvas
    #[wasm_bindgen]
    pub fn stop() {
        ACTIVE_LOOP.with(|active| {
            if let Some(control) = active.borrow_mut().take() {
                tracing::info!("animation loop stopped");
                control.stop();
            }
        });
    }

    async fn setup_app(window: &Window, canvas: &HtmlCanvasElement, config: SceneConfig) -> Result<LoopControl, SceneError> {
        let viewport = dom_input::viewport_of(window);
        let pixel_ratio = config.pixel_ratio(viewport.device_pixel_ratio);
        let (pw, ph) = physical_size(viewport.width, viewport.height, pixel_ratio);

        let scene = SceneGraph::new(&config, ToonGradient::three_tone(), viewport.width, viewport.height);
        let gpu = GpuContext::from_canvas(canvas, pw, ph).await?;
        let mut renderer = Renderer::new(gpu, &scene, viewport.width, viewport.height, pixel_ratio);
        renderer.attach_canvas(canvas.clone());

        let mut frame_ctx = FrameLoopContext::new(config, scene, viewport, PerformanceTime::new(window));
        let control = frame_ctx.control.clone();

        // Page may already be scrolled when the script loads
        frame_ctx.queue.push(dom_input::scroll_to_input(window));

        let egui_ctx = egui::Context::default();
        let egui_events: Rc<RefCell<Vec<egui::Event>>> = Rc::new(RefCell::new(Vec::new()));
        setup_input_listeners(window, frame_ctx.queue.clone(), egui_events.clone())?;

        let performance = window.performance();
        let f = RcCellCallback::new(window.clone(), move || {
            let now = performance.as_ref().map(|p| p.now()).unwrap_or(0.0);
            frame_ctx.frame_with(&mut renderer, |scene, time, renderer| {
                let (width, height) = renderer.logical_size();
                let mut raw_input = egui::RawInput::default();
                raw_input.time = Some(now / 1000.0);
                raw_input.screen_rect = Some(egui::Rect::from_min_size(
                    egui::Pos2::ZERO,
                    egui::vec2(width as f32, height as f32),
                ));
                raw_input.events.extend(egui_events.borrow_mut().drain(..));
                egui_ctx.set_pixels_per_point(renderer.pixel_ratio() as f32);

                let output = ui::build_ui(&egui_ctx, raw_input, scene, time.delta);
                renderer.set_overlay(ui::into_overlay(&egui_ctx, output));
            })
        });
        f.start();

        tracing::info!("animation loop started");
        Ok(control)
    }

    /// Listeners only enqueue; the frame callback applies the events
    fn setup_input_listeners(
        window: &Window,
        queue: InputQueue,
        egui_events: Rc<RefCell<Vec<egui::Event>>>,
    ) -> Result<(), SceneError> {
        // Scroll
        {
            let queue = queue.clone();
            let window_for_scroll = window.clone();
            let scroll = Closure::wrap(Box::new(move |_e: Event| {
                queue.push(dom_input::scroll_to_input(&window_for_scroll));
            }) as Box<dyn FnMut(Event)>);
            window
                .add_event_listener_with_callback("scroll", scroll.as_ref().unchecked_ref())
                .map_err(js_to_scene_error)?;
            scroll.forget();
        }

        // Mouse move
        {
            let queue = queue.clone();
            let egui_events = egui_events.clone();
            let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
                queue.push(dom_input::mouse_move_to_input(&e));
                egui_events
                    .borrow_mut()
                    .push(egui::Event::PointerMoved(egui::pos2(e.client_x() as f32, e.client_y() as f32)));
            }) as Box<dyn FnMut(MouseEvent)>);
            window
                .add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())
                .map_err(js_to_scene_error)?;
            mm.forget();
        }

        // Mouse buttons, for the color panel only
        for (name, pressed) in [("mousedown", true), ("mouseup", false)] {
            let egui_events = egui_events.clone();
            let button = Closure::wrap(Box::new(move |e: MouseEvent| {
                let button = match e.button() {
                    1 => egui::PointerButton::Middle,
                    2 => egui::PointerButton::Secondary,
                    _ => egui::PointerButton::Primary,
                };
                egui_events.borrow_mut().push(egui::Event::PointerButton {
                    pos: egui::pos2(e.client_x() as f32, e.client_y() as f32),
                    button,
                    pressed,
                    modifiers: egui::Modifiers::default(),
                });
            }) as Box<dyn FnMut(MouseEvent)>);
            window
                .add_event_listener_with_callback(name, button.as_ref().unchecked_ref())
                .map_err(js_to_scene_error)?;
            button.forget();
        }

        // Resize
        {
            let queue = queue.clone();
            let window_for_resize = window.clone();
            let resize = Closure::wrap(Box::new(move |_e: Event| {
                queue.push(dom_input::resize_to_input(&window_for_resize));
            }) as Box<dyn FnMut(Event)>);
            window
                .add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())
                .map_err(js_to_scene_error)?;
            resize.forget();
        }

        Ok(())
    }

    /// Use the page's `canvas.webgl` if it has one, otherwise append a canvas to `<body>`
    fn find_or_create_canvas(document: &Document) -> Result<HtmlCanvasElement, JsValue> {
        if let Some(existing) = document.query_selector("canvas.webgl")? {
            return existing
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| dom_error("canvas.webgl is not a canvas"));
        }

        let body = document.body().ok_or_else(|| dom_error("no body on document"))?;
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| dom_error("failed to create canvas"))?;
        canvas.set_class_name("webgl");
        body.append_child(&canvas)?;
        Ok(canvas)
    }

    fn dom_error(msg: &str) -> JsValue {
        SceneError::Dom(msg.to_string()).into()
    }

    fn js_to_scene_error(err: JsValue) -> SceneError {
        SceneError::Dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
    }

    /// requestAnimationFrame chain that ends once the frame callback returns false
    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut() -> bool>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() -> bool + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                if !inner.borrow_mut().as_mut()() {
                    return;
                }

                // Schedule the next frame from inside this one
                let cb_ref = callback_clone.borrow();
                if let Some(cb) = cb_ref.as_ref() {
                    if let Err(err) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!(?err, "requestAnimationFrame failed; loop halted");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(err) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!(?err, "requestAnimationFrame failed; loop not started");
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{start, stop};
