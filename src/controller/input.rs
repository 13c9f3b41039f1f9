//! Platform-agnostic input handling
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Platform-independent input events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Absolute page scroll offset in CSS px
    Scroll { offset: f32 },
    /// Pointer position relative to the viewport's top-left corner
    PointerMove { client_x: f32, client_y: f32 },
    Resize { width: u32, height: u32, device_pixel_ratio: f64 },
}

/// How raw pointer coordinates are divided down to `[-0.5, 0.5]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMapping {
    /// x by viewport width, y by viewport height
    #[default]
    Axis,
    /// x by viewport height, y by viewport width
    Swapped,
}

/// Logical viewport size plus the device pixel ratio it was measured at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f64) -> Self {
        Self { width, height, device_pixel_ratio }
    }
}

/// Latest scroll offset and normalized cursor position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub scroll_y: f32,
    pub cursor_x: f32,
    pub cursor_y: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the page scroll offset as-is
    pub fn on_scroll(&mut self, offset: f32) {
        self.scroll_y = offset;
    }

    /// Normalize pointer coordinates; positions outside the viewport are not clamped
    pub fn on_pointer_move(&mut self, client_x: f32, client_y: f32, viewport: &Viewport, mapping: CursorMapping) {
        let (x, y) = normalize_cursor(client_x, client_y, viewport, mapping);
        self.cursor_x = x;
        self.cursor_y = y;
    }

    /// Apply one event. Resize is not cursor or scroll state and is ignored here.
    pub fn process_event(&mut self, event: &InputEvent, viewport: &Viewport, mapping: CursorMapping) {
        match *event {
            InputEvent::Scroll { offset } => self.on_scroll(offset),
            InputEvent::PointerMove { client_x, client_y } => {
                self.on_pointer_move(client_x, client_y, viewport, mapping)
            }
            InputEvent::Resize { .. } => {}
        }
    }
}

pub fn normalize_cursor(client_x: f32, client_y: f32, viewport: &Viewport, mapping: CursorMapping) -> (f32, f32) {
    let w = viewport.width.max(1) as f32;
    let h = viewport.height.max(1) as f32;
    let (x_div, y_div) = match mapping {
        CursorMapping::Axis => (w, h),
        CursorMapping::Swapped => (h, w),
    };
    (client_x / x_div - 0.5, client_y / y_div - 0.5)
}

/// Events pushed by host callbacks, drained once per frame
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: Rc<RefCell<VecDeque<InputEvent>>>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: InputEvent) {
        self.events.borrow_mut().push_back(event);
    }

    pub fn drain(&self) -> Vec<InputEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

/// Native stand-in for a browser page: one viewport-tall section per mesh.
///
/// Wheel input moves the offset and it is clamped to the scrollable range
/// the way a browser clamps `window.scrollY`.
#[derive(Debug, Clone, Copy)]
pub struct ScrollPage {
    pub offset: f32,
    sections: usize,
}

impl ScrollPage {
    pub fn new(sections: usize) -> Self {
        Self { offset: 0.0, sections }
    }

    pub fn max_offset(&self, viewport_height: u32) -> f32 {
        self.sections.saturating_sub(1) as f32 * viewport_height as f32
    }

    /// Scroll by `delta` px and return the new offset
    pub fn scroll_by(&mut self, delta: f32, viewport_height: u32) -> f32 {
        self.offset = (self.offset + delta).clamp(0.0, self.max_offset(viewport_height));
        self.offset
    }

    /// Keep the offset inside the page after the viewport shrinks or grows.
    /// A zero height (minimized window) leaves the offset untouched.
    pub fn reclamp(&mut self, viewport_height: u32) -> f32 {
        if viewport_height == 0 {
            return self.offset;
        }
        self.scroll_by(0.0, viewport_height)
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{MouseEvent, Window};

    pub fn scroll_to_input(window: &Window) -> InputEvent {
        InputEvent::Scroll { offset: window.scroll_y().unwrap_or(0.0) as f32 }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerMove { client_x: e.client_x() as f32, client_y: e.client_y() as f32 }
    }

    pub fn viewport_of(window: &Window) -> Viewport {
        let width = window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(800.0);
        let height = window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(600.0);
        Viewport::new(width as u32, height as u32, window.device_pixel_ratio())
    }

    pub fn resize_to_input(window: &Window) -> InputEvent {
        let vp = viewport_of(window);
        InputEvent::Resize { width: vp.width, height: vp.height, device_pixel_ratio: vp.device_pixel_ratio }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-6 && (a.1 - b.1).abs() < 1e-6
    }

    #[test]
    fn test_scroll_passes_through_unvalidated() {
        let mut input = InputState::new();
        input.on_scroll(-40.0);
        assert_eq!(input.scroll_y, -40.0);
        input.on_scroll(1.0e7);
        assert_eq!(input.scroll_y, 1.0e7);
    }

    #[test]
    fn test_cursor_center_and_corner_square_viewport() {
        let vp = Viewport::new(600, 600, 1.0);
        for mapping in [CursorMapping::Axis, CursorMapping::Swapped] {
            assert!(close(normalize_cursor(300.0, 300.0, &vp, mapping), (0.0, 0.0)));
            assert!(close(normalize_cursor(0.0, 0.0, &vp, mapping), (-0.5, -0.5)));
        }
    }

    #[test]
    fn test_cursor_mappings_differ_on_wide_viewport() {
        let vp = Viewport::new(1000, 500, 1.0);
        // bottom-right corner
        assert!(close(normalize_cursor(1000.0, 500.0, &vp, CursorMapping::Axis), (0.5, 0.5)));
        assert!(close(normalize_cursor(1000.0, 500.0, &vp, CursorMapping::Swapped), (1.5, 0.0)));
    }

    #[test]
    fn test_cursor_not_clamped_outside_viewport() {
        let vp = Viewport::new(800, 600, 1.0);
        let (x, y) = normalize_cursor(880.0, -60.0, &vp, CursorMapping::Axis);
        assert!((x - 0.6).abs() < 1e-6);
        assert!((y + 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_queue_latest_event_wins() {
        let queue = InputQueue::new();
        let vp = Viewport::new(800, 800, 1.0);
        queue.push(InputEvent::Scroll { offset: 100.0 });
        queue.push(InputEvent::PointerMove { client_x: 0.0, client_y: 0.0 });
        queue.push(InputEvent::Scroll { offset: 250.0 });
        assert_eq!(queue.len(), 3);

        let mut input = InputState::new();
        for event in queue.drain() {
            input.process_event(&event, &vp, CursorMapping::Axis);
        }
        assert!(queue.is_empty());
        assert_eq!(input.scroll_y, 250.0);
        assert_eq!((input.cursor_x, input.cursor_y), (-0.5, -0.5));
    }

    #[test]
    fn test_queue_clones_share_storage() {
        let queue = InputQueue::new();
        let writer = queue.clone();
        writer.push(InputEvent::Scroll { offset: 1.0 });
        assert_eq!(queue.drain(), vec![InputEvent::Scroll { offset: 1.0 }]);
    }

    #[test]
    fn test_scroll_page_clamps_to_sections() {
        let mut page = ScrollPage::new(3);
        assert_eq!(page.scroll_by(-50.0, 800), 0.0);
        assert_eq!(page.scroll_by(900.0, 800), 900.0);
        assert_eq!(page.scroll_by(5000.0, 800), 1600.0);
        // shrinking the window pulls the offset back into range
        assert_eq!(page.reclamp(400), 800.0);
    }

    #[test]
    fn test_scroll_page_survives_minimize() {
        let mut page = ScrollPage::new(3);
        page.scroll_by(1200.0, 800);
        assert_eq!(page.reclamp(0), 1200.0);
        assert_eq!(page.reclamp(800), 1200.0);
    }
}
