// CONTROLLER: Input, timing, and update loop
pub mod clock;
pub mod frame_loop;
pub mod input;

pub use clock::{FrameClock, FrameTime, ManualTime, TimeSource};
pub use frame_loop::{FrameLoopContext, LoopControl, RenderDelegate};
pub use input::{CursorMapping, InputEvent, InputQueue, InputState, ScrollPage, Viewport};
