/// Anything that can report a timestamp in seconds
pub trait TimeSource {
    fn now_seconds(&self) -> f64;
}

/// Elapsed time since the clock started and the time since the previous tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub elapsed: f32,
    pub delta: f32,
}

/// Single source of animation phase.
///
/// `delta` is derived from consecutive elapsed samples rather than measured
/// separately, so deltas always sum to the latest elapsed time.
pub struct FrameClock<S: TimeSource> {
    source: S,
    start: f64,
    elapsed: f64,
    previous_time: f64,
}

impl<S: TimeSource> FrameClock<S> {
    pub fn new(source: S) -> Self {
        let start = source.now_seconds();
        Self { source, start, elapsed: 0.0, previous_time: 0.0 }
    }

    pub fn tick(&mut self) -> FrameTime {
        // a source stepping backwards counts as no time passing
        self.elapsed = (self.source.now_seconds() - self.start).max(self.elapsed);
        let delta = self.elapsed - self.previous_time;
        self.previous_time = self.elapsed;
        FrameTime { elapsed: self.elapsed as f32, delta: delta as f32 }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// Browser high-resolution clock
#[cfg(target_arch = "wasm32")]
pub struct PerformanceTime {
    performance: Option<web_sys::Performance>,
}

#[cfg(target_arch = "wasm32")]
impl PerformanceTime {
    pub fn new(window: &web_sys::Window) -> Self {
        Self { performance: window.performance() }
    }
}

#[cfg(target_arch = "wasm32")]
impl TimeSource for PerformanceTime {
    fn now_seconds(&self) -> f64 {
        self.performance.as_ref().map(|p| p.now() / 1000.0).unwrap_or(0.0)
    }
}

/// Monotonic native clock
#[cfg(not(target_arch = "wasm32"))]
pub struct InstantTime {
    origin: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl InstantTime {
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TimeSource for InstantTime {
    fn now_seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for tests and offline rendering
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: std::rc::Rc<std::cell::Cell<f64>>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl TimeSource for ManualTime {
    fn now_seconds(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_delta_equals_elapsed() {
        let time = ManualTime::new();
        time.set(10.0);
        let mut clock = FrameClock::new(time.clone());
        time.advance(0.25);
        let t = clock.tick();
        assert_eq!(t.elapsed, 0.25);
        assert_eq!(t.delta, 0.25);
    }

    #[test]
    fn test_deltas_sum_to_elapsed() {
        let time = ManualTime::new();
        let mut clock = FrameClock::new(time.clone());
        let mut sum = 0.0f32;
        for step in [0.016, 0.017, 0.1, 0.0, 0.033] {
            time.advance(step);
            sum += clock.tick().delta;
        }
        let last = clock.elapsed() as f32;
        assert!((sum - last).abs() < 1e-5);
        assert!((last - 0.166).abs() < 1e-5);
    }

    #[test]
    fn test_backwards_source_is_monotonic() {
        let time = ManualTime::new();
        let mut clock = FrameClock::new(time.clone());
        time.set(1.0);
        clock.tick();
        time.set(0.5);
        let t = clock.tick();
        assert_eq!(t.elapsed, 1.0);
        assert_eq!(t.delta, 0.0);
    }

    #[test]
    fn test_resampling_same_instant_keeps_elapsed() {
        let time = ManualTime::new();
        let mut clock = FrameClock::new(time.clone());
        time.set(3.0);
        let a = clock.tick();
        let b = clock.tick();
        assert_eq!(a.elapsed, b.elapsed);
        assert_eq!(b.delta, 0.0);
    }
}
