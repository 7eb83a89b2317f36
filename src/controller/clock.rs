/// Monotonic time source for the frame loop
pub trait Clock {
    /// Seconds since the clock started
    fn elapsed_time(&mut self) -> f64;
}

/// Wall clock for native builds
#[cfg(not(target_arch = "wasm32"))]
pub struct InstantClock {
    start: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl InstantClock {
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for InstantClock {
    fn elapsed_time(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// `performance.now()` based clock for the browser
#[cfg(target_arch = "wasm32")]
pub struct PerformanceClock {
    performance: Option<web_sys::Performance>,
    start_ms: f64,
}

#[cfg(target_arch = "wasm32")]
impl PerformanceClock {
    pub fn new(window: &web_sys::Window) -> Self {
        let performance = window.performance();
        let start_ms = performance.as_ref().map(|p| p.now()).unwrap_or(0.0);
        Self { performance, start_ms }
    }
}

#[cfg(target_arch = "wasm32")]
impl Clock for PerformanceClock {
    fn elapsed_time(&mut self) -> f64 {
        let now = self.performance.as_ref().map(|p| p.now()).unwrap_or(self.start_ms);
        (now - self.start_ms) / 1000.0
    }
}

/// Deterministic clock that advances a fixed amount per reading
pub struct SteppedClock {
    now: f64,
    pub step: f64,
}

impl SteppedClock {
    pub fn new(step: f64) -> Self {
        Self { now: 0.0, step }
    }

    /// Move time by an arbitrary amount before the next reading
    pub fn advance(&mut self, seconds: f64) {
        self.now += seconds;
    }
}

impl Clock for SteppedClock {
    fn elapsed_time(&mut self) -> f64 {
        self.now += self.step;
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_clock_advances_per_reading() {
        let mut clock = SteppedClock::new(0.5);
        assert_eq!(clock.elapsed_time(), 0.5);
        clock.advance(2.0);
        assert_eq!(clock.elapsed_time(), 3.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn instant_clock_is_monotonic() {
        let mut clock = InstantClock::new();
        let a = clock.elapsed_time();
        let b = clock.elapsed_time();
        assert!(b >= a);
    }
}
