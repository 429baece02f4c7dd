// Small helpers shared by the demo binary and benchmarks
use std::time::Instant;

/// Utility struct for quick wall-clock timing of conversion passes.
pub struct TickTimer {
    last: Instant,
}

impl TickTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Milliseconds elapsed since construction or the previous tick.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let milis = now.duration_since(self.last).as_secs_f64() * 1e3;
        self.last = now;
        milis
    }

    pub fn tick_print(&mut self, msg: &str) -> f64 {
        let milis = self.tick();
        println!("{}: {}", msg, milis);
        milis
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new()
    }
}
