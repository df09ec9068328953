// Path: crates/vladiator-telemetry/src/time.rs
use std::time::Instant;

/// A simple RAII timer that reports an elapsed duration to a closure when dropped.
///
/// Used around lock-held spans (`processMessageRequest`) and feature dispatch
/// calls, where the only thing that differs between call sites is which
/// sink method the elapsed seconds get handed to.
pub struct Timer<F: FnMut(f64)> {
    observe: F,
    start: Instant,
}

impl<F: FnMut(f64)> Timer<F> {
    /// Starts a timer that calls `observe` with the elapsed seconds on drop.
    pub fn new(observe: F) -> Self {
        Self {
            observe,
            start: Instant::now(),
        }
    }
}

impl<F: FnMut(f64)> Drop for Timer<F> {
    fn drop(&mut self) {
        (self.observe)(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn timer_reports_on_drop() {
        let reported = Cell::new(false);
        {
            let _timer = Timer::new(|_secs| reported.set(true));
        }
        assert!(reported.get());
    }
}
