//! Adaptive page-size controller
//!
//! Probes the requested page size upward until the server stops filling
//! pages, then locks onto the discovered ceiling. This is a heuristic, not a
//! protocol guarantee: a short page is read as "server-capped", which can be
//! wrong if the service applies unrelated per-request limits while more data
//! remains.

use tracing::debug;

/// Tracks the requested page size and the discovered maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSizeController {
    size: usize,
    max: usize,
}

impl BatchSizeController {
    /// Create a controller with an initial size and a configured ceiling
    pub fn new(initial_size: usize, max_size: usize) -> Self {
        Self {
            size: initial_size.max(1),
            max: max_size.max(initial_size.max(1)),
        }
    }

    /// The page size the next request should ask for
    pub fn size(&self) -> usize {
        self.size
    }

    /// The discovered (or configured) maximum page size
    pub fn max(&self) -> usize {
        self.max
    }

    /// Update from the raw received count of the last page.
    ///
    /// A full page doubles the request, unless doubling would pass the
    /// ceiling, in which case the current size is taken as the server's
    /// true maximum. A short page collapses both size and maximum to the
    /// received count. An empty page is the driver's exhaustion signal and
    /// leaves the controller untouched.
    pub fn observe(&mut self, received: usize) {
        if received == 0 {
            return;
        }

        if received == self.size {
            let doubled = self.size * 2;
            if doubled > self.max {
                self.max = self.size;
                debug!("actual maximum batch size discovered: {}", self.max);
            } else {
                self.size = doubled;
            }
        } else if received < self.size {
            self.max = received;
            self.size = received;
            debug!("actual maximum batch size discovered: {}", self.max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(100, 500, 100 => (200, 500); "full page doubles")]
    #[test_case(200, 500, 200 => (400, 500); "keeps doubling under ceiling")]
    #[test_case(400, 500, 400 => (400, 400); "doubling past ceiling locks current size")]
    #[test_case(100, 500, 60 => (60, 60); "short page collapses to received count")]
    #[test_case(500, 500, 500 => (500, 500); "at ceiling stays put")]
    #[test_case(100, 500, 0 => (100, 500); "empty page leaves state untouched")]
    fn observe_cases(initial: usize, max: usize, received: usize) -> (usize, usize) {
        let mut controller = BatchSizeController::new(initial, max);
        controller.observe(received);
        (controller.size(), controller.max())
    }

    #[test]
    fn test_probe_then_lock_sequence() {
        // 100 -> 200 -> 400, then a short page of 350 locks the ceiling there
        let mut controller = BatchSizeController::new(100, 500);
        controller.observe(100);
        controller.observe(200);
        assert_eq!(controller.size(), 400);

        controller.observe(350);
        assert_eq!(controller.size(), 350);
        assert_eq!(controller.max(), 350);

        // full pages at the locked ceiling never grow past it
        controller.observe(350);
        assert_eq!(controller.size(), 350);
        assert_eq!(controller.max(), 350);
    }

    #[test]
    fn test_size_never_exceeds_discovered_max() {
        let mut controller = BatchSizeController::new(64, 1000);
        for received in [64, 128, 256, 512] {
            controller.observe(received);
            assert!(controller.size() <= controller.max());
        }
    }

    #[test]
    fn test_degenerate_sizes_are_clamped() {
        let controller = BatchSizeController::new(0, 0);
        assert_eq!(controller.size(), 1);
        assert!(controller.max() >= 1);
    }
}
