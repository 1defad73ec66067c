//! Debounced resize scheduling.
//!
//! Host resize events arrive in bursts (window drags fire continuously,
//! orientation changes fire several related events over a few hundred
//! milliseconds). Instead of rebuilding surfaces on every event, each
//! notification moves a single deadline forward; the refresh runs once the
//! deadline passes with no further events. A new event always cancels and
//! reschedules, so only the final geometry of a burst is ever acted on.

use web_time::{Duration, Instant};

use crate::constants::{ORIENTATION_SETTLE_MS, RESIZE_DEBOUNCE_MS};

/// What triggered a resize notification. Orientation changes settle more
/// slowly than window resizes, so they get a longer quiet period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeKind {
    /// Window or container resize, including browser-zoom changes.
    Window,
    /// Device orientation change.
    Orientation,
    /// Visual viewport change (pinch zoom, on-screen keyboard).
    VisualViewport,
}

impl ResizeKind {
    fn quiet_period(self) -> Duration {
        match self {
            ResizeKind::Orientation => {
                Duration::from_millis(RESIZE_DEBOUNCE_MS + ORIENTATION_SETTLE_MS)
            }
            ResizeKind::Window | ResizeKind::VisualViewport => {
                Duration::from_millis(RESIZE_DEBOUNCE_MS)
            }
        }
    }
}

/// Collapses bursts of resize events into a single deferred refresh.
#[derive(Debug, Clone, Default)]
pub struct ResizeCoordinator {
    deadline: Option<Instant>,
}

impl ResizeCoordinator {
    pub fn new() -> Self {
        Self { deadline: None }
    }

    /// Record a resize event, replacing any pending deadline.
    pub fn schedule(&mut self, kind: ResizeKind, now: Instant) {
        let deadline = now + kind.quiet_period();
        if self.deadline.is_some() {
            log::trace!("resize: rescheduling pending refresh ({kind:?})");
        }
        self.deadline = Some(deadline);
    }

    /// Returns true exactly once per burst, when the quiet period has
    /// elapsed. The caller performs the refresh.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop any pending refresh without running it.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut coordinator = ResizeCoordinator::new();
        coordinator.schedule(ResizeKind::Window, t0);

        assert!(!coordinator.poll(t0 + Duration::from_millis(50)));
        assert!(coordinator.poll(t0 + Duration::from_millis(RESIZE_DEBOUNCE_MS + 1)));
        // One refresh per burst.
        assert!(!coordinator.poll(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_burst_collapses_to_final_deadline() {
        let t0 = Instant::now();
        let mut coordinator = ResizeCoordinator::new();
        for i in 0..10 {
            coordinator.schedule(ResizeKind::Window, t0 + Duration::from_millis(i * 30));
        }

        // 100ms after the first event, but within 100ms of the last.
        assert!(!coordinator.poll(t0 + Duration::from_millis(RESIZE_DEBOUNCE_MS + 1)));
        assert!(coordinator.poll(t0 + Duration::from_millis(9 * 30 + RESIZE_DEBOUNCE_MS + 1)));
    }

    #[test]
    fn test_orientation_waits_longer() {
        let t0 = Instant::now();
        let mut coordinator = ResizeCoordinator::new();
        coordinator.schedule(ResizeKind::Orientation, t0);

        assert!(!coordinator.poll(t0 + Duration::from_millis(RESIZE_DEBOUNCE_MS + 1)));
        assert!(coordinator.poll(
            t0 + Duration::from_millis(RESIZE_DEBOUNCE_MS + ORIENTATION_SETTLE_MS + 1)
        ));
    }

    #[test]
    fn test_cancel_drops_pending() {
        let t0 = Instant::now();
        let mut coordinator = ResizeCoordinator::new();
        coordinator.schedule(ResizeKind::VisualViewport, t0);
        assert!(coordinator.is_pending());

        coordinator.cancel();
        assert!(!coordinator.is_pending());
        assert!(!coordinator.poll(t0 + Duration::from_secs(10)));
    }
}
