use std::sync::Arc;

use chrono::NaiveDateTime;
use kiosk_display::Surface;
use kiosk_scheduler::schedule::next_second_boundary;
use kiosk_scheduler::WallClock;
use tokio::time::Instant;
use tracing::warn;

/// en-US wall clock, e.g. `5:07:03 PM`.
pub fn clock_text(now: NaiveDateTime) -> String {
    now.format("%-I:%M:%S %p").to_string()
}

/// Writes the wall-clock time into the clock element on every whole second.
pub struct ClockTicker {
    surface: Arc<dyn Surface>,
    clock: Arc<dyn WallClock>,
    element: String,
}

impl ClockTicker {
    pub fn new(surface: Arc<dyn Surface>, clock: Arc<dyn WallClock>, element: &str) -> Self {
        Self {
            surface,
            clock,
            element: element.to_string(),
        }
    }

    pub fn tick(&self) {
        let text = clock_text(self.clock.now());
        if let Err(e) = self.surface.set_text(&self.element, &text) {
            warn!(element = %self.element, "clock not updated: {e}");
        }
    }

    /// Tick forever, re-aligning to the start instant each time so drift never accumulates.
    pub async fn run(&self) {
        let start = Instant::now();
        loop {
            tokio::time::sleep_until(next_second_boundary(start, Instant::now())).await;
            self.tick();
        }
    }
}
