//! Panel rotation state machine.
//!
//! The rotation set is fixed at initialization from the day of week: the
//! reservation panel is only part of the cycle Thursday through Sunday. Each
//! tick flags the incoming panel `entering` and the outgoing one `exiting`,
//! updates the title, and clears the outgoing panel's flags once the
//! transition has had time to play.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use kiosk_core::config::PanelsConfig;
use kiosk_display::model::TITLE_ATTRIBUTE;
use kiosk_display::Surface;
use kiosk_scheduler::SchedulerHandle;
use serde::Serialize;
use tracing::{debug, info, warn};

pub const ENTERING: &str = "entering";
pub const EXITING: &str = "exiting";

/// How ticks behave, from the `pin` debug override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    Cycle,
    /// Stay on this panel.
    Pinned(usize),
    /// Never tick.
    Halted,
}

impl RotationMode {
    pub fn from_pin(pin: Option<i64>) -> Self {
        match pin {
            None => RotationMode::Cycle,
            Some(n) if n < 0 => RotationMode::Halted,
            Some(n) => RotationMode::Pinned(n as usize),
        }
    }
}

/// Number of panels in rotation on `weekday`.
pub fn panel_count_for(weekday: Weekday) -> usize {
    match weekday {
        Weekday::Thu | Weekday::Fri | Weekday::Sat | Weekday::Sun => 3,
        Weekday::Mon | Weekday::Tue | Weekday::Wed => 2,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelState {
    pub panels: Vec<String>,
    pub current: usize,
    pub transition: Duration,
}

pub struct PanelRotation {
    surface: Arc<dyn Surface>,
    scheduler: SchedulerHandle,
    config: PanelsConfig,
    title_element: String,
    mode: RotationMode,
    state: Mutex<Option<PanelState>>,
}

impl PanelRotation {
    pub fn new(
        surface: Arc<dyn Surface>,
        scheduler: SchedulerHandle,
        config: PanelsConfig,
        title_element: &str,
    ) -> Self {
        let mode = RotationMode::from_pin(config.pin);
        Self {
            surface,
            scheduler,
            config,
            title_element: title_element.to_string(),
            mode,
            state: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> RotationMode {
        self.mode
    }

    pub fn state(&self) -> Option<PanelState> {
        self.lock().clone()
    }

    /// Fix the panel set for this process and set up the reservation sub-view.
    pub fn initialize(&self, now: NaiveDateTime) -> PanelState {
        let count = panel_count_for(now.weekday()).min(self.config.panels.len());
        let panels: Vec<String> = self.config.panels[..count]
            .iter()
            .map(|p| p.id.clone())
            .collect();

        let current = match self.mode {
            RotationMode::Pinned(n) if n < count => n,
            RotationMode::Pinned(n) => {
                warn!(pin = n, count, "pinned panel out of range, showing the first");
                0
            }
            _ => 0,
        };

        let transition = panels
            .first()
            .and_then(|id| self.surface.transition_duration(id).ok())
            .unwrap_or(Duration::from_millis(self.config.transition_ms));

        if count >= 3 {
            let tomorrow = now.hour() >= self.config.tomorrow_after_hour;
            self.show(&self.config.reservations_today, !tomorrow);
            self.show(&self.config.reservations_tomorrow, tomorrow);
        }

        if let Some(id) = panels.get(current) {
            self.show_title(id);
        }

        let state = PanelState {
            panels,
            current,
            transition,
        };
        info!(
            weekday = %now.weekday(),
            panels = state.panels.len(),
            mode = ?self.mode,
            "panel rotation initialized"
        );
        *self.lock() = Some(state.clone());
        state
    }

    /// Advance to the next panel. Returns the new current index, or `None`
    /// when rotation is pinned, halted or not initialized.
    pub fn tick(&self) -> Option<usize> {
        if self.mode != RotationMode::Cycle {
            return None;
        }
        let (exiting, entering, next, transition) = {
            let mut guard = self.lock();
            let state = guard.as_mut()?;
            let n = state.panels.len();
            if n < 2 {
                return None;
            }
            let next = (state.current + 1) % n;
            let exiting = state.panels[state.current].clone();
            state.current = next;
            (exiting, state.panels[next].clone(), next, state.transition)
        };

        self.flag(&entering, ENTERING);
        self.flag(&exiting, EXITING);
        self.show_title(&entering);
        debug!(%entering, %exiting, "panel transition");

        let surface = Arc::clone(&self.surface);
        self.scheduler
            .spawn_after("panel-transition", transition, async move {
                for class in [ENTERING, EXITING] {
                    if let Err(e) = surface.remove_class(&exiting, class) {
                        warn!(panel = %exiting, "transition flag not cleared: {e}");
                    }
                }
            });
        Some(next)
    }

    fn show_title(&self, panel: &str) {
        match self.surface.attribute(panel, TITLE_ATTRIBUTE) {
            Ok(Some(title)) => {
                if let Err(e) = self.surface.set_text(&self.title_element, &title) {
                    warn!(element = %self.title_element, "title not updated: {e}");
                }
            }
            Ok(None) => debug!(%panel, "panel has no title"),
            Err(e) => warn!(%panel, "panel title unavailable: {e}"),
        }
    }

    fn flag(&self, panel: &str, class: &str) {
        if let Err(e) = self.surface.add_class(panel, class) {
            warn!(%panel, class, "transition flag not set: {e}");
        }
    }

    fn show(&self, id: &str, visible: bool) {
        if let Err(e) = self.surface.set_visible(id, visible) {
            warn!(element = %id, "visibility not updated: {e}");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PanelState>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
