use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::surface::Surface;

/// Transient "working on it" indicator shown while requests are in flight.
///
/// Each in-flight step holds a [`StatusGuard`]; the badge shows the most
/// recent active label and hides once the last guard drops.
pub struct StatusReporter {
    surface: Arc<dyn Surface>,
    element: String,
    active: Mutex<Vec<(u64, String)>>,
    next_id: AtomicU64,
}

impl StatusReporter {
    pub fn new(surface: Arc<dyn Surface>, element: &str) -> Self {
        Self {
            surface,
            element: element.to_string(),
            active: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Show `label` until the returned guard is dropped.
    pub fn begin(&self, label: &str) -> StatusGuard<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.push((id, label.to_string()));
        self.render(&active);
        drop(active);
        debug!(%label, "status shown");
        StatusGuard { reporter: self, id }
    }

    /// Labels currently shown, oldest first.
    pub fn active(&self) -> Vec<String> {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, label)| label.clone())
            .collect()
    }

    fn finish(&self, id: u64) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.retain(|(entry, _)| *entry != id);
        self.render(&active);
    }

    /// Called with the `active` lock held so a stale render cannot land after a newer one.
    fn render(&self, active: &[(u64, String)]) {
        let result = match active.last() {
            Some((_, label)) => self
                .surface
                .set_text(&self.element, label)
                .and_then(|_| self.surface.set_visible(&self.element, true)),
            None => self.surface.set_visible(&self.element, false),
        };
        if let Err(e) = result {
            warn!(element = %self.element, "status badge not updated: {e}");
        }
    }
}

/// Clears its status label on drop.
pub struct StatusGuard<'a> {
    reporter: &'a StatusReporter,
    id: u64,
}

impl Drop for StatusGuard<'_> {
    fn drop(&mut self) {
        self.reporter.finish(self.id);
    }
}
