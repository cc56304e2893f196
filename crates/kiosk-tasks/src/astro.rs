//! Fetch-astro task and the population routine that drives it.

use std::sync::Arc;

use chrono::NaiveDate;
use futures_util::future::join_all;
use kiosk_core::ephemeris::AstroRecord;
use kiosk_core::RelativeDay;
use kiosk_display::StatusReporter;
use kiosk_scheduler::WallClock;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::store::{DayStore, Slot};

/// Sole writer of the astro store.
pub struct AstroService {
    backend: Arc<dyn Backend>,
    store: Arc<DayStore<AstroRecord>>,
    status: Arc<StatusReporter>,
    clock: Arc<dyn WallClock>,
    anchor_override: Option<NaiveDate>,
}

impl AstroService {
    pub fn new(
        backend: Arc<dyn Backend>,
        status: Arc<StatusReporter>,
        clock: Arc<dyn WallClock>,
        anchor_override: Option<NaiveDate>,
    ) -> Self {
        Self {
            backend,
            store: Arc::new(DayStore::new("astro")),
            status,
            clock,
            anchor_override,
        }
    }

    pub fn store(&self) -> &Arc<DayStore<AstroRecord>> {
        &self.store
    }

    /// The date "today" refers to: the override if one was given, else the wall clock.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor_override.unwrap_or_else(|| self.clock.now().date())
    }

    /// Fetch one relative day into its slot. No-op once the store is complete.
    pub async fn fetch_day(&self, day: RelativeDay) {
        if self.store.is_complete() {
            debug!(%day, "astro store complete, skipping fetch");
            return;
        }
        let date = day.date_from(self.anchor());
        let _status = self.status.begin(&format!("Loading {day}'s sun & moon data"));

        let slot = match self.backend.ephemeris(date).await {
            Ok(mut record) => match record.validate() {
                Ok(()) => {
                    record.requested_date = Some(date);
                    Slot::Ready(record)
                }
                Err(e) => {
                    warn!(%day, %date, "ephemeris record rejected: {e}");
                    Slot::Failed(e.to_string())
                }
            },
            Err(e) => {
                warn!(%day, %date, backend = self.backend.name(), "ephemeris fetch failed: {e}");
                Slot::Failed(e.to_string())
            }
        };

        let ready = slot.is_ready();
        if !self.store.record(day, slot) {
            debug!(%day, "late ephemeris response discarded");
        } else if ready {
            info!(%day, %date, complete = self.store.is_complete(), "ephemeris stored");
        }
    }

    /// Fetch every slot that is not yet ready, concurrently, and wait for all of them.
    pub async fn populate(&self) {
        let missing = self.store.missing();
        if missing.is_empty() {
            return;
        }
        debug!(?missing, "populating astro store");
        join_all(missing.into_iter().map(|day| self.fetch_day(day))).await;
    }
}
