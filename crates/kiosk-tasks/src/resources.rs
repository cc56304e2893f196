//! Resource refresh dispatcher.
//!
//! Generated resources (tide graph/table/graphic, wind graph, forecast) are
//! re-rendered by the backend and then re-pointed with a fresh cache-busting
//! suffix. Remote resources (radar, reservation sheets) are only re-pointed.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use kiosk_core::config::{ElementsConfig, MediaElement, TimingConfig};
use kiosk_core::{Category, UnitSystem};
use kiosk_display::{CacheBuster, StatusReporter, Surface};
use kiosk_scheduler::schedule::next_delay;
use kiosk_scheduler::{Schedule, SchedulerHandle};
use tracing::{debug, info, warn};

use crate::backend::{Backend, Regeneration};
use crate::error::RefreshError;
use crate::network::NetworkProbe;

/// Alternates tide units between dispatches: even counts are imperial.
#[derive(Debug, Default)]
pub struct UnitToggle {
    count: AtomicU64,
}

impl UnitToggle {
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> UnitSystem {
        if self.count() % 2 == 0 {
            UnitSystem::Imperial
        } else {
            UnitSystem::Metric
        }
    }

    fn advance(&self) -> u64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }
}

pub struct ResourceDispatcher {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn Surface>,
    status: Arc<StatusReporter>,
    probe: Arc<NetworkProbe>,
    buster: Arc<CacheBuster>,
    scheduler: SchedulerHandle,
    elements: ElementsConfig,
    radar_retry: Schedule,
    /// Set while a radar retry is waiting; later failures ride on it.
    radar_retry_pending: AtomicBool,
    toggle: UnitToggle,
}

impl ResourceDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backend: Arc<dyn Backend>,
        surface: Arc<dyn Surface>,
        status: Arc<StatusReporter>,
        probe: Arc<NetworkProbe>,
        buster: Arc<CacheBuster>,
        scheduler: SchedulerHandle,
        elements: ElementsConfig,
        timing: &TimingConfig,
    ) -> Self {
        Self {
            backend,
            surface,
            status,
            probe,
            buster,
            scheduler,
            elements,
            radar_retry: Schedule::Jittered {
                min_secs: timing.radar_retry_min_secs,
                max_secs: timing.radar_retry_max_secs,
            },
            radar_retry_pending: AtomicBool::new(false),
            toggle: UnitToggle::default(),
        }
    }

    pub fn toggle(&self) -> &UnitToggle {
        &self.toggle
    }

    /// Refresh `category` (every category, in order, for `All`).
    ///
    /// With `units` unset the tide generators take the toggle's current unit,
    /// resolved once for the whole call. Failures are logged and trigger a
    /// network re-probe; they never reach the caller.
    pub async fn dispatch(self: &Arc<Self>, category: Category, units: Option<UnitSystem>) {
        let from_toggle = units.is_none();
        let units = units.unwrap_or_else(|| self.toggle.current());
        debug!(%category, %units, from_toggle, "dispatch");

        for each in category.expand() {
            let outcome = match each {
                Category::Tides => self.refresh_tides(units, from_toggle).await,
                Category::TideGraphic => {
                    self.regenerate_and_swap(
                        Regeneration::TideGraphic,
                        Some(units),
                        &self.elements.tidegraphic,
                    )
                    .await
                }
                Category::WindGraph => {
                    self.regenerate_and_swap(Regeneration::WindGraph, None, &self.elements.windgraph)
                        .await
                }
                Category::Forecast => {
                    self.regenerate_and_swap(Regeneration::Forecast, None, &self.elements.forecast)
                        .await
                }
                Category::Radar => {
                    self.refresh_radar();
                    Ok(())
                }
                Category::Boats => self.refresh_sheet(&self.elements.boats),
                Category::Porch => self.refresh_sheet(&self.elements.porch),
                Category::All => Ok(()),
            };

            match outcome {
                Ok(()) => {}
                Err(RefreshError::Backend(e)) => {
                    warn!(category = %each, "refresh failed: {e}");
                    self.probe.probe().await;
                }
                Err(e) => warn!(category = %each, "refresh not shown: {e}"),
            }
        }
    }

    /// Graph then table with identical units; the table is skipped if the graph fails.
    async fn refresh_tides(&self, units: UnitSystem, from_toggle: bool) -> Result<(), RefreshError> {
        self.regenerate(Regeneration::TideGraph, Some(units)).await?;
        if from_toggle {
            let count = self.toggle.advance();
            debug!(count, next = %self.toggle.current(), "unit toggle advanced");
        }
        self.regenerate(Regeneration::TideTable, Some(units)).await?;
        self.swap(&self.elements.tidegraph)?;
        self.swap(&self.elements.tidetable)?;
        Ok(())
    }

    async fn regenerate_and_swap(
        &self,
        target: Regeneration,
        units: Option<UnitSystem>,
        element: &MediaElement,
    ) -> Result<(), RefreshError> {
        self.regenerate(target, units).await?;
        self.swap(element)?;
        Ok(())
    }

    async fn regenerate(
        &self,
        target: Regeneration,
        units: Option<UnitSystem>,
    ) -> Result<(), RefreshError> {
        let _status = self.status.begin(&format!("Updating {target}"));
        let ack = self.backend.regenerate(target, units).await?;
        info!(%target, units = ?units, ack = %ack.trim(), "regenerated");
        Ok(())
    }

    fn swap(&self, element: &MediaElement) -> Result<(), RefreshError> {
        let url = self.buster.bust(&element.source);
        self.surface.set_source(&element.id, &url)?;
        Ok(())
    }

    /// Re-point the radar loop; if the element is not there yet, try again after a jittered delay.
    ///
    /// At most one retry is pending at a time.
    fn refresh_radar(self: &Arc<Self>) {
        let id = &self.elements.radar.id;
        let result = self
            .surface
            .source(id)
            .and_then(|current| self.surface.set_source(id, &self.buster.rebust(&current)));
        let Err(e) = result else {
            return;
        };
        if self.radar_retry_pending.swap(true, Ordering::SeqCst) {
            debug!(element = %id, "radar not refreshed, retry already pending: {e}");
            return;
        }
        let delay = next_delay(&self.radar_retry);
        warn!(element = %id, ?delay, "radar not refreshed: {e}");
        let me = Arc::clone(self);
        self.scheduler.spawn_after("radar-retry", delay, async move {
            me.radar_retry_pending.store(false, Ordering::SeqCst);
            me.refresh_radar()
        });
    }

    fn refresh_sheet(&self, element: &MediaElement) -> Result<(), RefreshError> {
        let current = self.surface.source(&element.id)?;
        self.surface
            .set_source(&element.id, &self.buster.append_param(&current))?;
        Ok(())
    }
}
