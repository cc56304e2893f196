use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use kiosk_core::config::KioskConfig;
use kiosk_core::ephemeris::AstroRecord;
use kiosk_core::Category;
use kiosk_display::{CacheBuster, StatusReporter, Surface};
use kiosk_scheduler::retry::RetryPolicy;
use kiosk_scheduler::{Schedule, SchedulerHandle, WallClock};
use tracing::{info, warn};

use crate::astro::AstroService;
use crate::backend::{Backend, MoonImageRecord};
use crate::lunar::LunarBuilder;
use crate::network::NetworkProbe;
use crate::panels::PanelRotation;
use crate::presenter::Presenter;
use crate::resources::ResourceDispatcher;
use crate::store::DayStore;
use crate::ticker::ClockTicker;

/// Every kiosk routine, wired together.
pub struct Kiosk {
    config: KioskConfig,
    scheduler: SchedulerHandle,
    clock: Arc<dyn WallClock>,
    astro: Arc<AstroService>,
    lunar: Arc<LunarBuilder>,
    dispatcher: Arc<ResourceDispatcher>,
    presenter: Arc<Presenter>,
    rotation: Arc<PanelRotation>,
    probe: Arc<NetworkProbe>,
    ticker: Arc<ClockTicker>,
}

impl Kiosk {
    pub fn new(
        config: KioskConfig,
        backend: Arc<dyn Backend>,
        surface: Arc<dyn Surface>,
        clock: Arc<dyn WallClock>,
        scheduler: SchedulerHandle,
        anchor_override: Option<NaiveDate>,
    ) -> Self {
        let elements = &config.elements;
        let timing = &config.timing;
        let status = Arc::new(StatusReporter::new(Arc::clone(&surface), &elements.status));
        let buster = Arc::new(CacheBuster::new());

        let astro = Arc::new(AstroService::new(
            Arc::clone(&backend),
            Arc::clone(&status),
            Arc::clone(&clock),
            anchor_override,
        ));
        let lunar = Arc::new(LunarBuilder::new(
            Arc::clone(&backend),
            Arc::clone(astro.store()),
            Arc::new(DayStore::new("moon")),
            Arc::clone(&surface),
            Arc::clone(&status),
            Arc::clone(&buster),
            &elements.moon_prefix,
            RetryPolicy::forever(Duration::from_secs(timing.astro_poll_secs)),
        ));
        let probe = Arc::new(NetworkProbe::new(
            Arc::clone(&backend),
            Arc::clone(&surface),
            &elements.network,
            &config.backend,
        ));
        let dispatcher = Arc::new(ResourceDispatcher::new(
            Arc::clone(&backend),
            Arc::clone(&surface),
            Arc::clone(&status),
            Arc::clone(&probe),
            buster,
            scheduler.clone(),
            elements.clone(),
            timing,
        ));
        let presenter = Arc::new(Presenter::new(
            Arc::clone(&astro),
            Arc::clone(&surface),
            Arc::clone(&clock),
            &elements.suncondition,
            RetryPolicy::forever(Duration::from_secs(timing.presenter_retry_secs)),
        ));
        let rotation = Arc::new(PanelRotation::new(
            Arc::clone(&surface),
            scheduler.clone(),
            config.panels.clone(),
            &elements.title,
        ));
        let ticker = Arc::new(ClockTicker::new(surface, Arc::clone(&clock), &elements.clock));

        Self {
            config,
            scheduler,
            clock,
            astro,
            lunar,
            dispatcher,
            presenter,
            rotation,
            probe,
            ticker,
        }
    }

    pub fn astro_store(&self) -> &Arc<DayStore<AstroRecord>> {
        self.astro.store()
    }

    pub fn moon_store(&self) -> &Arc<DayStore<MoonImageRecord>> {
        self.lunar.moons()
    }

    pub fn dispatcher(&self) -> &Arc<ResourceDispatcher> {
        &self.dispatcher
    }

    pub fn rotation(&self) -> &Arc<PanelRotation> {
        &self.rotation
    }

    pub fn anchor(&self) -> NaiveDate {
        self.astro.anchor()
    }

    /// One-shot startup, then the steady-state repeaters.
    ///
    /// Returns once the repeaters are installed; they run until the scheduler
    /// engine shuts down.
    pub async fn start(&self) -> kiosk_scheduler::Result<()> {
        let timing = &self.config.timing;
        info!(anchor = %self.anchor(), "kiosk starting");

        let ticker = Arc::clone(&self.ticker);
        self.scheduler
            .spawn_until_shutdown("clock", async move { ticker.run().await });

        self.probe.probe().await;
        self.astro.populate().await;

        let lunar = Arc::clone(&self.lunar);
        self.scheduler.spawn_after("lunar-builder", Duration::ZERO, async move {
            if let Err(e) = lunar.run().await {
                warn!("moon images not built: {e}");
            }
        });

        let presenter = Arc::clone(&self.presenter);
        self.scheduler.spawn_after("presenter", Duration::ZERO, async move {
            presenter.run().await;
        });

        self.dispatcher.dispatch(Category::All, None).await;
        self.rotation.initialize(self.clock.now());

        tokio::time::sleep(Duration::from_secs(timing.settle_secs)).await;
        self.install_repeaters()?;
        info!(repeaters = self.scheduler.list_tasks().len(), "kiosk running");
        Ok(())
    }

    fn install_repeaters(&self) -> kiosk_scheduler::Result<()> {
        let timing = &self.config.timing;

        let presenter = Arc::clone(&self.presenter);
        self.every("presenter", timing.presenter_every_secs, move || {
            let presenter = Arc::clone(&presenter);
            async move { presenter.run().await }
        })?;

        for (name, category, secs) in [
            ("tides", Category::Tides, timing.tides_every_secs),
            ("tidegraphic", Category::TideGraphic, timing.tidegraphic_every_secs),
            ("windgraph", Category::WindGraph, timing.windgraph_every_secs),
            ("forecast", Category::Forecast, timing.forecast_every_secs),
            ("radar", Category::Radar, timing.radar_every_secs),
        ] {
            let dispatcher = Arc::clone(&self.dispatcher);
            self.every(name, secs, move || {
                let dispatcher = Arc::clone(&dispatcher);
                async move { dispatcher.dispatch(category, None).await }
            })?;
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        self.every("reservations", timing.reservations_every_secs, move || {
            let dispatcher = Arc::clone(&dispatcher);
            async move {
                dispatcher.dispatch(Category::Boats, None).await;
                dispatcher.dispatch(Category::Porch, None).await;
            }
        })?;

        let probe = Arc::clone(&self.probe);
        self.every("network", timing.network_every_secs, move || {
            let probe = Arc::clone(&probe);
            async move {
                probe.probe().await;
            }
        })?;

        let rotation = Arc::clone(&self.rotation);
        self.every("rotation", timing.rotation_every_secs, move || {
            let rotation = Arc::clone(&rotation);
            async move {
                rotation.tick();
            }
        })?;
        Ok(())
    }

    fn every<F, Fut>(&self, name: &str, secs: u64, task: F) -> kiosk_scheduler::Result<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.scheduler.spawn_repeating(
            name,
            Schedule::every(secs),
            Duration::from_secs(secs),
            task,
        )?;
        Ok(())
    }
}
