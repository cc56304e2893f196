use std::sync::Arc;

use futures_util::future::join_all;
use kiosk_core::ephemeris::AstroRecord;
use kiosk_core::RelativeDay;
use kiosk_display::{CacheBuster, StatusReporter, Surface};
use kiosk_scheduler::retry::{poll_until, RetryPolicy};
use tracing::{info, warn};

use crate::backend::{Backend, MoonImageRecord, MoonImageRequest};
use crate::store::{DayStore, Slot};

/// Renders one moon image per relative day once the astro store is complete.
pub struct LunarBuilder {
    backend: Arc<dyn Backend>,
    astro: Arc<DayStore<AstroRecord>>,
    moons: Arc<DayStore<MoonImageRecord>>,
    surface: Arc<dyn Surface>,
    status: Arc<StatusReporter>,
    buster: Arc<CacheBuster>,
    moon_prefix: String,
    policy: RetryPolicy,
}

impl LunarBuilder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backend: Arc<dyn Backend>,
        astro: Arc<DayStore<AstroRecord>>,
        moons: Arc<DayStore<MoonImageRecord>>,
        surface: Arc<dyn Surface>,
        status: Arc<StatusReporter>,
        buster: Arc<CacheBuster>,
        moon_prefix: &str,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            astro,
            moons,
            surface,
            status,
            buster,
            moon_prefix: moon_prefix.to_string(),
            policy,
        }
    }

    pub fn moons(&self) -> &Arc<DayStore<MoonImageRecord>> {
        &self.moons
    }

    /// Wait for the astro store, then build all three images concurrently.
    pub async fn run(&self) -> kiosk_scheduler::Result<()> {
        let polls = poll_until(&self.policy, || self.astro.is_complete()).await?;
        info!(polls, "astro store complete, building moon images");

        let snapshot = self.astro.snapshot();
        join_all(
            RelativeDay::ALL
                .into_iter()
                .filter_map(|day| snapshot.ready(day).map(|record| self.build_day(day, record))),
        )
        .await;
        Ok(())
    }

    async fn build_day(&self, day: RelativeDay, record: &AstroRecord) {
        let request = match MoonImageRequest::from_record(day, record) {
            Ok(request) => request,
            Err(e) => {
                warn!(%day, "cannot describe moon image: {e}");
                self.moons.record(day, Slot::Failed(e.to_string()));
                return;
            }
        };

        let image = {
            let _status = self.status.begin(&format!("Drawing {day}'s moon"));
            self.backend.moon_image(&request).await
        };
        match image {
            Ok(image) => {
                let id = format!("{}{}", self.moon_prefix, day);
                let url = self.buster.bust(&image.filename);
                self.moons.record(day, Slot::Ready(image));
                if let Err(e) = self.surface.set_source(&id, &url) {
                    warn!(%day, element = %id, "moon image not shown: {e}");
                }
                info!(%day, stage = %request.stage, fracillum = request.fracillum, "moon image ready");
            }
            Err(e) => {
                warn!(%day, "moon image request failed: {e}");
                self.moons.record(day, Slot::Failed(e.to_string()));
            }
        }
    }
}
