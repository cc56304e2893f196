use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use kiosk_core::ephemeris::{AstroRecord, Phenomenon};
use kiosk_core::{KioskError, RelativeDay};
use kiosk_display::{Surface, SurfaceError};
use kiosk_scheduler::retry::{retry, RetryPolicy};
use kiosk_scheduler::WallClock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::astro::AstroService;

/// Minutes after sunset at which the footer switches to tomorrow.
pub const SUNSET_GRACE_MINUTES: i64 = 20;

#[derive(Debug, Error)]
pub enum PresentError {
    #[error("astro data not ready")]
    NotReady,

    #[error(transparent)]
    Data(#[from] KioskError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Footer line for `now`: today's times until twenty minutes after today's
/// sunset, tomorrow's from then on.
pub fn compose(
    today: &AstroRecord,
    tomorrow: &AstroRecord,
    now: NaiveDateTime,
) -> Result<String, KioskError> {
    let sunset = now.date().and_time(today.sun_time(Phenomenon::Set)?);
    if now >= sunset + Duration::minutes(SUNSET_GRACE_MINUTES) {
        Ok(format!(
            "Tomorrow's Sunrise will be at {}, Sunset at {}",
            tomorrow.sun_time_text(Phenomenon::Rise)?,
            tomorrow.sun_time_text(Phenomenon::Set)?
        ))
    } else {
        Ok(format!(
            "Today's Sunrise is {}, Sunset at {}",
            today.sun_time_text(Phenomenon::Rise)?,
            today.sun_time_text(Phenomenon::Set)?
        ))
    }
}

/// Sunrise/sunset footer.
pub struct Presenter {
    astro: Arc<AstroService>,
    surface: Arc<dyn Surface>,
    clock: Arc<dyn WallClock>,
    element: String,
    policy: RetryPolicy,
}

impl Presenter {
    pub fn new(
        astro: Arc<AstroService>,
        surface: Arc<dyn Surface>,
        clock: Arc<dyn WallClock>,
        element: &str,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            astro,
            surface,
            clock,
            element: element.to_string(),
            policy,
        }
    }

    /// One attempt against the current snapshot.
    pub fn present_once(&self) -> Result<String, PresentError> {
        let snapshot = self.astro.store().snapshot();
        if !snapshot.complete {
            return Err(PresentError::NotReady);
        }
        let (Some(today), Some(tomorrow)) = (
            snapshot.ready(RelativeDay::Today),
            snapshot.ready(RelativeDay::Tomorrow),
        ) else {
            return Err(PresentError::NotReady);
        };
        let line = compose(today, tomorrow, self.clock.now())?;
        self.surface.set_text(&self.element, &line)?;
        Ok(line)
    }

    /// Present, populating the store and retrying after the policy delay while
    /// data is missing or malformed.
    pub async fn run(&self) {
        let outcome = retry(&self.policy, |attempt| async move {
            let result = self.present_once();
            if let Err(PresentError::NotReady) = result {
                debug!(attempt, "astro store incomplete, populating");
                self.astro.populate().await;
            }
            result
        })
        .await;
        match outcome {
            Ok(line) => info!(%line, "sun times presented"),
            Err(e) => warn!("sun times not presented: {e}"),
        }
    }
}
