use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use kiosk_core::config::KioskConfig;
use kiosk_core::ephemeris::{AstroRecord, PhenomenonTime};
use kiosk_core::UnitSystem;
use kiosk_display::{DisplayModel, StatusReporter, Surface};

use crate::backend::{Backend, MoonImageRecord, MoonImageRequest, Regeneration};
use crate::error::{BackendError, Result};

pub(crate) fn record(rise: &str, set: &str) -> AstroRecord {
    AstroRecord {
        curphase: "Waxing Crescent".to_string(),
        fracillum: "15%".to_string(),
        sundata: vec![
            PhenomenonTime {
                phen: "Begin Civil Twilight".to_string(),
                time: "06:34".to_string(),
            },
            PhenomenonTime {
                phen: "Rise".to_string(),
                time: rise.to_string(),
            },
            PhenomenonTime {
                phen: "Upper Transit".to_string(),
                time: "12:09".to_string(),
            },
            PhenomenonTime {
                phen: "Set".to_string(),
                time: set.to_string(),
            },
        ],
        moondata: Vec::new(),
        closestphase: None,
        requested_date: None,
    }
}

pub(crate) fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// Records every call; failures are switched on per date or per generator.
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub calls: Mutex<Vec<String>>,
    pub failing_dates: Mutex<HashSet<NaiveDate>>,
    pub failing_targets: Mutex<HashSet<Regeneration>>,
    pub offline: AtomicBool,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn fail_date(&self, date: NaiveDate) {
        self.failing_dates.lock().unwrap().insert(date);
    }

    pub fn heal_date(&self, date: NaiveDate) {
        self.failing_dates.lock().unwrap().remove(&date);
    }

    pub fn fail_target(&self, target: Regeneration) {
        self.failing_targets.lock().unwrap().insert(target);
    }

    pub fn heal_target(&self, target: Regeneration) {
        self.failing_targets.lock().unwrap().remove(&target);
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn ephemeris(&self, date: NaiveDate) -> Result<AstroRecord> {
        self.log(format!("ephemeris {date}"));
        if self.failing_dates.lock().unwrap().contains(&date) {
            return Err(BackendError::Unavailable("connection refused".to_string()));
        }
        Ok(record("07:02", "17:16  DT"))
    }

    async fn moon_image(&self, req: &MoonImageRequest) -> Result<MoonImageRecord> {
        self.log(format!("moon {}", req.filename));
        Ok(MoonImageRecord {
            filename: format!("resources/tmp/{}", req.filename),
        })
    }

    async fn regenerate(&self, target: Regeneration, units: Option<UnitSystem>) -> Result<String> {
        let units = units.map(|u| u.to_string()).unwrap_or_else(|| "-".to_string());
        self.log(format!("{} {units}", target.script()));
        if self.failing_targets.lock().unwrap().contains(&target) {
            return Err(BackendError::Api {
                status: 500,
                message: "render failed".to_string(),
            });
        }
        Ok("ok".to_string())
    }

    async fn network_status(&self) -> Result<String> {
        self.log("network".to_string());
        if self.offline.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("connection refused".to_string()));
        }
        Ok("networkStatus &#11014; UP".to_string())
    }
}

pub(crate) fn model() -> Arc<DisplayModel> {
    let config = KioskConfig::default();
    Arc::new(DisplayModel::from_config(&config.elements, &config.panels))
}

pub(crate) fn status(surface: &Arc<DisplayModel>) -> Arc<StatusReporter> {
    let surface: Arc<dyn Surface> = surface.clone();
    Arc::new(StatusReporter::new(surface, "status"))
}
