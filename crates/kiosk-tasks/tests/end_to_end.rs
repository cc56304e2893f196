use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use kiosk_core::config::KioskConfig;
use kiosk_core::ephemeris::{AstroRecord, PhenomenonTime};
use kiosk_core::UnitSystem;
use kiosk_display::DisplayModel;
use kiosk_scheduler::{ManualClock, SchedulerEngine};
use kiosk_tasks::{Backend, BackendError, Kiosk, MoonImageRecord, MoonImageRequest, Regeneration};

struct RecordingBackend {
    calls: Mutex<Vec<String>>,
    ephemeris_down: AtomicBool,
}

impl RecordingBackend {
    fn new(ephemeris_down: bool) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            ephemeris_down: AtomicBool::new(ephemeris_down),
        }
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

fn phen(phen: &str, time: &str) -> PhenomenonTime {
    PhenomenonTime {
        phen: phen.to_string(),
        time: time.to_string(),
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    async fn ephemeris(&self, date: NaiveDate) -> kiosk_tasks::error::Result<AstroRecord> {
        self.calls.lock().unwrap().push(format!("ephemeris {date}"));
        if self.ephemeris_down.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("connection refused".to_string()));
        }
        Ok(AstroRecord {
            curphase: "Full Moon".to_string(),
            fracillum: "100%".to_string(),
            sundata: vec![
                phen("Begin Civil Twilight", "06:34"),
                phen("Rise", "07:02"),
                phen("Upper Transit", "12:09"),
                phen("Set", "17:16  DT"),
                phen("End Civil Twilight", "17:45"),
            ],
            moondata: Vec::new(),
            closestphase: None,
            requested_date: None,
        })
    }

    async fn moon_image(&self, req: &MoonImageRequest) -> kiosk_tasks::error::Result<MoonImageRecord> {
        self.calls.lock().unwrap().push(format!(
            "moon {} {} {}",
            req.filename, req.stage, req.fracillum
        ));
        Ok(MoonImageRecord {
            filename: req.filename.clone(),
        })
    }

    async fn regenerate(
        &self,
        target: Regeneration,
        units: Option<UnitSystem>,
    ) -> kiosk_tasks::error::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {:?}", target.script(), units));
        Ok("done".to_string())
    }

    async fn network_status(&self) -> kiosk_tasks::error::Result<String> {
        self.calls.lock().unwrap().push("network".to_string());
        Ok("networkStatus &#11014; UP".to_string())
    }
}

fn friday(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 2, 4)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn kiosk(backend: Arc<RecordingBackend>, now: NaiveDateTime) -> (Kiosk, Arc<DisplayModel>, SchedulerEngine) {
    let config = KioskConfig::default();
    let surface = Arc::new(DisplayModel::from_config(&config.elements, &config.panels));
    let engine = SchedulerEngine::new();
    let kiosk = Kiosk::new(
        config,
        backend,
        surface.clone(),
        Arc::new(ManualClock::new(now)),
        engine.handle(),
        None,
    );
    (kiosk, surface, engine)
}

#[tokio::test(start_paused = true)]
async fn startup_populates_everything_and_installs_repeaters() {
    let backend = Arc::new(RecordingBackend::new(false));
    let (kiosk, surface, engine) = kiosk(backend.clone(), friday(17, 36));

    kiosk.start().await.unwrap();

    assert!(kiosk.astro_store().is_complete());
    assert!(kiosk.moon_store().is_complete());
    assert_eq!(backend.count("ephemeris"), 3);
    assert_eq!(backend.count("moon moon_today.svg Full 100"), 1);
    assert_eq!(backend.count("moon"), 3);

    let text = |id: &str| surface.element(id).unwrap().text;
    assert_eq!(
        text("suncondition").as_deref(),
        Some("Tomorrow's Sunrise will be at 07:02, Sunset at 17:16")
    );
    assert_eq!(text("network").as_deref(), Some("&#11014; UP"));
    assert!(text("clock").is_some());
    assert!(!surface.element("status").unwrap().visible);

    let names: Vec<String> = engine.handle().list_tasks().into_iter().map(|t| t.name).collect();
    assert_eq!(
        names,
        vec![
            "forecast",
            "network",
            "presenter",
            "radar",
            "reservations",
            "rotation",
            "tidegraphic",
            "tides",
            "windgraph"
        ]
    );

    assert_eq!(kiosk.rotation().state().unwrap().panels.len(), 3);
    tokio::time::sleep(Duration::from_secs(46)).await;
    assert_eq!(kiosk.rotation().state().unwrap().current, 1);
    engine.shutdown();
}

#[tokio::test(start_paused = true)]
async fn lunar_builder_waits_for_late_ephemeris() {
    let backend = Arc::new(RecordingBackend::new(true));
    let (kiosk, _surface, engine) = kiosk(backend.clone(), friday(9, 0));

    kiosk.start().await.unwrap();
    assert!(!kiosk.astro_store().is_complete());
    assert_eq!(backend.count("moon"), 0);

    backend.ephemeris_down.store(false, Ordering::SeqCst);
    // the presenter keeps re-populating; the builder notices on its next poll
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(kiosk.astro_store().is_complete());
    assert!(kiosk.moon_store().is_complete());
    assert_eq!(backend.count("moon"), 3);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(backend.count("moon"), 3);
    engine.shutdown();
}

#[tokio::test(start_paused = true)]
async fn tide_units_alternate_across_startup_and_repeater() {
    let backend = Arc::new(RecordingBackend::new(false));
    let (kiosk, _surface, engine) = kiosk(backend.clone(), friday(9, 0));

    kiosk.start().await.unwrap();
    assert_eq!(backend.count("tidesGraph.py Some(Imperial)"), 1);
    assert_eq!(backend.count("tidesTable.py Some(Imperial)"), 1);

    kiosk
        .dispatcher()
        .dispatch(kiosk_core::Category::Tides, None)
        .await;
    assert_eq!(backend.count("tidesGraph.py Some(Metric)"), 1);
    assert_eq!(backend.count("tidesTable.py Some(Metric)"), 1);
    assert_eq!(kiosk.dispatcher().toggle().count(), 2);
    engine.shutdown();
}
