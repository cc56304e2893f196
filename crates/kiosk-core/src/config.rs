use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8088;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/cgi-bin";

/// Top-level config (kiosk.toml + KIOSK_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KioskConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub elements: ElementsConfig,
    #[serde(default)]
    pub panels: PanelsConfig,
}

/// HTTP surface the page polls for the display model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Where the provider scripts live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// Per-request timeout; generators can take a while to render.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Leading token the network status script prints before the badge text.
    #[serde(default = "default_status_prefix")]
    pub status_prefix: String,
    /// Badge text shown when the status script itself cannot be reached.
    #[serde(default = "default_offline_badge")]
    pub offline_badge: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
            status_prefix: default_status_prefix(),
            offline_badge: default_offline_badge(),
        }
    }
}

/// Every period and delay the orchestrator uses, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait between the first full pass and installing the repeaters.
    pub settle_secs: u64,
    /// Lunar builder poll while the astro store is incomplete.
    pub astro_poll_secs: u64,
    /// Presenter retry while data is missing or malformed.
    pub presenter_retry_secs: u64,
    pub presenter_every_secs: u64,
    pub tides_every_secs: u64,
    pub tidegraphic_every_secs: u64,
    pub windgraph_every_secs: u64,
    pub forecast_every_secs: u64,
    pub radar_every_secs: u64,
    /// Radar retry window when the element is momentarily unavailable.
    pub radar_retry_min_secs: u64,
    pub radar_retry_max_secs: u64,
    pub network_every_secs: u64,
    pub rotation_every_secs: u64,
    pub reservations_every_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_secs: 5,
            astro_poll_secs: 4,
            presenter_retry_secs: 3,
            presenter_every_secs: 13 * 60,
            tides_every_secs: 15 * 60,
            tidegraphic_every_secs: 11 * 60,
            windgraph_every_secs: 17 * 60,
            forecast_every_secs: 30 * 60,
            radar_every_secs: 7 * 60,
            radar_retry_min_secs: 15,
            radar_retry_max_secs: 31,
            network_every_secs: 60,
            rotation_every_secs: 45,
            reservations_every_secs: 2 * 60,
        }
    }
}

/// A named element whose source the dispatcher rewrites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaElement {
    pub id: String,
    pub source: String,
}

impl MediaElement {
    fn new(id: &str, source: &str) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
        }
    }
}

/// Element ids and their initial sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementsConfig {
    pub clock: String,
    pub status: String,
    pub network: String,
    pub title: String,
    pub suncondition: String,
    /// Moon slots are `<prefix><day>`, e.g. `moon-today`.
    pub moon_prefix: String,
    pub tidegraph: MediaElement,
    pub tidetable: MediaElement,
    pub tidegraphic: MediaElement,
    pub windgraph: MediaElement,
    pub forecast: MediaElement,
    pub radar: MediaElement,
    pub boats: MediaElement,
    pub porch: MediaElement,
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            clock: "clock".to_string(),
            status: "status".to_string(),
            network: "network".to_string(),
            title: "title".to_string(),
            suncondition: "suncondition".to_string(),
            moon_prefix: "moon-".to_string(),
            tidegraph: MediaElement::new("tidegraph", "resources/tmp/tideGraph.png"),
            tidetable: MediaElement::new("tidetable", "resources/tmp/tideTable.html"),
            tidegraphic: MediaElement::new("tidegraphic", "resources/tmp/tideGraphic.png"),
            windgraph: MediaElement::new("windgraph", "resources/tmp/windGraph.png"),
            forecast: MediaElement::new("forecast", "resources/tmp/forecastGrid.html"),
            radar: MediaElement::new(
                "radar",
                "https://radar.weather.gov/ridge/standard/KOKX_loop.gif",
            ),
            boats: MediaElement::new(
                "dayboat",
                "https://docs.google.com/spreadsheets/d/e/dayboat/pubhtml?widget=true&headers=false",
            ),
            porch: MediaElement::new(
                "porch",
                "https://docs.google.com/spreadsheets/d/e/porch/pubhtml?widget=true&headers=false",
            ),
        }
    }
}

impl ElementsConfig {
    pub fn moon_id(&self, day: crate::types::RelativeDay) -> String {
        format!("{}{}", self.moon_prefix, day)
    }
}

/// A full-screen panel and the title shown while it is up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelConfig {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelsConfig {
    /// Ordered panels; the third is only rotated in Thursday–Sunday.
    pub panels: Vec<PanelConfig>,
    pub reservations_today: String,
    pub reservations_tomorrow: String,
    /// From this local hour on, the reservation panel shows tomorrow's sheet.
    pub tomorrow_after_hour: u32,
    /// Debug override: `n >= 0` pins panel `n`, a negative value halts rotation.
    pub pin: Option<i64>,
    /// Transition duration applied to panels that declare none.
    pub transition_ms: u64,
}

impl Default for PanelsConfig {
    fn default() -> Self {
        Self {
            panels: vec![
                PanelConfig {
                    id: "panel-weather".to_string(),
                    title: "Harbor Weather".to_string(),
                },
                PanelConfig {
                    id: "panel-tides".to_string(),
                    title: "Tides & Wind".to_string(),
                },
                PanelConfig {
                    id: "panel-reservations".to_string(),
                    title: "Boat Reservations".to_string(),
                },
            ],
            reservations_today: "reservations-today".to_string(),
            reservations_tomorrow: "reservations-tomorrow".to_string(),
            tomorrow_after_hour: 16,
            pin: None,
            transition_ms: 1500,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_status_prefix() -> String {
    "networkStatus".to_string()
}
fn default_offline_badge() -> String {
    "&#11015; DN".to_string()
}

impl KioskConfig {
    /// Load config from a TOML file with KIOSK_* env var overrides.
    ///
    /// A missing file is not an error; every section has defaults.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("KIOSK_").split("__"))
            .extract()
            .map_err(|e| crate::error::KioskError::Config(e.to_string()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.kiosk/kiosk.toml", home)
}
