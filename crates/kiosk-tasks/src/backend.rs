use async_trait::async_trait;
use chrono::NaiveDate;
use kiosk_core::ephemeris::AstroRecord;
use kiosk_core::{KioskError, RelativeDay, UnitSystem};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Resources the backend can re-render on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regeneration {
    TideGraph,
    TideTable,
    TideGraphic,
    WindGraph,
    Forecast,
}

impl Regeneration {
    /// Provider script that renders this resource.
    pub fn script(&self) -> &'static str {
        match self {
            Regeneration::TideGraph => "tidesGraph.py",
            Regeneration::TideTable => "tidesTable.py",
            Regeneration::TideGraphic => "tidesGraphic.py",
            Regeneration::WindGraph => "windGraph.py",
            Regeneration::Forecast => "forecast.py",
        }
    }

    /// Whether the generator takes a `units` parameter.
    pub fn takes_units(&self) -> bool {
        matches!(
            self,
            Regeneration::TideGraph | Regeneration::TideTable | Regeneration::TideGraphic
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Regeneration::TideGraph => "tide graph",
            Regeneration::TideTable => "tide table",
            Regeneration::TideGraphic => "tide graphic",
            Regeneration::WindGraph => "wind graph",
            Regeneration::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Regeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Parameters for one rendered moon-phase image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoonImageRequest {
    pub day: RelativeDay,
    /// First word of the phase name, e.g. "Waxing".
    pub stage: String,
    /// Illuminated percentage, 0–100.
    pub fracillum: u8,
    pub filename: String,
}

impl MoonImageRequest {
    pub fn from_record(day: RelativeDay, record: &AstroRecord) -> std::result::Result<Self, KioskError> {
        Ok(Self {
            day,
            stage: record.phase_stage().to_string(),
            fracillum: record.illumination()?,
            filename: format!("moon_{day}.svg"),
        })
    }
}

/// Moon image metadata returned by the renderer; only the filename is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoonImageRecord {
    pub filename: String,
}

/// The provider scripts, as seen by the kiosk tasks.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    /// Sun and moon ephemeris for one calendar date.
    async fn ephemeris(&self, date: NaiveDate) -> Result<AstroRecord>;

    async fn moon_image(&self, req: &MoonImageRequest) -> Result<MoonImageRecord>;

    /// Ask a generator to re-render; returns its plain-text acknowledgement.
    async fn regenerate(&self, target: Regeneration, units: Option<UnitSystem>) -> Result<String>;

    /// Raw network status line, e.g. `networkStatus &#11014; UP`.
    async fn network_status(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moon_request_from_record() {
        let record = AstroRecord {
            curphase: "Waning Gibbous".to_string(),
            fracillum: "87%".to_string(),
            sundata: Vec::new(),
            moondata: Vec::new(),
            closestphase: None,
            requested_date: None,
        };
        let req = MoonImageRequest::from_record(RelativeDay::Tomorrow, &record).unwrap();
        assert_eq!(req.stage, "Waning");
        assert_eq!(req.fracillum, 87);
        assert_eq!(req.filename, "moon_tomorrow.svg");
    }

    #[test]
    fn only_tide_generators_take_units() {
        assert!(Regeneration::TideGraph.takes_units());
        assert!(Regeneration::TideGraphic.takes_units());
        assert!(!Regeneration::Forecast.takes_units());
    }
}
