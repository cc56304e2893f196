//! Ephemeris records as served by the observatory proxy (`usNavObsData.py`).
//!
//! A record looks like:
//!
//! ```json
//! { "curphase": "Waxing Crescent", "fracillum": "15%",
//!   "sundata":  [ {"phen": "Begin Civil Twilight", "time": "06:34"},
//!                 {"phen": "Rise", "time": "07:02"}, … ],
//!   "moondata": [ {"phen": "Rise", "time": "09:17"}, … ],
//!   "closestphase": {"day": 1, "month": 2, "year": 2022, "phase": "New Moon", "time": "00:46"} }
//! ```
//!
//! The provider has always listed sun phenomena in a fixed order, and older
//! consumers index into `sundata` by position. Lookups here go by label and only
//! fall back to the legacy position when the label is absent.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{KioskError, Result};

/// Envelope returned by the ephemeris endpoint: `{ properties: { data: … } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct EphemerisResponse {
    pub properties: EphemerisProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EphemerisProperties {
    pub data: AstroRecord,
}

/// One `{phen, time}` pair from `sundata` / `moondata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhenomenonTime {
    pub phen: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosestPhase {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub phase: String,
    pub time: String,
}

/// Named sun phenomena, in the order the provider lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phenomenon {
    BeginCivilTwilight,
    Rise,
    UpperTransit,
    Set,
    EndCivilTwilight,
}

impl Phenomenon {
    pub fn label(&self) -> &'static str {
        match self {
            Phenomenon::BeginCivilTwilight => "Begin Civil Twilight",
            Phenomenon::Rise => "Rise",
            Phenomenon::UpperTransit => "Upper Transit",
            Phenomenon::Set => "Set",
            Phenomenon::EndCivilTwilight => "End Civil Twilight",
        }
    }

    /// Position within `sundata` under the provider's historical layout.
    fn legacy_sun_index(&self) -> usize {
        match self {
            Phenomenon::BeginCivilTwilight => 0,
            Phenomenon::Rise => 1,
            Phenomenon::UpperTransit => 2,
            Phenomenon::Set => 3,
            Phenomenon::EndCivilTwilight => 4,
        }
    }
}

/// Sun and moon data for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstroRecord {
    pub curphase: String,
    pub fracillum: String,
    #[serde(default)]
    pub sundata: Vec<PhenomenonTime>,
    #[serde(default)]
    pub moondata: Vec<PhenomenonTime>,
    #[serde(default, alias = "closestPhase")]
    pub closestphase: Option<ClosestPhase>,
    /// Date the record was requested for; filled in on ingestion.
    #[serde(default)]
    pub requested_date: Option<NaiveDate>,
}

impl AstroRecord {
    /// Look up a sun phenomenon by label, falling back to its legacy index.
    pub fn sun(&self, phen: Phenomenon) -> Option<&PhenomenonTime> {
        self.sundata
            .iter()
            .find(|p| p.phen.eq_ignore_ascii_case(phen.label()))
            .or_else(|| self.sundata.get(phen.legacy_sun_index()))
    }

    /// Display form of a sun phenomenon's time, zone suffix removed.
    pub fn sun_time_text(&self, phen: Phenomenon) -> Result<&str> {
        self.sun(phen)
            .map(|p| strip_zone_suffix(&p.time))
            .ok_or_else(|| KioskError::MissingPhenomenon {
                phen: phen.label().to_string(),
            })
    }

    pub fn sun_time(&self, phen: Phenomenon) -> Result<NaiveTime> {
        parse_time_of_day(self.sun_time_text(phen)?)
    }

    /// Moon phase stage token: the first word of `curphase` ("Waxing", "Full", …).
    pub fn phase_stage(&self) -> &str {
        self.curphase.split_whitespace().next().unwrap_or("")
    }

    /// Illuminated fraction as a whole percentage, `%` suffix stripped.
    pub fn illumination(&self) -> Result<u8> {
        let raw = self.fracillum.trim();
        raw.strip_suffix('%')
            .unwrap_or(raw)
            .trim()
            .parse::<u8>()
            .map_err(|_| KioskError::Illumination {
                value: self.fracillum.clone(),
            })
    }

    /// Check at ingestion that the phenomena the presenter relies on resolve.
    pub fn validate(&self) -> Result<()> {
        self.sun_time(Phenomenon::Rise)?;
        self.sun_time(Phenomenon::Set)?;
        Ok(())
    }
}

/// Remove the trailing daylight/standard designator the provider sometimes
/// appends (`"17:16  DT"` → `"17:16"`).
pub fn strip_zone_suffix(time: &str) -> &str {
    let trimmed = time.trim();
    for suffix in ["DT", "ST"] {
        if let Some(head) = trimmed.strip_suffix(suffix) {
            if head.ends_with(char::is_whitespace) {
                return head.trim_end();
            }
        }
    }
    trimmed
}

/// Parse `HH:MM`, tolerating a zone suffix.
pub fn parse_time_of_day(time: &str) -> Result<NaiveTime> {
    let clean = strip_zone_suffix(time);
    NaiveTime::parse_from_str(clean, "%H:%M").map_err(|_| KioskError::TimeFormat {
        value: time.to_string(),
    })
}
