use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::KioskError;

/// One of the three calendar days the kiosk keeps ephemeris for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeDay {
    Yesterday,
    Today,
    Tomorrow,
}

impl RelativeDay {
    pub const ALL: [RelativeDay; 3] = [
        RelativeDay::Yesterday,
        RelativeDay::Today,
        RelativeDay::Tomorrow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelativeDay::Yesterday => "yesterday",
            RelativeDay::Today => "today",
            RelativeDay::Tomorrow => "tomorrow",
        }
    }

    /// Calendar date this slot denotes when "today" is `anchor`.
    pub fn date_from(&self, anchor: NaiveDate) -> NaiveDate {
        let offset = match self {
            RelativeDay::Yesterday => -1,
            RelativeDay::Today => 0,
            RelativeDay::Tomorrow => 1,
        };
        anchor + Duration::days(offset)
    }
}

impl std::fmt::Display for RelativeDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelativeDay {
    type Err = KioskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yesterday" => Ok(RelativeDay::Yesterday),
            "today" => Ok(RelativeDay::Today),
            "tomorrow" => Ok(RelativeDay::Tomorrow),
            other => Err(KioskError::UnknownDay(other.to_string())),
        }
    }
}

/// Measurement system passed to the tide generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Imperial,
    Metric,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "imperial",
            UnitSystem::Metric => "metric",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = KioskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imperial" => Ok(UnitSystem::Imperial),
            "metric" => Ok(UnitSystem::Metric),
            other => Err(KioskError::Config(format!("unknown unit system: {other}"))),
        }
    }
}

/// Resource category understood by the refresh dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tides,
    #[serde(alias = "tidecartoon")]
    TideGraphic,
    WindGraph,
    Forecast,
    Radar,
    Boats,
    Porch,
    All,
}

impl Category {
    /// Fixed order used when `All` is dispatched.
    pub const EACH: [Category; 7] = [
        Category::Tides,
        Category::TideGraphic,
        Category::WindGraph,
        Category::Forecast,
        Category::Radar,
        Category::Boats,
        Category::Porch,
    ];

    /// Concrete categories this tag stands for, in dispatch order.
    pub fn expand(self) -> Vec<Category> {
        match self {
            Category::All => Self::EACH.to_vec(),
            one => vec![one],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tides => "tides",
            Category::TideGraphic => "tidegraphic",
            Category::WindGraph => "windgraph",
            Category::Forecast => "forecast",
            Category::Radar => "radar",
            Category::Boats => "boats",
            Category::Porch => "porch",
            Category::All => "all",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = KioskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tides" => Ok(Category::Tides),
            "tidegraphic" | "tidecartoon" => Ok(Category::TideGraphic),
            "windgraph" => Ok(Category::WindGraph),
            "forecast" => Ok(Category::Forecast),
            "radar" => Ok(Category::Radar),
            "boats" => Ok(Category::Boats),
            "porch" => Ok(Category::Porch),
            "all" => Ok(Category::All),
            other => Err(KioskError::UnknownCategory(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_days_span_three_consecutive_dates() {
        let anchor = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let dates: Vec<_> = RelativeDay::ALL.iter().map(|d| d.date_from(anchor)).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2022, 2, 28).unwrap(),
                anchor,
                NaiveDate::from_ymd_opt(2022, 3, 2).unwrap(),
            ]
        );
    }

    #[test]
    fn tidecartoon_is_an_alias() {
        assert_eq!("tidecartoon".parse::<Category>().unwrap(), Category::TideGraphic);
        assert_eq!("tidegraphic".parse::<Category>().unwrap(), Category::TideGraphic);
        assert!("tidegraph".parse::<Category>().is_err());
    }

    #[test]
    fn all_expands_in_fixed_order() {
        let order = Category::All.expand();
        assert_eq!(order.first(), Some(&Category::Tides));
        assert_eq!(order.last(), Some(&Category::Porch));
        assert_eq!(order.len(), 7);
        assert_eq!(Category::Radar.expand(), vec![Category::Radar]);
    }
}
