use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use kiosk_core::config::{ElementsConfig, PanelsConfig};
use kiosk_core::RelativeDay;
use serde::Serialize;

use crate::error::{Result, SurfaceError};
use crate::surface::Surface;

/// Attribute holding a panel's human-readable title.
pub const TITLE_ATTRIBUTE: &str = "data-title";

/// Render state of one named element.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ElementState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub classes: BTreeSet<String>,
    pub visible: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_ms: Option<u64>,
    /// Model revision at this element's last change; lets the page diff cheaply.
    pub revision: u64,
}

impl ElementState {
    pub fn text() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    pub fn media(source: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            visible: true,
            ..Self::default()
        }
    }
}

/// Serializable snapshot served on `/display`.
#[derive(Debug, Clone, Serialize)]
pub struct DisplaySnapshot {
    pub revision: u64,
    pub taken_at: DateTime<Utc>,
    pub elements: BTreeMap<String, ElementState>,
}

/// In-process display: a concurrent map of element id → state.
pub struct DisplayModel {
    elements: DashMap<String, ElementState>,
    default_transition: Duration,
    revision: AtomicU64,
}

impl DisplayModel {
    pub fn new(default_transition: Duration) -> Self {
        Self {
            elements: DashMap::new(),
            default_transition,
            revision: AtomicU64::new(0),
        }
    }

    /// Model with every element the kiosk page declares.
    pub fn from_config(elements: &ElementsConfig, panels: &PanelsConfig) -> Self {
        let model = Self::new(Duration::from_millis(panels.transition_ms));

        for id in [
            &elements.clock,
            &elements.network,
            &elements.title,
            &elements.suncondition,
        ] {
            model.register(id, ElementState::text());
        }
        model.register(
            &elements.status,
            ElementState {
                visible: false,
                ..ElementState::default()
            },
        );
        for media in [
            &elements.tidegraph,
            &elements.tidetable,
            &elements.tidegraphic,
            &elements.windgraph,
            &elements.forecast,
            &elements.radar,
            &elements.boats,
            &elements.porch,
        ] {
            model.register(&media.id, ElementState::media(&media.source));
        }
        for day in RelativeDay::ALL {
            model.register(&elements.moon_id(day), ElementState::text());
        }
        for panel in &panels.panels {
            let mut state = ElementState::text();
            state
                .attributes
                .insert(TITLE_ATTRIBUTE.to_string(), panel.title.clone());
            state.transition_ms = Some(panels.transition_ms);
            model.register(&panel.id, state);
        }
        model.register(&panels.reservations_today, ElementState::text());
        model.register(&panels.reservations_tomorrow, ElementState::text());
        model
    }

    pub fn register(&self, id: &str, mut state: ElementState) {
        state.revision = self.bump();
        self.elements.insert(id.to_string(), state);
    }

    /// Drop an element, as when the page removes it.
    pub fn unregister(&self, id: &str) -> Option<ElementState> {
        self.elements.remove(id).map(|(_, state)| state)
    }

    pub fn element(&self, id: &str) -> Option<ElementState> {
        self.elements.get(id).map(|e| e.value().clone())
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            revision: self.revision(),
            taken_at: Utc::now(),
            elements: self
                .elements
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
        }
    }

    fn bump(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Apply `change` to element `id`, stamping a new revision if it changed anything.
    fn update<T>(&self, id: &str, change: impl FnOnce(&mut ElementState) -> T) -> Result<T> {
        let mut entry = self
            .elements
            .get_mut(id)
            .ok_or_else(|| SurfaceError::ElementUnavailable { id: id.to_string() })?;
        let before = (*entry).clone();
        let out = change(&mut *entry);
        if *entry != before {
            entry.revision = self.bump();
        }
        Ok(out)
    }
}

impl Surface for DisplayModel {
    fn source(&self, id: &str) -> Result<String> {
        let entry = self
            .elements
            .get(id)
            .ok_or_else(|| SurfaceError::ElementUnavailable { id: id.to_string() })?;
        entry
            .source
            .clone()
            .ok_or_else(|| SurfaceError::NoSource { id: id.to_string() })
    }

    fn set_source(&self, id: &str, url: &str) -> Result<()> {
        self.update(id, |e| e.source = Some(url.to_string()))
    }

    fn set_text(&self, id: &str, text: &str) -> Result<()> {
        self.update(id, |e| e.text = Some(text.to_string()))
    }

    fn add_class(&self, id: &str, class: &str) -> Result<()> {
        self.update(id, |e| {
            e.classes.insert(class.to_string());
        })
    }

    fn remove_class(&self, id: &str, class: &str) -> Result<()> {
        self.update(id, |e| {
            e.classes.remove(class);
        })
    }

    fn set_visible(&self, id: &str, visible: bool) -> Result<()> {
        self.update(id, |e| e.visible = visible)
    }

    fn attribute(&self, id: &str, name: &str) -> Result<Option<String>> {
        self.elements
            .get(id)
            .map(|e| e.attributes.get(name).cloned())
            .ok_or_else(|| SurfaceError::ElementUnavailable { id: id.to_string() })
    }

    fn transition_duration(&self, id: &str) -> Result<Duration> {
        self.elements
            .get(id)
            .map(|e| {
                e.transition_ms
                    .map(Duration::from_millis)
                    .unwrap_or(self.default_transition)
            })
            .ok_or_else(|| SurfaceError::ElementUnavailable { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> DisplayModel {
        DisplayModel::from_config(&ElementsConfig::default(), &PanelsConfig::default())
    }

    #[test]
    fn config_declares_every_element() {
        let m = model();
        assert_eq!(
            m.source("radar").unwrap(),
            "https://radar.weather.gov/ridge/standard/KOKX_loop.gif"
        );
        assert_eq!(
            m.attribute("panel-tides", TITLE_ATTRIBUTE).unwrap().as_deref(),
            Some("Tides & Wind")
        );
        assert_eq!(
            m.transition_duration("panel-weather").unwrap(),
            Duration::from_millis(1500)
        );
        assert!(!m.element("status").unwrap().visible);
        assert!(m.element("moon-yesterday").is_some());
    }

    #[test]
    fn missing_element_is_unavailable() {
        let m = model();
        m.unregister("radar");
        assert_eq!(
            m.set_source("radar", "x").unwrap_err(),
            SurfaceError::ElementUnavailable {
                id: "radar".to_string()
            }
        );
        assert_eq!(
            m.source("moon-today").unwrap_err(),
            SurfaceError::NoSource {
                id: "moon-today".to_string()
            }
        );
    }

    #[test]
    fn revision_moves_only_on_change() {
        let m = model();
        m.add_class("panel-tides", "entering").unwrap();
        let rev = m.element("panel-tides").unwrap().revision;
        m.add_class("panel-tides", "entering").unwrap();
        assert_eq!(m.element("panel-tides").unwrap().revision, rev);
        m.remove_class("panel-tides", "entering").unwrap();
        assert!(m.element("panel-tides").unwrap().revision > rev);
    }

    #[test]
    fn snapshot_serializes_sparse_fields() {
        let m = model();
        m.set_text("clock", "5:16:03 PM").unwrap();
        let json = serde_json::to_value(m.snapshot()).unwrap();
        assert_eq!(json["elements"]["clock"]["text"], "5:16:03 PM");
        assert!(json["elements"]["clock"].get("source").is_none());
    }
}
