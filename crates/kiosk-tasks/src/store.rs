//! Per-day stores shared between a single writer task and read-only presenters.

use std::sync::RwLock;

use kiosk_core::RelativeDay;
use serde::Serialize;

/// Contents of one relative-day slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Slot<T> {
    Empty,
    Ready(T),
    /// The last fetch failed; the slot is refetched on the next population.
    Failed(String),
}

impl<T> Slot<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }
}

/// Read-only view handed to presenters and the HTTP surface.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot<T> {
    pub complete: bool,
    pub yesterday: Slot<T>,
    pub today: Slot<T>,
    pub tomorrow: Slot<T>,
}

impl<T> StoreSnapshot<T> {
    pub fn slot(&self, day: RelativeDay) -> &Slot<T> {
        match day {
            RelativeDay::Yesterday => &self.yesterday,
            RelativeDay::Today => &self.today,
            RelativeDay::Tomorrow => &self.tomorrow,
        }
    }

    pub fn ready(&self, day: RelativeDay) -> Option<&T> {
        match self.slot(day) {
            Slot::Ready(v) => Some(v),
            _ => None,
        }
    }
}

/// Three relative-day slots with a derived completeness flag.
///
/// `complete` is never stored: it is true iff every slot is `Ready`. Once
/// complete the store is frozen; later writes are discarded.
pub struct DayStore<T> {
    name: &'static str,
    slots: RwLock<[Slot<T>; 3]>,
}

fn index(day: RelativeDay) -> usize {
    match day {
        RelativeDay::Yesterday => 0,
        RelativeDay::Today => 1,
        RelativeDay::Tomorrow => 2,
    }
}

impl<T: Clone> DayStore<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: RwLock::new([Slot::Empty, Slot::Empty, Slot::Empty]),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_complete(&self) -> bool {
        self.read(|slots| slots.iter().all(Slot::is_ready))
    }

    pub fn slot(&self, day: RelativeDay) -> Slot<T> {
        self.read(|slots| slots[index(day)].clone())
    }

    pub fn ready(&self, day: RelativeDay) -> Option<T> {
        match self.slot(day) {
            Slot::Ready(v) => Some(v),
            _ => None,
        }
    }

    /// Days whose slot is not yet `Ready`, in calendar order.
    pub fn missing(&self) -> Vec<RelativeDay> {
        self.read(|slots| {
            RelativeDay::ALL
                .into_iter()
                .filter(|d| !slots[index(*d)].is_ready())
                .collect()
        })
    }

    pub fn snapshot(&self) -> StoreSnapshot<T> {
        self.read(|slots| StoreSnapshot {
            complete: slots.iter().all(Slot::is_ready),
            yesterday: slots[0].clone(),
            today: slots[1].clone(),
            tomorrow: slots[2].clone(),
        })
    }

    /// Write a slot. Returns false when the store was already complete and the
    /// write was discarded.
    pub(crate) fn record(&self, day: RelativeDay, slot: Slot<T>) -> bool {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        if slots.iter().all(Slot::is_ready) {
            return false;
        }
        slots[index(day)] = slot;
        true
    }

    fn read<R>(&self, f: impl FnOnce(&[Slot<T>; 3]) -> R) -> R {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        f(&slots)
    }
}
