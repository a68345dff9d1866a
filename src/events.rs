// 6.0: every market state change produces an event for external observers
// (indexers, downstream modules). a sink that fails to accept an event fails
// the whole transition; events are never dropped silently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ControlledParams;
use crate::fees::FeeStructure;
use crate::market::Market;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub block_height: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, block_height: u64, timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            id,
            block_height,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    New,
    Update,
    Settle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    Market(MarketEvent),
    FeeStructureSet(FeeStructure),
    ControlledParamsUpdated(ControlledParams),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub market: Market,
    pub transition: TransitionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("event {id:?} rejected: {reason}")]
pub struct EventError {
    pub id: EventId,
    pub reason: String,
}

pub trait EventSink {
    fn emit(&mut self, event: Event) -> Result<(), EventError>;
}

#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<Event>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn market_events(&self) -> impl Iterator<Item = &MarketEvent> {
        self.events.iter().filter_map(|e| match &e.payload {
            EventPayload::Market(m) => Some(m),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for EventCollector {
    fn emit(&mut self, event: Event) -> Result<(), EventError> {
        self.events.push(event);
        Ok(())
    }
}
