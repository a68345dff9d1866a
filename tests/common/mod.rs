#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use market_params::*;
use std::cell::RefCell;
use std::rc::Rc;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2029, 6, 1, 0, 0, 0).unwrap()
}

/// In-memory collaborators for one chain.
pub struct Fixture {
    pub height: u64,
    pub clock: FixedClock,
    pub tokens: InMemoryTokens,
    pub oracles: InMemoryOracles,
    pub positions: InMemoryPositions,
    pub sequence: InMemorySequence,
    pub events: EventCollector,
}

impl Fixture {
    pub fn new() -> Self {
        let tokens = InMemoryTokens::new()
            .with(Token::new("eth", "ETH", "Ether", 18))
            .with(Token::new("btc", "BTC", "Bitcoin", 8))
            .with(Token::new("usdc", "USDC", "USD Coin", 6))
            .with(Token::new("usdc.axl", "USDC", "Axelar USD Coin", 6))
            .with(Token::new("luna", "LUNA", "Terra", 6).inactive());
        Self {
            height: 10,
            clock: FixedClock(now()),
            tokens,
            oracles: InMemoryOracles::new(["DETH", "DXBT"]),
            positions: InMemoryPositions::new(),
            sequence: InMemorySequence::default(),
            events: EventCollector::new(),
        }
    }

    pub fn ctx(&mut self) -> Context<'_> {
        Context {
            block_height: self.height,
            clock: &self.clock,
            tokens: &self.tokens,
            oracles: &self.oracles,
            positions: &self.positions,
            sequence: &mut self.sequence,
            events: &mut self.events,
        }
    }

    /// Same collaborators, but events go to `sink`.
    pub fn ctx_with_sink<'a>(&'a mut self, sink: &'a mut dyn EventSink) -> Context<'a> {
        Context {
            block_height: self.height,
            clock: &self.clock,
            tokens: &self.tokens,
            oracles: &self.oracles,
            positions: &self.positions,
            sequence: &mut self.sequence,
            events: sink,
        }
    }
}

pub struct RejectingSink;

impl EventSink for RejectingSink {
    fn emit(&mut self, event: Event) -> Result<(), EventError> {
        Err(EventError {
            id: event.id,
            reason: "indexer offline".to_string(),
        })
    }
}

/// Appends `<tag>:<market name>` for every notification.
pub struct RecordingHook {
    pub tag: &'static str,
    pub log: Rc<RefCell<Vec<String>>>,
}

impl MarketHooks for RecordingHook {
    fn after_market_created(&mut self, market: &Market) {
        self.log
            .borrow_mut()
            .push(format!("{}:created:{}", self.tag, market.name));
    }

    fn after_market_updated(&mut self, market: &Market) {
        self.log
            .borrow_mut()
            .push(format!("{}:updated:{}", self.tag, market.name));
    }
}
