// 8.0 engine/core.rs: the engine owns the market store, the fee schedule,
// the registered hooks and, when enabled, the secondary index. collaborators
// are borrowed per call through Context.

use tracing::{debug, error, info, warn};

use super::config::EngineConfig;
use super::uniqueness::{self, MarketIndex};
use crate::collaborators::{ClockSource, OracleRegistry, PositionRegistry, SequenceGenerator, TokenRegistry};
use crate::config::{ControlledParams, MarketParams};
use crate::error::MarketError;
use crate::events::{Event, EventId, EventPayload, EventSink, MarketEvent, TransitionKind};
use crate::fees::FeeSchedule;
use crate::hooks::{HookSet, MarketHooks};
use crate::market::Market;
use crate::store::{MarketStore, MemStore, StoreError};

/** 8.1: everything the surrounding transition resolved before calling in */
pub struct Context<'a> {
    pub block_height: u64,
    pub clock: &'a dyn ClockSource,
    pub tokens: &'a dyn TokenRegistry,
    pub oracles: &'a dyn OracleRegistry,
    pub positions: &'a dyn PositionRegistry,
    pub sequence: &'a mut dyn SequenceGenerator,
    pub events: &'a mut dyn EventSink,
}

/** 8.2: main engine struct */
#[derive(Debug)]
pub struct Engine<S: MarketStore = MemStore> {
    pub(super) config: EngineConfig,
    pub(super) store: S,
    pub(super) fees: FeeSchedule,
    pub(super) hooks: HookSet,
    pub(super) index: Option<MarketIndex>,
    pub(super) next_event_id: u64,
}

impl Engine<MemStore> {
    pub fn new(config: EngineConfig) -> Self {
        let index = config.use_secondary_index.then(MarketIndex::new);
        Self {
            config,
            store: MemStore::new(),
            fees: FeeSchedule::new(),
            hooks: HookSet::new(),
            index,
            next_event_id: 1,
        }
    }
}

impl<S: MarketStore> Engine<S> {
    /// Wraps an existing store. the secondary index, if enabled, is rebuilt
    /// from its contents.
    pub fn with_store(store: S, config: EngineConfig) -> Result<Self, MarketError> {
        let index = if config.use_secondary_index {
            let markets = store.iter_prefix("")?;
            debug!(markets = markets.len(), "Rebuilt secondary index");
            Some(MarketIndex::from_markets(&markets))
        } else {
            None
        };
        Ok(Self {
            config,
            store,
            fees: FeeSchedule::new(),
            hooks: HookSet::new(),
            index,
            next_event_id: 1,
        })
    }

    /// Hooks run in registration order after every successful write.
    pub fn register_hook(&mut self, hook: Box<dyn MarketHooks>) {
        self.hooks.register(hook);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn params(&self) -> &MarketParams {
        &self.config.params
    }

    pub fn controlled_params(&self) -> &ControlledParams {
        &self.config.controlled_params
    }

    pub fn update_params(&mut self, params: MarketParams) -> Result<(), MarketError> {
        params.validate()?;
        info!(?params, "Updated market params");
        self.config.params = params;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fee_schedule(&self) -> &FeeSchedule {
        &self.fees
    }

    pub fn index(&self) -> Option<&MarketIndex> {
        self.index.as_ref()
    }

    pub fn get_market(&self, name: &str) -> Result<Option<Market>, MarketError> {
        Ok(self.store.get(name)?)
    }

    pub fn has_market(&self, name: &str) -> bool {
        self.store.has(name)
    }

    /// Every persisted market, in key order.
    pub fn get_all_markets(&self) -> Result<Vec<Market>, MarketError> {
        Ok(self.store.iter_prefix("")?)
    }

    pub(super) fn require_market(&self, name: &str) -> Result<Market, MarketError> {
        self.get_market(name)?
            .ok_or_else(|| MarketError::MarketNotFound(name.to_string()))
    }

    pub(super) fn is_unique_market(&self, candidate: &Market) -> Result<bool, MarketError> {
        match &self.index {
            Some(index) => Ok(index.is_unique_market(candidate)),
            None => Ok(uniqueness::is_unique_market(&self.get_all_markets()?, candidate)),
        }
    }

    pub(super) fn is_display_name_used(
        &self,
        display_name: &str,
        except: Option<&str>,
    ) -> Result<bool, MarketError> {
        match &self.index {
            Some(index) => Ok(index.is_display_name_used(display_name, except)),
            None => Ok(uniqueness::is_display_name_used(
                &self.get_all_markets()?,
                display_name,
                except,
            )),
        }
    }

    /// Primary write plus index maintenance. no hooks, no events.
    pub(super) fn write_market(&mut self, previous: Option<&Market>, market: &Market) -> Result<(), MarketError> {
        self.store.set(market)?;
        if let Some(index) = &mut self.index {
            index.replace(previous, market);
        }
        Ok(())
    }

    fn unwrite_market(&mut self, previous: Option<&Market>, market: &Market) -> Result<(), StoreError> {
        match previous {
            Some(previous) => {
                self.store.set(previous)?;
                if let Some(index) = &mut self.index {
                    index.replace(Some(market), previous);
                }
            }
            None => {
                self.store.delete(&market.name);
                if let Some(index) = &mut self.index {
                    index.remove(market);
                }
            }
        }
        Ok(())
    }

    /// Write, notify hooks, emit. a rejected event undoes the write.
    pub(super) fn commit_market(
        &mut self,
        ctx: &mut Context<'_>,
        previous: Option<Market>,
        market: Market,
        transition: TransitionKind,
    ) -> Result<Market, MarketError> {
        self.write_market(previous.as_ref(), &market)?;
        match transition {
            TransitionKind::New => self.hooks.after_market_created(&market),
            TransitionKind::Update | TransitionKind::Settle => self.hooks.after_market_updated(&market),
        }

        let payload = EventPayload::Market(MarketEvent {
            market: market.clone(),
            transition,
        });
        if let Err(e) = self.emit_event(ctx, payload) {
            warn!(market = %market.name, error = %e, "Event rejected, undoing write");
            if let Err(rollback) = self.unwrite_market(previous.as_ref(), &market) {
                error!(market = %market.name, error = %rollback, "Undoing write failed");
                return Err(MarketError::RollbackFailed {
                    cause: Box::new(e),
                    rollback,
                });
            }
            return Err(e);
        }
        Ok(market)
    }

    pub(super) fn emit_event(&mut self, ctx: &mut Context<'_>, payload: EventPayload) -> Result<(), MarketError> {
        let event = Event::new(
            EventId(self.next_event_id),
            ctx.block_height,
            ctx.clock.current_time(),
            payload,
        );
        ctx.events.emit(event)?;
        self.next_event_id += 1;
        Ok(())
    }
}
