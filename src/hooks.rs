//! Listeners notified after a market is written.
//!
//! Hooks are registered explicitly on the engine and run synchronously, in
//! registration order, after the store write and before the event is
//! emitted. There is no global registry.

use crate::market::Market;

pub trait MarketHooks {
    fn after_market_created(&mut self, market: &Market);

    fn after_market_updated(&mut self, _market: &Market) {}
}

/// Ordered list of hooks.
#[derive(Default)]
pub struct HookSet {
    hooks: Vec<Box<dyn MarketHooks>>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Box<dyn MarketHooks>) {
        self.hooks.push(hook);
    }

    pub fn after_market_created(&mut self, market: &Market) {
        for hook in &mut self.hooks {
            hook.after_market_created(market);
        }
    }

    pub fn after_market_updated(&mut self, market: &Market) {
        for hook in &mut self.hooks {
            hook.after_market_updated(market);
        }
    }
}

impl std::fmt::Debug for HookSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookSet").field("len", &self.hooks.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl MarketHooks for Recorder {
        fn after_market_created(&mut self, market: &Market) {
            self.log.borrow_mut().push(format!("{}:{}", self.tag, market.name));
        }
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = HookSet::new();
        hooks.register(Box::new(Recorder { tag: "pricing", log: log.clone() }));
        hooks.register(Box::new(Recorder { tag: "liquidity", log: log.clone() }));

        let market = Market::spot("mkt/1", "ETH_USDC", "eth", "usdc");
        hooks.after_market_created(&market);
        hooks.after_market_updated(&market);

        assert_eq!(*log.borrow(), vec!["pricing:mkt/1", "liquidity:mkt/1"]);
    }
}
