//! Fee schedule and genesis tests.

mod common;

use common::{Fixture, RejectingSink};
use market_params::*;
use rust_decimal_macros::dec;

fn spot_default() -> FeeCategory {
    FeeCategory::MarketType(MarketType::Spot)
}

fn ladder() -> Vec<FeeTier> {
    vec![
        FeeTier::new(0, dec!(0.001), dec!(0.0025)),
        FeeTier::new(10_000, dec!(0.0005), dec!(0.002)),
    ]
}

fn engine_with_markets(fx: &mut Fixture) -> Engine {
    let mut engine = Engine::new(EngineConfig::default());
    engine
        .create_market(
            &mut fx.ctx(),
            CreateMarketRequest::spot("eth", "usdc", dec!(2000), dec!(1)),
        )
        .unwrap();
    engine
        .create_market(
            &mut fx.ctx(),
            CreateMarketRequest::spot("btc", "usdc", dec!(30000), dec!(1)),
        )
        .unwrap();
    engine
        .create_market(
            &mut fx.ctx(),
            CreateMarketRequest::perpetual("btc", "usdc", dec!(30000), dec!(1), "DXBT"),
        )
        .unwrap();
    fx.events.clear();
    engine
}

#[test]
fn set_fee_structure_emits_event() {
    let mut fx = Fixture::new();
    let mut engine = engine_with_markets(&mut fx);

    let structure = FeeStructure::new(spot_default(), ladder());
    engine.set_fee_structure(&mut fx.ctx(), structure.clone()).unwrap();

    assert_eq!(engine.fee_structure(&spot_default()), Some(structure.clone()));
    assert_eq!(
        fx.events.events()[0].payload,
        EventPayload::FeeStructureSet(structure)
    );
}

#[test]
fn effective_tier_prefers_market_override() {
    let mut fx = Fixture::new();
    let mut engine = engine_with_markets(&mut fx);
    engine
        .set_fee_structure(&mut fx.ctx(), FeeStructure::new(spot_default(), ladder()))
        .unwrap();
    engine
        .set_fee_structure(
            &mut fx.ctx(),
            FeeStructure::new(
                FeeCategory::Market("mkt/2".into()),
                vec![FeeTier::new(0, dec!(0), dec!(0.0015))],
            ),
        )
        .unwrap();

    let tier = engine.effective_fee_tier("mkt/1", 9_999).unwrap().unwrap();
    assert_eq!(tier.required_stake, 0);
    let tier = engine.effective_fee_tier("mkt/1", 10_000).unwrap().unwrap();
    assert_eq!(tier.taker_fee, dec!(0.002));
    let tier = engine.effective_fee_tier("mkt/2", 1_000_000).unwrap().unwrap();
    assert_eq!(tier.taker_fee, dec!(0.0015));

    // no futures ladder configured
    assert_eq!(engine.effective_fee_tier("mkt/3", 0).unwrap(), None);

    let err = engine.effective_fee_tier("mkt/9", 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn add_update_remove_tiers() {
    let mut fx = Fixture::new();
    let mut engine = engine_with_markets(&mut fx);
    let category = spot_default();

    engine
        .add_fee_tier(&mut fx.ctx(), category.clone(), FeeTier::new(0, dec!(0.001), dec!(0.003)))
        .unwrap();
    engine
        .add_fee_tier(&mut fx.ctx(), category.clone(), FeeTier::new(50_000, dec!(-0.0001), dec!(0.001)))
        .unwrap();
    engine
        .add_fee_tier(&mut fx.ctx(), category.clone(), FeeTier::new(5_000, dec!(0.0008), dec!(0.0025)))
        .unwrap();

    let stakes: Vec<u128> = engine
        .fee_structure(&category)
        .unwrap()
        .tiers
        .iter()
        .map(|t| t.required_stake)
        .collect();
    assert_eq!(stakes, vec![0, 5_000, 50_000]);

    engine
        .update_fee_tier(&mut fx.ctx(), category.clone(), FeeTier::new(5_000, dec!(0.0007), dec!(0.002)))
        .unwrap();
    let tier = engine.effective_fee_tier("mkt/1", 6_000).unwrap().unwrap();
    assert_eq!(tier.maker_fee, dec!(0.0007));

    engine.remove_fee_tier(&mut fx.ctx(), category.clone(), 50_000).unwrap();
    assert_eq!(engine.fee_structure(&category).unwrap().tiers.len(), 2);
    assert_eq!(fx.events.events().len(), 5);
}

#[test]
fn invalid_tier_changes_are_rejected() {
    let mut fx = Fixture::new();
    let mut engine = engine_with_markets(&mut fx);
    let category = spot_default();
    engine
        .set_fee_structure(&mut fx.ctx(), FeeStructure::new(category.clone(), ladder()))
        .unwrap();
    let before = engine.fee_schedule().clone();

    let err = engine
        .add_fee_tier(&mut fx.ctx(), category.clone(), FeeTier::new(10_000, dec!(0), dec!(0)))
        .unwrap_err();
    assert!(err.to_string().contains("duplicate"));

    let err = engine.remove_fee_tier(&mut fx.ctx(), category.clone(), 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFeeTier);

    let err = engine
        .update_fee_tier(&mut fx.ctx(), category.clone(), FeeTier::new(7, dec!(0), dec!(0)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFeeTier);

    let err = engine
        .remove_fee_tier(&mut fx.ctx(), FeeCategory::MarketType(MarketType::Futures), 0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFeeTier);

    let err = engine
        .set_fee_structure(&mut fx.ctx(), FeeStructure::new(category.clone(), Vec::new()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFeeTier);

    let err = engine
        .set_fee_structure(
            &mut fx.ctx(),
            FeeStructure::new(FeeCategory::Market("mkt/9".into()), ladder()),
        )
        .unwrap_err();
    assert_eq!(err, MarketError::MarketNotFound("mkt/9".into()));

    assert_eq!(engine.fee_schedule(), &before);
}

#[test]
fn rejected_event_restores_fee_schedule() {
    let mut fx = Fixture::new();
    let mut engine = engine_with_markets(&mut fx);
    let mut sink = RejectingSink;

    let err = engine
        .set_fee_structure(
            &mut fx.ctx_with_sink(&mut sink),
            FeeStructure::new(spot_default(), ladder()),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(engine.fee_structure(&spot_default()), None);
}

#[test]
fn genesis_export_import_round_trip() {
    let mut fx = Fixture::new();
    let mut engine = engine_with_markets(&mut fx);
    engine
        .set_fee_structure(&mut fx.ctx(), FeeStructure::new(spot_default(), ladder()))
        .unwrap();

    let exported = engine.export_genesis(&fx.sequence).unwrap();
    assert_eq!(exported.markets.len(), 3);
    assert_eq!(exported.market_name_sequence, 4);
    assert!(exported.validate().is_ok());

    let raw = exported.to_json().unwrap();
    let parsed = GenesisState::from_json(&raw).unwrap();

    let mut fresh = Engine::new(EngineConfig::default().with_secondary_index());
    let mut sequence = InMemorySequence::default();
    fresh.init_genesis(&parsed, &mut sequence).unwrap();

    assert_eq!(fresh.export_genesis(&sequence).unwrap(), exported);
    assert_eq!(fresh.index().unwrap().len(), 3);

    // naming continues where the exporting chain stopped
    let mut fx2 = Fixture::new();
    fx2.sequence = sequence;
    let market = fresh
        .create_market(
            &mut fx2.ctx(),
            CreateMarketRequest::perpetual("eth", "usdc", dec!(2000), dec!(1), "DETH"),
        )
        .unwrap();
    assert_eq!(market.name, "mkt/4");

    // imported keys still block duplicates
    let err = fresh
        .create_market(
            &mut fx2.ctx(),
            CreateMarketRequest::spot("eth", "usdc", dec!(2000), dec!(1)),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn invalid_genesis_is_rejected() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut sequence = InMemorySequence::default();

    let mut genesis = GenesisState::default();
    let mut market = Market::spot("mkt/1", "ETH_USDC", "eth", "usdc");
    market.mark_price_band = 1;
    genesis.markets.push(market);

    let err = engine.init_genesis(&genesis, &mut sequence).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidMarket);
    assert!(engine.store().is_empty());
}

#[test]
fn genesis_carries_shortened_funding_interval() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut sequence = InMemorySequence::default();
    let genesis = GenesisState::default().with_shortened_funding_interval();
    engine.init_genesis(&genesis, &mut sequence).unwrap();
    assert_eq!(
        engine.controlled_params().perpetuals_funding_interval,
        std::time::Duration::from_secs(60)
    );
}

#[test]
fn genesis_with_shared_market_key_is_rejected() {
    let mut engine = Engine::new(EngineConfig::default().with_secondary_index());
    let mut sequence = InMemorySequence::default();

    let mut genesis = GenesisState::default();
    genesis.markets.push(Market::spot("mkt/1", "ETH_USDC", "eth", "usdc"));
    genesis.markets.push(Market::spot("mkt/2", "ETH_USDC.2", "eth", "usdc"));
    genesis.market_name_sequence = 3;

    let err = engine.init_genesis(&genesis, &mut sequence).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(engine.store().is_empty());
    assert_eq!(engine.index().unwrap().len(), 0);
}
