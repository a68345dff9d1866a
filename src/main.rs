//! Market parameter simulation.
//!
//! Creates spot, perpetual and dated futures markets against in-memory
//! collaborators and prints what the generator derived. Set
//! `MARKET_PARAMS=<file.toml>` to override the default usd targets.

use anyhow::{Context as _, Result};
use chrono::{DateTime, TimeZone, Utc};
use market_params::telemetry::{init_tracing, DEFAULT_FILTER};
use market_params::*;
use rust_decimal_macros::dec;
use std::time::Duration;

struct Sim {
    height: u64,
    clock: FixedClock,
    tokens: InMemoryTokens,
    oracles: InMemoryOracles,
    positions: InMemoryPositions,
    sequence: InMemorySequence,
    events: EventCollector,
}

impl Sim {
    fn new() -> Self {
        let tokens = InMemoryTokens::new()
            .with(Token::new("eth", "ETH", "Ether", 18))
            .with(Token::new("btc", "BTC", "Bitcoin", 8))
            .with(Token::new("usdc", "USDC", "USD Coin", 6))
            .with(Token::new("usdc.axl", "USDC", "Axelar USD Coin", 6))
            .with(Token::new("luna", "LUNA", "Terra", 6).inactive());
        Self {
            height: 100,
            clock: FixedClock(Utc.with_ymd_and_hms(2029, 6, 1, 0, 0, 0).unwrap()),
            tokens,
            oracles: InMemoryOracles::new(["DETH", "DXBT"]),
            positions: InMemoryPositions::new(),
            sequence: InMemorySequence::default(),
            events: EventCollector::new(),
        }
    }

    fn ctx(&mut self) -> market_params::Context<'_> {
        market_params::Context {
            block_height: self.height,
            clock: &self.clock,
            tokens: &self.tokens,
            oracles: &self.oracles,
            positions: &self.positions,
            sequence: &mut self.sequence,
            events: &mut self.events,
        }
    }
}

fn main() -> Result<()> {
    init_tracing(DEFAULT_FILTER);

    println!("Market Parameter Simulation\n");

    let params = load_params()?;
    let mut engine = Engine::new(EngineConfig {
        params,
        ..EngineConfig::default().with_secondary_index()
    });
    let mut sim = Sim::new();

    scenario_1_spot(&mut engine, &mut sim)?;
    scenario_2_futures(&mut engine, &mut sim)?;
    scenario_3_display_name_collision(&mut engine, &mut sim)?;
    scenario_4_rejections(&mut engine, &mut sim);
    scenario_5_fees(&mut engine, &mut sim)?;
    scenario_6_settlement_and_genesis(&mut engine, &mut sim)?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn load_params() -> Result<MarketParams> {
    match std::env::var("MARKET_PARAMS") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            MarketParams::from_toml_str(&raw).with_context(|| format!("parsing {path}"))
        }
        Err(_) => Ok(MarketParams::default()),
    }
}

fn print_market(market: &Market) {
    println!("  {} ({})", market.display_name, market.name);
    println!("    {}", market.description);
    println!(
        "    lot {}  tick {}  min qty {}",
        market.lot_size, market.tick_size, market.min_quantity
    );
    if market.is_futures() {
        println!(
            "    impact {}  liq ticket {}  im {}  mm ratio {}",
            market.impact_size,
            market.max_liquidation_order_ticket,
            market.initial_margin_base,
            market.maintenance_margin_ratio
        );
    }
}

fn scenario_1_spot(engine: &mut Engine, sim: &mut Sim) -> Result<()> {
    println!("Scenario 1: Spot Markets\n");

    let eth = engine.create_market(
        &mut sim.ctx(),
        CreateMarketRequest::spot("eth", "usdc", dec!(2000), dec!(1)),
    )?;
    print_market(&eth);

    let btc = engine.create_market(
        &mut sim.ctx(),
        CreateMarketRequest::spot("btc", "usdc", dec!(30000), dec!(1)),
    )?;
    print_market(&btc);
    println!();
    Ok(())
}

fn scenario_2_futures(engine: &mut Engine, sim: &mut Sim) -> Result<()> {
    println!("Scenario 2: Perpetual and Dated Futures\n");

    let perp = engine.create_market(
        &mut sim.ctx(),
        CreateMarketRequest::perpetual("btc", "usdc", dec!(30000), dec!(1), "DXBT"),
    )?;
    print_market(&perp);

    let expiry: DateTime<Utc> = Utc.with_ymd_and_hms(2029, 12, 31, 8, 0, 0).unwrap();
    let dated = engine.create_market(
        &mut sim.ctx(),
        CreateMarketRequest::futures("btc", "usdc", dec!(30000), dec!(1), "DXBT", expiry),
    )?;
    print_market(&dated);
    println!();
    Ok(())
}

fn scenario_3_display_name_collision(engine: &mut Engine, sim: &mut Sim) -> Result<()> {
    println!("Scenario 3: Display Name Collision\n");

    // bridged usdc shares the USDC symbol
    let market = engine.create_market(
        &mut sim.ctx(),
        CreateMarketRequest::spot("eth", "usdc.axl", dec!(2000), dec!(1)),
    )?;
    println!("  ETH/usdc.axl gets {}\n", market.display_name);
    Ok(())
}

fn scenario_4_rejections(engine: &mut Engine, sim: &mut Sim) {
    println!("Scenario 4: Rejected Requests\n");

    let requests = [
        ("same base and quote", CreateMarketRequest::spot("eth", "eth", dec!(2000), dec!(2000))),
        ("inactive token", CreateMarketRequest::spot("luna", "usdc", dec!(1), dec!(1))),
        ("duplicate key", CreateMarketRequest::spot("eth", "usdc", dec!(2100), dec!(1))),
        ("implausible price", CreateMarketRequest::spot("btc", "eth", dec!(1000000000000000000), dec!(1))),
        ("unknown oracle", CreateMarketRequest::perpetual("eth", "usdc", dec!(2000), dec!(1), "DSOL")),
    ];
    for (label, request) in requests {
        match engine.create_market(&mut sim.ctx(), request) {
            Ok(market) => println!("  {label}: unexpectedly created {}", market.name),
            Err(e) => println!("  {label}: {:?} - {e}", e.kind()),
        }
    }
    println!();
}

fn scenario_5_fees(engine: &mut Engine, sim: &mut Sim) -> Result<()> {
    println!("Scenario 5: Fee Tiers\n");

    engine.set_fee_structure(
        &mut sim.ctx(),
        FeeStructure::new(
            FeeCategory::MarketType(MarketType::Spot),
            vec![
                FeeTier::new(0, dec!(0.001), dec!(0.0025)),
                FeeTier::new(10_000, dec!(0.0005), dec!(0.002)),
            ],
        ),
    )?;
    engine.add_fee_tier(
        &mut sim.ctx(),
        FeeCategory::MarketType(MarketType::Spot),
        FeeTier::new(100_000, dec!(-0.0001), dec!(0.001)),
    )?;
    engine.set_fee_structure(
        &mut sim.ctx(),
        FeeStructure::new(
            FeeCategory::Market("mkt/2".to_string()),
            vec![FeeTier::new(0, dec!(0), dec!(0.0015))],
        ),
    )?;

    for (name, stake) in [("mkt/1", 0), ("mkt/1", 250_000), ("mkt/2", 250_000)] {
        if let Some(tier) = engine.effective_fee_tier(name, stake)? {
            println!(
                "  {name} stake {stake}: maker {} taker {}",
                tier.maker_fee, tier.taker_fee
            );
        }
    }
    println!();
    Ok(())
}

fn scenario_6_settlement_and_genesis(engine: &mut Engine, sim: &mut Sim) -> Result<()> {
    println!("Scenario 6: Settlement and Genesis Export\n");

    sim.height = 500;
    let settled = engine.settle_market(&mut sim.ctx(), "mkt/4")?;
    println!(
        "  {} settled at height {}, active: {}",
        settled.display_name, settled.closed_block_height, settled.is_active
    );

    engine.update_perpetuals_funding_interval(&mut sim.ctx(), Duration::from_secs(8 * 3600))?;

    let genesis = engine.export_genesis(&sim.sequence)?;
    println!(
        "  genesis: {} markets, {} fee structures, next market sequence {}",
        genesis.markets.len(),
        genesis.fee_structures.len(),
        genesis.market_name_sequence
    );
    println!("  events emitted: {}", sim.events.events().len());
    Ok(())
}
