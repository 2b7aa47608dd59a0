//! Whole-pipeline tests: snapshots in, signal events and position
//! bookkeeping out, with every analyzer running for real.

use crate::bot::{SignalBot, SignalEvent};
use crate::config::Config;
use crate::models::{
    BundleAnalysis, HolderInfo, LiquidityInfo, Position, SecurityInfo, SecurityTier, SellTrigger,
    SellType, StrategyKind, TaSnapshot, TokenSnapshot, WhaleActivity,
};
use crate::tests::common::{base_snapshot, candles_from_closes};
use std::collections::HashSet;
use std::sync::Arc;

fn bot() -> SignalBot {
    SignalBot::new(Arc::new(Config::default()), HashSet::new())
}

fn clean_security() -> SecurityInfo {
    SecurityInfo {
        mint_authority_disabled: Some(true),
        freeze_authority_disabled: Some(true),
        dev_holdings_percent: Some(0.5),
        bundler_analysis: Some(BundleAnalysis {
            total_bundled_percent: Some(2.0),
            top_bundle_percent: Some(1.0),
            fresh_wallet_bundles: Some(false),
        }),
        is_copycat: Some(false),
    }
}

/// A token that survives screening, scores SAFE, and shows a sustained
/// uptrend with whale accumulation at the given spot price.
fn trending_token(price: f64) -> TokenSnapshot {
    let mut token = base_snapshot("TOK1", "ROCKET", Some(500_000.0), Some(70_000.0));
    token.security = Some(clean_security());
    token.liquidity = Some(LiquidityInfo {
        pool_size_usd: Some(50_000.0),
        lp_burned_percent: Some(100.0),
    });
    token.holders = Some(HolderInfo {
        count: Some(1_200),
        top10_holder_percent: Some(10.0),
    });
    token.technical_analysis = Some(TaSnapshot {
        price_usd: Some(price),
    });
    token.whale_activity = Some(WhaleActivity {
        net_buy_volume_last_15_min_usd: Some(2_000.0),
        distinct_buying_whales: Some(3),
    });
    let closes: Vec<f64> = (0..45).map(|i| price * 1.01f64.powi(i - 44)).collect();
    token
        .historical_candle_data
        .insert("1m".to_string(), candles_from_closes(&closes));
    token
}

#[test]
fn test_cycle_emits_buy_and_opens_position() {
    let mut bot = bot();
    let events = bot.evaluate_cycle(vec![trending_token(0.0001)]);

    assert_eq!(events.len(), 1);
    let SignalEvent::Buy(signal) = &events[0] else {
        panic!("expected a buy event, got {:?}", events[0]);
    };
    // A steady climb reads as BULLISH_ABOVE with heavy volume: the AsiaTime
    // path confirms even while RSI is pinned overbought.
    assert_eq!(signal.strategy, StrategyKind::AsiaTime);
    assert!(signal.confidence >= 0.6);

    let position = bot.positions().get("TOK1").expect("position should be open");
    assert_eq!(position.strategy, StrategyKind::AsiaTime);
    assert_eq!(position.entry_tier, SecurityTier::Safe);
    // Entry is recorded at the middle of the suggested band.
    assert!((position.entry_price - 0.0001).abs() < 1e-12);
}

#[test]
fn test_open_position_takes_sell_path_and_stop_loss_closes_it() {
    let mut bot = bot();
    bot.evaluate_cycle(vec![trending_token(0.0001)]);
    assert_eq!(bot.positions().len(), 1);

    // Price collapses below the 25% stop. The chart itself still looks
    // bullish, but with a position open only the sell path runs.
    let mut crashed = trending_token(0.0001);
    crashed.technical_analysis = Some(TaSnapshot {
        price_usd: Some(0.00007),
    });
    let events = bot.evaluate_cycle(vec![crashed]);

    assert_eq!(events.len(), 1);
    let SignalEvent::Sell(signal) = &events[0] else {
        panic!("expected a sell event, got {:?}", events[0]);
    };
    assert_eq!(signal.sell_type, SellType::StopLoss);
    assert_eq!(signal.trigger, SellTrigger::StopLoss);
    assert!(bot.positions().is_empty());
}

#[test]
fn test_security_degradation_closes_position() {
    let mut bot = bot();
    let position = Position::new(0.0001, 1_000.0, StrategyKind::MomentumRider, SecurityTier::Safe);
    bot.positions_mut()
        .open("TOK1", position)
        .expect("registry starts empty");

    // The security group vanishes from the feed: the analyzer scores the
    // token SCAM_LIKELY and the sell path must evacuate.
    let mut token = trending_token(0.0001);
    token.security = None;
    let events = bot.evaluate_cycle(vec![token]);

    assert_eq!(events.len(), 1);
    let SignalEvent::Sell(signal) = &events[0] else {
        panic!("expected a sell event, got {:?}", events[0]);
    };
    assert_eq!(signal.trigger, SellTrigger::SecurityEmergency);
    assert!(bot.positions().is_empty());
}

#[test]
fn test_screened_out_token_produces_nothing() {
    let mut bot = bot();
    let mut token = trending_token(0.0001);
    token.market_cap = Some(5_000.0);
    let events = bot.evaluate_cycle(vec![token]);
    assert!(events.is_empty());
    assert!(bot.positions().is_empty());
}

#[test]
fn test_risky_token_is_blocked_before_strategies() {
    let mut bot = bot();
    let mut token = trending_token(0.0001);
    // Enabled mint authority is an instant critical failure.
    if let Some(sec) = token.security.as_mut() {
        sec.mint_authority_disabled = Some(false);
    }
    let events = bot.evaluate_cycle(vec![token]);
    assert!(events.is_empty());
    assert!(bot.positions().is_empty());
}

#[test]
fn test_token_without_history_produces_nothing() {
    let mut bot = bot();
    let mut token = trending_token(0.0001);
    token.historical_candle_data.clear();
    let events = bot.evaluate_cycle(vec![token]);
    assert!(events.is_empty());
}

#[test]
fn test_one_bad_token_does_not_block_the_rest() {
    let mut bot = bot();
    let mut starved = trending_token(0.0001);
    starved.token_id = "TOK0".to_string();
    starved.historical_candle_data.clear();
    let events = bot.evaluate_cycle(vec![starved, trending_token(0.0001)]);
    assert_eq!(events.len(), 1);
    assert!(bot.positions().contains("TOK1"));
}
