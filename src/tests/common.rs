use crate::models::{
    Candle, EmaCross, MacdState, RsiState, SecurityResult, SecurityTier, TechnicalResult,
    TokenSnapshot, VolumeInfo, WhaleSummary,
};
use chrono::{Duration, TimeZone, Utc};

/// Minimal snapshot with a market cap and 5-minute volume; everything else
/// absent.
pub fn base_snapshot(
    token_id: &str,
    ticker: &str,
    market_cap: Option<f64>,
    five_min_volume: Option<f64>,
) -> TokenSnapshot {
    TokenSnapshot {
        token_id: token_id.to_string(),
        timestamp_collected: "2024-07-29T10:00:05Z".to_string(),
        source: "test".to_string(),
        contract_address: format!("{}_contract", token_id),
        ticker: ticker.to_string(),
        name: format!("{} Token", ticker),
        market_cap,
        liquidity: None,
        volume: Some(VolumeInfo {
            five_min_usd: five_min_volume,
            one_hr_usd: None,
            twenty_four_hr_usd: None,
        }),
        holders: None,
        security: None,
        technical_analysis: None,
        whale_activity: None,
        historical_candle_data: Default::default(),
        transaction_stream: Vec::new(),
    }
}

/// One-minute candles from a close series. Open/high/low are derived so the
/// series is well-formed without mattering to close-based indicators.
pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2024, 7, 29, 9, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: start + Duration::minutes(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000.0,
        })
        .collect()
}

pub fn security_result(token_id: &str, tier: SecurityTier) -> SecurityResult {
    SecurityResult {
        token_id: token_id.to_string(),
        tier,
        findings: Vec::new(),
    }
}

pub fn whale_summary(token_id: &str, net_buy: f64, buyers: u32) -> WhaleSummary {
    WhaleSummary {
        token_id: token_id.to_string(),
        net_buy_volume_usd: net_buy,
        distinct_buyers: buyers,
    }
}

pub fn empty_technical(token_id: &str) -> TechnicalResult {
    TechnicalResult::empty(token_id)
}

/// Fully bullish indicator state below every overbought ceiling.
pub fn bullish_technical(token_id: &str) -> TechnicalResult {
    TechnicalResult {
        token_id: token_id.to_string(),
        ema_short: Some(0.000105),
        ema_long: Some(0.000100),
        ema_cross: Some(EmaCross::BullishCrossRecent),
        rsi: Some(55.0),
        rsi_state: Some(RsiState::NeutralRising),
        macd: Some(0.000003),
        macd_signal: Some(0.000002),
        macd_histogram: Some(0.000001),
        macd_state: Some(MacdState::BullishMomentumHist),
        pattern: None,
    }
}
