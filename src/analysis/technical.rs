use crate::config::TechnicalConfig;
use crate::models::{
    Candle, ChartPattern, EmaCross, MacdState, RsiState, TechnicalResult, TokenSnapshot,
};
use log::debug;

/// Window of candles inspected for the floor-formation pattern.
const FLOOR_WINDOW: usize = 12;
/// Lows within this fraction of the window minimum count as floor touches.
const FLOOR_TOLERANCE: f64 = 0.02;
/// Minimum close lift off the floor for a confirmed bounce.
const FLOOR_LIFT: f64 = 1.05;
/// Minimum close gain over the last five candles for a hockey stick.
const HOCKEY_STICK_RUN: f64 = 0.50;

/// Computes EMA/RSI/MACD over a token's historical candle series and
/// classifies each into a discrete state. Prefers the "1m" series, falls
/// back to "5m"; with insufficient history every field stays unset.
#[derive(Debug, Clone)]
pub struct TechnicalAnalyzer {
    ema_short_period: usize,
    ema_long_period: usize,
    rsi_period: usize,
    rsi_overbought: f64,
    rsi_oversold: f64,
    macd_fast_period: usize,
    macd_slow_period: usize,
    macd_signal_period: usize,
}

impl TechnicalAnalyzer {
    pub fn new(config: &TechnicalConfig) -> Self {
        Self {
            ema_short_period: config.ema_short_period,
            ema_long_period: config.ema_long_period,
            rsi_period: config.rsi_period,
            rsi_overbought: config.rsi_overbought,
            rsi_oversold: config.rsi_oversold,
            macd_fast_period: config.macd_fast_period,
            macd_slow_period: config.macd_slow_period,
            macd_signal_period: config.macd_signal_period,
        }
    }

    /// Candles needed before any indicator state is reported. The slow MACD
    /// EMA is the binding constraint with default periods (26).
    fn min_candles(&self) -> usize {
        self.ema_long_period
            .max(self.rsi_period + 1)
            .max(self.macd_slow_period)
    }

    pub fn analyze(&self, token: &TokenSnapshot) -> TechnicalResult {
        let candles = match self.select_series(token) {
            Some(c) => c,
            None => {
                debug!(
                    "TA: not enough candle history for {} on primary timeframes",
                    token.ticker
                );
                return TechnicalResult::empty(&token.token_id);
            }
        };
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let mut result = TechnicalResult::empty(&token.token_id);

        let short = ema_series(&closes, self.ema_short_period);
        let long = ema_series(&closes, self.ema_long_period);
        result.ema_short = short.last().copied();
        result.ema_long = long.last().copied();
        result.ema_cross = Some(classify_ema_cross(&short, &long));

        let rsi = rsi_series(&closes, self.rsi_period);
        if let Some(&current) = rsi.last() {
            result.rsi = Some(current);
            result.rsi_state = Some(self.classify_rsi(&rsi));
        }

        let (macd, signal, hist) = macd_series(
            &closes,
            self.macd_fast_period,
            self.macd_slow_period,
            self.macd_signal_period,
        );
        result.macd = macd.last().copied();
        result.macd_signal = signal.last().copied();
        result.macd_histogram = hist.last().copied();
        if !hist.is_empty() {
            result.macd_state = Some(classify_macd(&hist));
        }

        result.pattern = self.detect_pattern(candles);
        result
    }

    fn select_series<'a>(&self, token: &'a TokenSnapshot) -> Option<&'a [Candle]> {
        let need = self.min_candles();
        for timeframe in ["1m", "5m"] {
            if let Some(candles) = token.historical_candle_data.get(timeframe) {
                if candles.len() >= need {
                    return Some(candles.as_slice());
                }
            }
        }
        None
    }

    fn classify_rsi(&self, rsi: &[f64]) -> RsiState {
        let current = rsi[rsi.len() - 1];
        if current > self.rsi_overbought {
            RsiState::Overbought
        } else if current < self.rsi_oversold {
            RsiState::Oversold
        } else if rsi.len() >= 2 && current > rsi[rsi.len() - 2] {
            RsiState::NeutralRising
        } else {
            RsiState::NeutralFalling
        }
    }

    fn detect_pattern(&self, candles: &[Candle]) -> Option<ChartPattern> {
        detect_hockey_stick(candles).or_else(|| detect_floor_formation(candles))
    }
}

/// EMA seeded with the SMA of the first `period` values. The returned series
/// starts at input index `period - 1`.
fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = values[..period].iter().sum::<f64>() / period as f64;
    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(prev);
    for &v in &values[period..] {
        prev = (v - prev) * k + prev;
        out.push(prev);
    }
    out
}

/// RSI with Wilder smoothing. The returned series starts at input index
/// `period`. A series with no movement at all reports the midpoint 50.
fn rsi_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() <= period {
        return Vec::new();
    }
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in values[..=period].windows(2) {
        let delta = pair[1] - pair[0];
        if delta >= 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }
    let mut avg_gain = gains / period as f64;
    let mut avg_loss = losses / period as f64;
    let mut out = Vec::with_capacity(values.len() - period);
    out.push(rsi_value(avg_gain, avg_loss));
    for pair in values[period..].windows(2) {
        let delta = pair[1] - pair[0];
        let (gain, loss) = if delta >= 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        out.push(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Standard MACD construction: EMA(fast) - EMA(slow), signal = EMA of the
/// MACD line, histogram = macd - signal. Signal and histogram stay empty
/// when the MACD line is shorter than the signal period.
fn macd_series(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let fast_ema = ema_series(values, fast);
    let slow_ema = ema_series(values, slow);
    if slow_ema.is_empty() || fast >= slow {
        return (Vec::new(), Vec::new(), Vec::new());
    }
    let offset = slow - fast;
    let macd: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, &s)| fast_ema[i + offset] - s)
        .collect();
    let sig = ema_series(&macd, signal);
    let hist: Vec<f64> = if sig.is_empty() {
        Vec::new()
    } else {
        let off = macd.len() - sig.len();
        sig.iter()
            .enumerate()
            .map(|(i, &s)| macd[i + off] - s)
            .collect()
    };
    (macd, sig, hist)
}

fn classify_ema_cross(short: &[f64], long: &[f64]) -> EmaCross {
    if short.len() < 2 || long.len() < 2 {
        return EmaCross::Neutral;
    }
    let s_last = short[short.len() - 1];
    let s_prev = short[short.len() - 2];
    let l_last = long[long.len() - 1];
    let l_prev = long[long.len() - 2];
    if s_last > l_last && s_prev <= l_prev {
        EmaCross::BullishCrossRecent
    } else if s_last < l_last && s_prev >= l_prev {
        EmaCross::BearishCrossRecent
    } else if s_last > l_last {
        EmaCross::BullishAbove
    } else if s_last < l_last {
        EmaCross::BearishBelow
    } else {
        EmaCross::Neutral
    }
}

fn classify_macd(hist: &[f64]) -> MacdState {
    let current = hist[hist.len() - 1];
    let prev = if hist.len() >= 2 {
        Some(hist[hist.len() - 2])
    } else {
        None
    };
    if current > 0.0 && prev.map_or(true, |p| p <= 0.0) {
        MacdState::BullishCrossHist
    } else if current < 0.0 && prev.map_or(true, |p| p >= 0.0) {
        MacdState::BearishCrossHist
    } else if current > 0.0 {
        MacdState::BullishMomentumHist
    } else if current < 0.0 {
        MacdState::BearishMomentumHist
    } else {
        MacdState::Neutral
    }
}

/// Sharp recent acceleration: a large close gain over the last five candles,
/// more than half of it in the final two, on at least average volume.
fn detect_hockey_stick(candles: &[Candle]) -> Option<ChartPattern> {
    if candles.len() < 6 {
        return None;
    }
    let last = &candles[candles.len() - 1];
    let base = &candles[candles.len() - 6];
    if base.close <= 0.0 {
        return None;
    }
    let run = (last.close - base.close) / base.close;
    if run < HOCKEY_STICK_RUN {
        return None;
    }
    let knee = &candles[candles.len() - 3];
    if knee.close <= 0.0 {
        return None;
    }
    let late_gain = (last.close - knee.close) / knee.close;
    if late_gain < run * 0.5 {
        return None;
    }
    let window = &candles[candles.len() - 6..candles.len() - 1];
    let avg_volume = window.iter().map(|c| c.volume).sum::<f64>() / window.len() as f64;
    if last.volume < avg_volume {
        return None;
    }
    Some(ChartPattern::HockeyStick)
}

/// Double bounce off a recent floor: two separated lows within a tight band
/// of the window minimum, with the current close lifted off that floor.
fn detect_floor_formation(candles: &[Candle]) -> Option<ChartPattern> {
    if candles.len() < FLOOR_WINDOW {
        return None;
    }
    let window = &candles[candles.len() - FLOOR_WINDOW..];
    let floor = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    if !floor.is_finite() || floor <= 0.0 {
        return None;
    }
    let touches: Vec<usize> = window
        .iter()
        .enumerate()
        .filter(|(_, c)| c.low <= floor * (1.0 + FLOOR_TOLERANCE))
        .map(|(i, _)| i)
        .collect();
    let first = *touches.first()?;
    let last = *touches.last()?;
    // Two distinct bounces, not one flat stretch.
    if last - first < 2 {
        return None;
    }
    let current = window[window.len() - 1].close;
    if current < floor * FLOOR_LIFT {
        return None;
    }
    Some(ChartPattern::FloorFormationDoubleBounce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TechnicalConfig;
    use crate::tests::common::{base_snapshot, candles_from_closes};

    fn analyzer() -> TechnicalAnalyzer {
        TechnicalAnalyzer::new(&TechnicalConfig::default())
    }

    fn snapshot_with_closes(timeframe: &str, closes: &[f64]) -> crate::models::TokenSnapshot {
        let mut token = base_snapshot("TOK1", "ROCKET", Some(85_000.0), Some(15_200.0));
        token
            .historical_candle_data
            .insert(timeframe.to_string(), candles_from_closes(closes));
        token
    }

    #[test]
    fn test_insufficient_history_leaves_all_fields_unset() {
        let token = snapshot_with_closes("1m", &[1.0; 10]);
        let result = analyzer().analyze(&token);
        assert!(result.ema_short.is_none());
        assert!(result.ema_cross.is_none());
        assert!(result.rsi.is_none());
        assert!(result.macd_state.is_none());
        assert!(result.pattern.is_none());
    }

    #[test]
    fn test_no_matching_timeframe_leaves_all_fields_unset() {
        let token = snapshot_with_closes("15m", &[1.0; 40]);
        let result = analyzer().analyze(&token);
        assert!(result.ema_cross.is_none());
    }

    #[test]
    fn test_falls_back_to_5m_series() {
        let token = snapshot_with_closes("5m", &[1.0; 40]);
        let result = analyzer().analyze(&token);
        assert!(result.ema_cross.is_some());
    }

    #[test]
    fn test_flat_then_jump_is_bullish_cross_recent() {
        // Flat closes leave both EMAs equal; the final up candle pushes the
        // short EMA above the long one between the last two candles.
        let mut closes = vec![1.0; 40];
        closes.push(1.2);
        let token = snapshot_with_closes("1m", &closes);
        let result = analyzer().analyze(&token);
        assert_eq!(result.ema_cross, Some(EmaCross::BullishCrossRecent));
        // All gains, no losses: RSI pegs at 100.
        assert_eq!(result.rsi_state, Some(RsiState::Overbought));
        // Histogram turns positive from exactly zero.
        assert_eq!(result.macd_state, Some(MacdState::BullishCrossHist));
        assert!(result.macd_histogram.unwrap() > 0.0);
    }

    #[test]
    fn test_flat_then_drop_is_bearish_cross_recent() {
        let mut closes = vec![1.0; 40];
        closes.push(0.8);
        let token = snapshot_with_closes("1m", &closes);
        let result = analyzer().analyze(&token);
        assert_eq!(result.ema_cross, Some(EmaCross::BearishCrossRecent));
        assert_eq!(result.rsi_state, Some(RsiState::Oversold));
        assert_eq!(result.macd_state, Some(MacdState::BearishCrossHist));
    }

    #[test]
    fn test_sustained_uptrend_is_bullish_above() {
        // Steady 1% climbs: the short EMA has been above the long one for
        // many candles, so no recent cross.
        let closes: Vec<f64> = (0..45).map(|i| 1.0 * 1.01f64.powi(i)).collect();
        let token = snapshot_with_closes("1m", &closes);
        let result = analyzer().analyze(&token);
        assert_eq!(result.ema_cross, Some(EmaCross::BullishAbove));
        assert_eq!(result.macd_state, Some(MacdState::BullishMomentumHist));
        assert!(result.ema_short.unwrap() > result.ema_long.unwrap());
    }

    #[test]
    fn test_sustained_downtrend_is_bearish_below() {
        let closes: Vec<f64> = (0..45).map(|i| 100.0 * 0.99f64.powi(i)).collect();
        let token = snapshot_with_closes("1m", &closes);
        let result = analyzer().analyze(&token);
        assert_eq!(result.ema_cross, Some(EmaCross::BearishBelow));
        assert_eq!(result.macd_state, Some(MacdState::BearishMomentumHist));
    }

    #[test]
    fn test_flat_series_rsi_is_midpoint() {
        let token = snapshot_with_closes("1m", &[1.0; 40]);
        let result = analyzer().analyze(&token);
        let rsi = result.rsi.unwrap();
        assert!((rsi - 50.0).abs() < 1e-9);
        assert_eq!(result.rsi_state, Some(RsiState::NeutralFalling));
    }

    #[test]
    fn test_macd_signal_unavailable_on_short_series() {
        // 26 candles: enough for the MACD value but not its signal line.
        let closes: Vec<f64> = (0..26).map(|i| 1.0 + 0.01 * i as f64).collect();
        let token = snapshot_with_closes("1m", &closes);
        let result = analyzer().analyze(&token);
        assert!(result.macd.is_some());
        assert!(result.macd_signal.is_none());
        assert!(result.macd_state.is_none());
        // EMA and RSI are still classified.
        assert!(result.ema_cross.is_some());
        assert!(result.rsi_state.is_some());
    }

    #[test]
    fn test_ema_series_matches_hand_computation() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ema = ema_series(&values, 3);
        // Seed = SMA(1,2,3) = 2; k = 0.5.
        assert_eq!(ema.len(), 3);
        assert!((ema[0] - 2.0).abs() < 1e-12);
        assert!((ema[1] - 3.0).abs() < 1e-12);
        assert!((ema[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_bounds() {
        let rising: Vec<f64> = (0..30).map(|i| 1.0 + i as f64).collect();
        let rsi = rsi_series(&rising, 14);
        assert!(rsi.iter().all(|&v| (0.0..=100.0).contains(&v)));
        assert!((rsi.last().unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_hockey_stick_detected_on_sharp_acceleration() {
        let mut closes = vec![1.0; 35];
        // Final five candles: slow start, then the move concentrates late.
        closes.extend_from_slice(&[1.02, 1.05, 1.1, 1.3, 1.6]);
        let mut candles = candles_from_closes(&closes);
        // Breakout candle carries above-average volume.
        if let Some(last) = candles.last_mut() {
            last.volume = 10_000.0;
        }
        let mut token = base_snapshot("TOK1", "ROCKET", Some(85_000.0), Some(15_200.0));
        token.historical_candle_data.insert("1m".to_string(), candles);
        let result = analyzer().analyze(&token);
        assert_eq!(result.pattern, Some(ChartPattern::HockeyStick));
    }

    #[test]
    fn test_gradual_rise_is_not_a_hockey_stick() {
        let closes: Vec<f64> = (0..45).map(|i| 1.0 * 1.01f64.powi(i)).collect();
        let token = snapshot_with_closes("1m", &closes);
        let result = analyzer().analyze(&token);
        assert!(result.pattern.is_none());
    }

    #[test]
    fn test_floor_formation_double_bounce() {
        // Two dips to the same floor inside the window, then a lift-off.
        let mut closes = vec![2.0; 30];
        closes.extend_from_slice(&[
            1.5, 1.0, 1.2, 1.4, 1.3, 1.01, 1.2, 1.3, 1.35, 1.4, 1.45, 1.5,
        ]);
        let token = snapshot_with_closes("1m", &closes);
        let result = analyzer().analyze(&token);
        assert_eq!(result.pattern, Some(ChartPattern::FloorFormationDoubleBounce));
    }

    #[test]
    fn test_determinism() {
        let closes: Vec<f64> = (0..45).map(|i| 1.0 * 1.01f64.powi(i)).collect();
        let token = snapshot_with_closes("1m", &closes);
        let a = analyzer().analyze(&token);
        let b = analyzer().analyze(&token);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
