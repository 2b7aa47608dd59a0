use crate::config::StrategyConfig;
use crate::models::{
    ChartPattern, EmaCross, RsiState, SecurityResult, SecurityTier, StrategyKind,
    TechnicalResult, TokenSnapshot, WhaleSummary,
};
use log::debug;

/// Determines which named strategies currently apply to a token. The
/// security tier gates everything: no strategy is ever suggested for a
/// HIGH_RISK or SCAM_LIKELY token. Predicates are independent; more than one
/// strategy can apply at once.
#[derive(Debug, Clone)]
pub struct StrategyEngine {
    asia_min_volume: f64,
    post_rug_min_volume: f64,
    post_rug_max_rsi: f64,
    momentum_min_volume: f64,
    momentum_max_rsi: f64,
    momentum_min_whale_net_buy: f64,
}

impl StrategyEngine {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            asia_min_volume: config.asia_min_volume,
            post_rug_min_volume: config.post_rug_min_volume,
            post_rug_max_rsi: config.post_rug_max_rsi,
            momentum_min_volume: config.momentum_min_volume,
            momentum_max_rsi: config.momentum_max_rsi,
            momentum_min_whale_net_buy: config.momentum_min_whale_net_buy,
        }
    }

    pub fn applicable(
        &self,
        token: &TokenSnapshot,
        ta: &TechnicalResult,
        whale: &WhaleSummary,
        security: &SecurityResult,
    ) -> Vec<StrategyKind> {
        if security.tier >= SecurityTier::HighRisk {
            debug!(
                "Strategies: {} gated out at tier {}",
                token.ticker, security.tier
            );
            return Vec::new();
        }

        let volume_5m = token.five_min_volume();
        let mut applicable = Vec::new();

        if self.asia_time_applies(ta, volume_5m) {
            applicable.push(StrategyKind::AsiaTime);
        }
        if self.post_rug_applies(ta, volume_5m) {
            applicable.push(StrategyKind::PostRug);
        }
        if self.momentum_rider_applies(ta, whale, volume_5m) {
            applicable.push(StrategyKind::MomentumRider);
        }

        applicable.sort();
        applicable.dedup();
        applicable
    }

    fn asia_time_applies(&self, ta: &TechnicalResult, volume_5m: f64) -> bool {
        ta.pattern == Some(ChartPattern::HockeyStick)
            || (ta.ema_cross == Some(EmaCross::BullishAbove) && volume_5m > self.asia_min_volume)
    }

    fn post_rug_applies(&self, ta: &TechnicalResult, volume_5m: f64) -> bool {
        let rsi_fits = match ta.rsi_state {
            Some(RsiState::Oversold) => true,
            Some(RsiState::NeutralRising) => {
                ta.rsi.map_or(false, |v| v < self.post_rug_max_rsi)
            }
            _ => false,
        };
        ta.pattern == Some(ChartPattern::FloorFormationDoubleBounce)
            && volume_5m > self.post_rug_min_volume
            && rsi_fits
    }

    fn momentum_rider_applies(
        &self,
        ta: &TechnicalResult,
        whale: &WhaleSummary,
        volume_5m: f64,
    ) -> bool {
        let bullish_ta = ta.ema_cross.map_or(false, |c| c.is_bullish())
            && ta.rsi_state != Some(RsiState::Overbought)
            && ta.rsi.map_or(false, |v| v < self.momentum_max_rsi)
            && ta.macd_state.map_or(false, |m| m.is_bullish());
        bullish_ta
            && volume_5m > self.momentum_min_volume
            && whale.net_buy_volume_usd > self.momentum_min_whale_net_buy
    }
}
