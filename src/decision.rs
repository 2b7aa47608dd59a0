use crate::config::DecisionConfig;
use crate::models::{
    BuySignal, ChartPattern, EmaCross, MacdState, Position, RsiState, SecurityResult,
    SecurityTier, SellSignal, SellTrigger, SellType, StrategyKind, TechnicalResult,
    TokenSnapshot, WhaleSummary,
};
use log::{debug, warn};

/// Half-width of the suggested entry band around the spot price.
const ENTRY_BAND: f64 = 0.005;

/// Converges the matched strategies and analyzer outputs into an actionable
/// buy or sell recommendation. Buy and sell generation are both pure
/// functions of their inputs; position bookkeeping stays with the caller.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    cfg: DecisionConfig,
}

impl DecisionEngine {
    pub fn new(config: &DecisionConfig) -> Self {
        Self { cfg: config.clone() }
    }

    /// Evaluates every matched strategy's confirmation predicate and emits
    /// the highest-confidence candidate. Ties break toward the earlier
    /// `StrategyKind` declaration order, which the matcher's output follows.
    pub fn generate_buy(
        &self,
        token: &TokenSnapshot,
        strategies: &[StrategyKind],
        ta: &TechnicalResult,
        whale: &WhaleSummary,
        security: &SecurityResult,
    ) -> Option<BuySignal> {
        if security.tier > SecurityTier::ModerateRisk {
            debug!(
                "Decision: skipping buy for {} at tier {}",
                token.ticker, security.tier
            );
            return None;
        }
        if strategies.is_empty() {
            return None;
        }
        let price = match token.spot_price() {
            Some(p) => p,
            None => {
                debug!("Decision: no spot price for {}, cannot size entry", token.ticker);
                return None;
            }
        };
        let volume_5m = token.five_min_volume();

        let mut best: Option<(StrategyKind, f64, Vec<String>)> = None;
        for &strategy in strategies {
            let Some(reasons) = self.confirm(strategy, ta, whale, volume_5m) else {
                continue;
            };
            let confidence = self.confidence(strategy, ta, whale, volume_5m);
            let better = match &best {
                Some((_, c, _)) => confidence > *c,
                None => true,
            };
            if better {
                best = Some((strategy, confidence, reasons));
            }
        }

        let (strategy, confidence, reasoning) = best?;
        if confidence < self.cfg.min_confidence_buy {
            debug!(
                "Decision: {} confidence {:.2} below minimum {:.2}",
                token.ticker, confidence, self.cfg.min_confidence_buy
            );
            return None;
        }
        Some(BuySignal {
            token_id: token.token_id.clone(),
            contract_address: token.contract_address.clone(),
            ticker: token.ticker.clone(),
            strategy,
            entry_range: (price * (1.0 - ENTRY_BAND), price * (1.0 + ENTRY_BAND)),
            confidence,
            reasoning,
        })
    }

    /// Strategy-specific confirmation: a tighter variant of the matcher's
    /// predicate with its own volume / whale-flow thresholds. Returns the
    /// reasoning trail on success.
    fn confirm(
        &self,
        strategy: StrategyKind,
        ta: &TechnicalResult,
        whale: &WhaleSummary,
        volume_5m: f64,
    ) -> Option<Vec<String>> {
        let mut reasons = vec![format!("Strategy: {}", strategy)];
        match strategy {
            StrategyKind::MomentumRider => {
                let confirmed = ta.ema_cross.map_or(false, |c| c.is_bullish())
                    && ta.rsi_state != Some(RsiState::Overbought)
                    && ta.rsi.map_or(false, |v| v < self.cfg.momentum_max_rsi_buy)
                    && ta.macd_state.map_or(false, |m| m.is_bullish())
                    && volume_5m > self.cfg.momentum_min_volume_buy_confirm
                    && whale.net_buy_volume_usd > self.cfg.momentum_min_whale_buy_confirm;
                if !confirmed {
                    return None;
                }
                reasons.push(format!(
                    "TA: EMA {}, RSI {} ({:.2}), MACD {}",
                    ta.ema_cross.unwrap_or(EmaCross::Neutral),
                    ta.rsi_state.map(|s| s.to_string()).unwrap_or_default(),
                    ta.rsi.unwrap_or(0.0),
                    ta.macd_state.map(|m| m.to_string()).unwrap_or_default(),
                ));
                reasons.push(format!("Volume: 5min vol ${:.0} > threshold", volume_5m));
                reasons.push(format!(
                    "Whales: net buy ${:.0} > threshold",
                    whale.net_buy_volume_usd
                ));
            }
            StrategyKind::PostRug => {
                let confirmed = ta.pattern == Some(ChartPattern::FloorFormationDoubleBounce)
                    && ta.rsi_state == Some(RsiState::NeutralRising)
                    && ta.rsi.map_or(false, |v| v < self.cfg.post_rug_max_rsi_buy)
                    && volume_5m > self.cfg.post_rug_min_volume_buy_confirm;
                if !confirmed {
                    return None;
                }
                reasons.push(format!(
                    "TA: pattern {}, RSI {} ({:.2})",
                    ChartPattern::FloorFormationDoubleBounce,
                    ta.rsi_state.map(|s| s.to_string()).unwrap_or_default(),
                    ta.rsi.unwrap_or(0.0),
                ));
                reasons.push(format!("Volume: 5min vol ${:.0} > threshold", volume_5m));
            }
            StrategyKind::AsiaTime => {
                let hockey = ta.pattern == Some(ChartPattern::HockeyStick);
                let strong_ema = ta.ema_cross == Some(EmaCross::BullishAbove)
                    && volume_5m > self.cfg.asia_min_volume_buy_confirm;
                if !hockey && !strong_ema {
                    return None;
                }
                reasons.push(format!(
                    "TA: pattern {}, EMA {}",
                    ta.pattern
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "Strong upward EMA".to_string()),
                    ta.ema_cross.unwrap_or(EmaCross::Neutral),
                ));
                reasons.push(format!(
                    "Volume: 5min vol ${:.0} during Asia window",
                    volume_5m
                ));
            }
        }
        Some(reasons)
    }

    /// Monotonic additive score: 0.5 base plus a fixed increment per
    /// corroborating signal, clamped to 1.0.
    fn confidence(
        &self,
        strategy: StrategyKind,
        ta: &TechnicalResult,
        whale: &WhaleSummary,
        volume_5m: f64,
    ) -> f64 {
        let mut score: f64 = 0.5;
        if ta.ema_cross == Some(EmaCross::BullishCrossRecent) {
            score += 0.10;
        }
        if ta.rsi_state == Some(RsiState::NeutralRising) {
            score += 0.05;
        }
        if ta.macd_state.map_or(false, |m| m.is_bullish()) {
            score += 0.10;
        }
        if volume_5m > self.volume_confirm_threshold(strategy) {
            score += 0.10;
        }
        if whale.net_buy_volume_usd > self.cfg.momentum_min_whale_buy_confirm {
            score += 0.10;
        }
        if strategy == StrategyKind::PostRug
            && ta.pattern == Some(ChartPattern::FloorFormationDoubleBounce)
        {
            score += 0.15;
        }
        score.min(1.0)
    }

    fn volume_confirm_threshold(&self, strategy: StrategyKind) -> f64 {
        match strategy {
            StrategyKind::MomentumRider => self.cfg.momentum_min_volume_buy_confirm,
            StrategyKind::PostRug => self.cfg.post_rug_min_volume_buy_confirm,
            StrategyKind::AsiaTime => self.cfg.asia_min_volume_buy_confirm,
        }
    }

    /// Sell conditions in strict priority order; the first match wins. No
    /// trigger leaves the position untouched.
    pub fn generate_sell(
        &self,
        token: &TokenSnapshot,
        position: &Position,
        ta: &TechnicalResult,
        security: &SecurityResult,
    ) -> Option<SellSignal> {
        let price = match token.spot_price() {
            Some(p) => p,
            None => {
                warn!(
                    "Decision: no spot price for {}, leaving position untouched",
                    token.ticker
                );
                return None;
            }
        };

        // 1. Stop loss.
        let stop_price = position.entry_price * (1.0 - self.cfg.stop_loss_percent);
        if price <= stop_price {
            return Some(self.sell(
                token,
                SellTrigger::StopLoss,
                price,
                SellType::StopLoss,
                vec![format!("Price hit stop loss level of ${:.6}", stop_price)],
                None,
            ));
        }

        // 2. Security degradation since entry.
        if security.tier >= SecurityTier::HighRisk && position.entry_tier < SecurityTier::HighRisk
        {
            return Some(self.sell(
                token,
                SellTrigger::SecurityEmergency,
                price,
                SellType::StopLoss,
                vec![format!("Security status degraded to {}", security.tier)],
                None,
            ));
        }

        // 3. Strategy-specific take profit.
        if position.strategy == StrategyKind::PostRug && position.entry_price > 0.0 {
            let multiplier = price / position.entry_price;
            if multiplier >= 1.0 + self.cfg.post_rug_take_profit_percent {
                return Some(self.sell(
                    token,
                    SellTrigger::TakeProfit(StrategyKind::PostRug),
                    price,
                    SellType::TakeProfitFull,
                    vec![format!(
                        "PostRug strategy hit {:.0}% profit target",
                        self.cfg.post_rug_take_profit_percent * 100.0
                    )],
                    None,
                ));
            }
        }

        // 4. Technical exit: gather every bearish contribution, then decide
        // full vs partial.
        let mut reasons = Vec::new();
        let mut partial = false;
        let mut full = false;
        if ta.rsi_state == Some(RsiState::Overbought)
            && ta.rsi.map_or(false, |v| v > self.cfg.rsi_sell_threshold)
        {
            reasons.push(format!("RSI overbought ({:.2})", ta.rsi.unwrap_or(0.0)));
            partial = true;
        }
        if ta.ema_cross == Some(EmaCross::BearishCrossRecent) {
            reasons.push("EMA bearish cross".to_string());
            full = true;
        }
        if let Some(macd) = ta.macd_state {
            if macd.is_bearish() {
                reasons.push(format!("MACD bearish ({})", macd));
                partial = true;
                if macd == MacdState::BearishCrossHist {
                    full = true;
                }
            }
        }

        if full {
            Some(self.sell(
                token,
                SellTrigger::TechnicalExit,
                price,
                SellType::TakeProfitFull,
                reasons,
                None,
            ))
        } else if partial {
            Some(self.sell(
                token,
                SellTrigger::TechnicalExit,
                price,
                SellType::TakeProfitPartial,
                reasons,
                Some(self.cfg.partial_sell_percent),
            ))
        } else {
            None
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn sell(
        &self,
        token: &TokenSnapshot,
        trigger: SellTrigger,
        exit_price: f64,
        sell_type: SellType,
        reasoning: Vec<String>,
        partial_fraction: Option<f64>,
    ) -> SellSignal {
        SellSignal {
            token_id: token.token_id.clone(),
            contract_address: token.contract_address.clone(),
            ticker: token.ticker.clone(),
            trigger,
            exit_price,
            sell_type,
            reasoning,
            partial_fraction,
        }
    }
}
