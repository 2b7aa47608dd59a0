use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One token as collected from the upstream screener feed. Field naming
/// follows the feed's camelCase JSON; every nested group is optional and an
/// absent group must be treated as "unknown" by consumers, never defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSnapshot {
    pub token_id: String,
    pub timestamp_collected: String,
    #[serde(default)]
    pub source: String,
    pub contract_address: String,
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub liquidity: Option<LiquidityInfo>,
    #[serde(default)]
    pub volume: Option<VolumeInfo>,
    #[serde(default)]
    pub holders: Option<HolderInfo>,
    #[serde(default)]
    pub security: Option<SecurityInfo>,
    #[serde(default)]
    pub technical_analysis: Option<TaSnapshot>,
    #[serde(default)]
    pub whale_activity: Option<WhaleActivity>,
    /// Timeframe label ("1m", "5m", ...) to chronologically ordered candles.
    #[serde(default)]
    pub historical_candle_data: HashMap<String, Vec<Candle>>,
    #[serde(default)]
    pub transaction_stream: Vec<TokenTransaction>,
}

impl TokenSnapshot {
    /// 5-minute USD volume, or 0.0 when the volume group or field is absent.
    pub fn five_min_volume(&self) -> f64 {
        self.volume
            .as_ref()
            .and_then(|v| v.five_min_usd)
            .unwrap_or(0.0)
    }

    /// Spot price from the collected technical snapshot, if known.
    pub fn spot_price(&self) -> Option<f64> {
        self.technical_analysis.as_ref().and_then(|t| t.price_usd)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityInfo {
    #[serde(rename = "poolSizeUSD")]
    pub pool_size_usd: Option<f64>,
    pub lp_burned_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeInfo {
    #[serde(rename = "5minUSD")]
    pub five_min_usd: Option<f64>,
    #[serde(rename = "1hrUSD", default)]
    pub one_hr_usd: Option<f64>,
    #[serde(rename = "24hrUSD", default)]
    pub twenty_four_hr_usd: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderInfo {
    pub count: Option<u64>,
    pub top10_holder_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityInfo {
    pub mint_authority_disabled: Option<bool>,
    pub freeze_authority_disabled: Option<bool>,
    pub dev_holdings_percent: Option<f64>,
    #[serde(default)]
    pub bundler_analysis: Option<BundleAnalysis>,
    pub is_copycat: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleAnalysis {
    pub total_bundled_percent: Option<f64>,
    pub top_bundle_percent: Option<f64>,
    pub fresh_wallet_bundles: Option<bool>,
}

/// Single-point technical snapshot delivered with the feed (spot price only;
/// real indicator state is computed from historical candles).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaSnapshot {
    #[serde(rename = "priceUSD")]
    pub price_usd: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhaleActivity {
    #[serde(rename = "netBuyVolumeLast15MinUSD")]
    pub net_buy_volume_last_15_min_usd: Option<f64>,
    pub distinct_buying_whales: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransaction {
    pub wallet_address: String,
    pub side: TradeSide,
    pub amount_usd: f64,
    pub timestamp: DateTime<Utc>,
}

// --- Analyzer outputs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingStatus {
    Pass,
    Warning,
    FailHighRisk,
    FailCritical,
    Info,
}

/// Discrete risk classification. Ordering matters: a greater variant is a
/// worse tier, so comparisons like `tier >= SecurityTier::HighRisk` gate the
/// strategy and buy paths.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityTier {
    Safe,
    ModerateRisk,
    HighRisk,
    ScamLikely,
}

impl fmt::Display for SecurityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SecurityTier::Safe => "SAFE",
            SecurityTier::ModerateRisk => "MODERATE_RISK",
            SecurityTier::HighRisk => "HIGH_RISK",
            SecurityTier::ScamLikely => "SCAM_LIKELY",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityFinding {
    pub check: String,
    pub status: FindingStatus,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityResult {
    pub token_id: String,
    pub tier: SecurityTier,
    /// Every check performed, passing ones included, for audit logging.
    pub findings: Vec<SecurityFinding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmaCross {
    BullishCrossRecent,
    BearishCrossRecent,
    BullishAbove,
    BearishBelow,
    Neutral,
}

impl EmaCross {
    pub fn is_bullish(&self) -> bool {
        matches!(self, EmaCross::BullishCrossRecent | EmaCross::BullishAbove)
    }
}

impl fmt::Display for EmaCross {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmaCross::BullishCrossRecent => "BULLISH_CROSS_RECENT",
            EmaCross::BearishCrossRecent => "BEARISH_CROSS_RECENT",
            EmaCross::BullishAbove => "BULLISH_ABOVE",
            EmaCross::BearishBelow => "BEARISH_BELOW",
            EmaCross::Neutral => "NEUTRAL",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiState {
    Overbought,
    Oversold,
    NeutralRising,
    NeutralFalling,
}

impl fmt::Display for RsiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RsiState::Overbought => "OVERBOUGHT",
            RsiState::Oversold => "OVERSOLD",
            RsiState::NeutralRising => "NEUTRAL_RISING",
            RsiState::NeutralFalling => "NEUTRAL_FALLING",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MacdState {
    BullishCrossHist,
    BearishCrossHist,
    BullishMomentumHist,
    BearishMomentumHist,
    Neutral,
}

impl MacdState {
    pub fn is_bullish(&self) -> bool {
        matches!(
            self,
            MacdState::BullishCrossHist | MacdState::BullishMomentumHist
        )
    }

    pub fn is_bearish(&self) -> bool {
        matches!(
            self,
            MacdState::BearishCrossHist | MacdState::BearishMomentumHist
        )
    }
}

impl fmt::Display for MacdState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MacdState::BullishCrossHist => "BULLISH_CROSS_HIST",
            MacdState::BearishCrossHist => "BEARISH_CROSS_HIST",
            MacdState::BullishMomentumHist => "BULLISH_MOMENTUM_HIST",
            MacdState::BearishMomentumHist => "BEARISH_MOMENTUM_HIST",
            MacdState::Neutral => "NEUTRAL",
        };
        write!(f, "{}", s)
    }
}

/// Advisory chart-pattern label. Pattern detection is conservative and may
/// return nothing; downstream logic treats it as supporting context only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartPattern {
    #[serde(rename = "POTENTIAL_HOCKEY_STICK")]
    HockeyStick,
    #[serde(rename = "FLOOR_FORMATION_DOUBLE_BOUNCE")]
    FloorFormationDoubleBounce,
}

impl fmt::Display for ChartPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChartPattern::HockeyStick => "POTENTIAL_HOCKEY_STICK",
            ChartPattern::FloorFormationDoubleBounce => "FLOOR_FORMATION_DOUBLE_BOUNCE",
        };
        write!(f, "{}", s)
    }
}

/// Indicator state for one token. Every field except the id is optional:
/// unset means insufficient candle history, which downstream consumers must
/// read as "no evidence", not as bullish or bearish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalResult {
    pub token_id: String,
    pub ema_short: Option<f64>,
    pub ema_long: Option<f64>,
    pub ema_cross: Option<EmaCross>,
    pub rsi: Option<f64>,
    pub rsi_state: Option<RsiState>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub macd_state: Option<MacdState>,
    pub pattern: Option<ChartPattern>,
}

impl TechnicalResult {
    pub fn empty(token_id: &str) -> Self {
        Self {
            token_id: token_id.to_string(),
            ema_short: None,
            ema_long: None,
            ema_cross: None,
            rsi: None,
            rsi_state: None,
            macd: None,
            macd_signal: None,
            macd_histogram: None,
            macd_state: None,
            pattern: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhaleSummary {
    pub token_id: String,
    pub net_buy_volume_usd: f64,
    pub distinct_buyers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyKind {
    AsiaTime,
    PostRug,
    MomentumRider,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::AsiaTime => "AsiaTime",
            StrategyKind::PostRug => "PostRug",
            StrategyKind::MomentumRider => "MomentumRider",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// --- Decision outputs ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuySignal {
    pub token_id: String,
    pub contract_address: String,
    pub ticker: String,
    pub strategy: StrategyKind,
    /// Suggested (low, high) entry band around the spot price.
    pub entry_range: (f64, f64),
    /// In [0, 1].
    pub confidence: f64,
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SellType {
    StopLoss,
    TakeProfitFull,
    TakeProfitPartial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SellTrigger {
    StopLoss,
    SecurityEmergency,
    TakeProfit(StrategyKind),
    TechnicalExit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellSignal {
    pub token_id: String,
    pub contract_address: String,
    pub ticker: String,
    pub trigger: SellTrigger,
    pub exit_price: f64,
    pub sell_type: SellType,
    pub reasoning: Vec<String>,
    /// Fraction of the position to exit, in (0, 1]. Set for partial exits.
    pub partial_fraction: Option<f64>,
}

/// One open position, owned and mutated by the orchestrator only. The entry
/// tier is recorded so the sell path can detect security degradation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub entry_price: f64,
    pub amount_held: f64,
    pub strategy: StrategyKind,
    pub entry_tier: SecurityTier,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    pub fn new(
        entry_price: f64,
        amount_held: f64,
        strategy: StrategyKind,
        entry_tier: SecurityTier,
    ) -> Self {
        Self {
            entry_price,
            amount_held,
            strategy,
            entry_tier,
            opened_at: Utc::now(),
        }
    }
}
