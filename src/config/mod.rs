use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every threshold used by the pipeline, grouped per analyzer. Each field
/// carries its documented default so a partially written TOML file (or no
/// file at all) falls back to the default instead of failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub recon: ReconConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub technical: TechnicalConfig,
    #[serde(default)]
    pub whale: WhaleConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub decision: DecisionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_min_market_cap")]
    pub min_market_cap: f64,
    #[serde(default = "default_max_market_cap")]
    pub max_market_cap: f64,
    #[serde(default = "default_min_5min_volume")]
    pub min_5min_volume: f64,
}

fn default_min_market_cap() -> f64 {
    70_000.0
}
fn default_max_market_cap() -> f64 {
    11_000_000.0
}
fn default_min_5min_volume() -> f64 {
    10_000.0
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            min_market_cap: default_min_market_cap(),
            max_market_cap: default_max_market_cap(),
            min_5min_volume: default_min_5min_volume(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_max_top_holder_percent")]
    pub max_top_holder_percent: f64,
    #[serde(default = "default_max_dev_holdings_percent")]
    pub max_dev_holdings_percent: f64,
    #[serde(default = "default_max_total_bundled_percent")]
    pub max_total_bundled_percent: f64,
    #[serde(default = "default_min_lp_burned_percent")]
    pub min_lp_burned_percent: f64,
}

fn default_max_top_holder_percent() -> f64 {
    15.0
}
fn default_max_dev_holdings_percent() -> f64 {
    1.0
}
fn default_max_total_bundled_percent() -> f64 {
    8.0
}
fn default_min_lp_burned_percent() -> f64 {
    99.0
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_top_holder_percent: default_max_top_holder_percent(),
            max_dev_holdings_percent: default_max_dev_holdings_percent(),
            max_total_bundled_percent: default_max_total_bundled_percent(),
            min_lp_burned_percent: default_min_lp_burned_percent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalConfig {
    #[serde(default = "default_ema_short_period")]
    pub ema_short_period: usize,
    #[serde(default = "default_ema_long_period")]
    pub ema_long_period: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,
    #[serde(default = "default_macd_fast_period")]
    pub macd_fast_period: usize,
    #[serde(default = "default_macd_slow_period")]
    pub macd_slow_period: usize,
    #[serde(default = "default_macd_signal_period")]
    pub macd_signal_period: usize,
}

fn default_ema_short_period() -> usize {
    9
}
fn default_ema_long_period() -> usize {
    21
}
fn default_rsi_period() -> usize {
    14
}
fn default_rsi_overbought() -> f64 {
    70.0
}
fn default_rsi_oversold() -> f64 {
    30.0
}
fn default_macd_fast_period() -> usize {
    12
}
fn default_macd_slow_period() -> usize {
    26
}
fn default_macd_signal_period() -> usize {
    9
}

impl Default for TechnicalConfig {
    fn default() -> Self {
        Self {
            ema_short_period: default_ema_short_period(),
            ema_long_period: default_ema_long_period(),
            rsi_period: default_rsi_period(),
            rsi_overbought: default_rsi_overbought(),
            rsi_oversold: default_rsi_oversold(),
            macd_fast_period: default_macd_fast_period(),
            macd_slow_period: default_macd_slow_period(),
            macd_signal_period: default_macd_signal_period(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhaleConfig {
    #[serde(default = "default_whale_lookback_minutes")]
    pub lookback_minutes: u32,
}

fn default_whale_lookback_minutes() -> u32 {
    15
}

impl Default for WhaleConfig {
    fn default() -> Self {
        Self {
            lookback_minutes: default_whale_lookback_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_asia_min_volume")]
    pub asia_min_volume: f64,
    #[serde(default = "default_post_rug_min_volume")]
    pub post_rug_min_volume: f64,
    #[serde(default = "default_post_rug_max_rsi")]
    pub post_rug_max_rsi: f64,
    #[serde(default = "default_momentum_min_volume")]
    pub momentum_min_volume: f64,
    #[serde(default = "default_momentum_max_rsi")]
    pub momentum_max_rsi: f64,
    #[serde(default = "default_momentum_min_whale_net_buy")]
    pub momentum_min_whale_net_buy: f64,
}

fn default_asia_min_volume() -> f64 {
    50_000.0
}
fn default_post_rug_min_volume() -> f64 {
    15_000.0
}
fn default_post_rug_max_rsi() -> f64 {
    45.0
}
fn default_momentum_min_volume() -> f64 {
    20_000.0
}
fn default_momentum_max_rsi() -> f64 {
    68.0
}
fn default_momentum_min_whale_net_buy() -> f64 {
    500.0
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            asia_min_volume: default_asia_min_volume(),
            post_rug_min_volume: default_post_rug_min_volume(),
            post_rug_max_rsi: default_post_rug_max_rsi(),
            momentum_min_volume: default_momentum_min_volume(),
            momentum_max_rsi: default_momentum_max_rsi(),
            momentum_min_whale_net_buy: default_momentum_min_whale_net_buy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    #[serde(default = "default_min_confidence_buy")]
    pub min_confidence_buy: f64,
    #[serde(default = "default_momentum_min_volume_buy_confirm")]
    pub momentum_min_volume_buy_confirm: f64,
    #[serde(default = "default_momentum_max_rsi_buy")]
    pub momentum_max_rsi_buy: f64,
    #[serde(default = "default_momentum_min_whale_buy_confirm")]
    pub momentum_min_whale_buy_confirm: f64,
    #[serde(default = "default_post_rug_min_volume_buy_confirm")]
    pub post_rug_min_volume_buy_confirm: f64,
    #[serde(default = "default_post_rug_max_rsi_buy")]
    pub post_rug_max_rsi_buy: f64,
    #[serde(default = "default_asia_min_volume_buy_confirm")]
    pub asia_min_volume_buy_confirm: f64,
    #[serde(default = "default_stop_loss_percent")]
    pub stop_loss_percent: f64,
    #[serde(default = "default_post_rug_take_profit_percent")]
    pub post_rug_take_profit_percent: f64,
    #[serde(default = "default_rsi_sell_threshold")]
    pub rsi_sell_threshold: f64,
    #[serde(default = "default_partial_sell_percent")]
    pub partial_sell_percent: f64,
}

fn default_min_confidence_buy() -> f64 {
    0.6
}
fn default_momentum_min_volume_buy_confirm() -> f64 {
    25_000.0
}
fn default_momentum_max_rsi_buy() -> f64 {
    65.0
}
fn default_momentum_min_whale_buy_confirm() -> f64 {
    750.0
}
fn default_post_rug_min_volume_buy_confirm() -> f64 {
    20_000.0
}
fn default_post_rug_max_rsi_buy() -> f64 {
    50.0
}
fn default_asia_min_volume_buy_confirm() -> f64 {
    60_000.0
}
fn default_stop_loss_percent() -> f64 {
    0.25
}
fn default_post_rug_take_profit_percent() -> f64 {
    0.50
}
fn default_rsi_sell_threshold() -> f64 {
    75.0
}
fn default_partial_sell_percent() -> f64 {
    0.25
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            min_confidence_buy: default_min_confidence_buy(),
            momentum_min_volume_buy_confirm: default_momentum_min_volume_buy_confirm(),
            momentum_max_rsi_buy: default_momentum_max_rsi_buy(),
            momentum_min_whale_buy_confirm: default_momentum_min_whale_buy_confirm(),
            post_rug_min_volume_buy_confirm: default_post_rug_min_volume_buy_confirm(),
            post_rug_max_rsi_buy: default_post_rug_max_rsi_buy(),
            asia_min_volume_buy_confirm: default_asia_min_volume_buy_confirm(),
            stop_loss_percent: default_stop_loss_percent(),
            post_rug_take_profit_percent: default_post_rug_take_profit_percent(),
            rsi_sell_threshold: default_rsi_sell_threshold(),
            partial_sell_percent: default_partial_sell_percent(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Validates once at startup; thresholds are never range-checked again
    /// at read sites.
    pub fn validate(&self) -> Result<()> {
        if self.recon.min_market_cap > self.recon.max_market_cap {
            return Err(Error::ConfigError(format!(
                "recon market cap band is inverted: min {} > max {}",
                self.recon.min_market_cap, self.recon.max_market_cap
            )));
        }
        if self.recon.min_5min_volume < 0.0 {
            return Err(Error::ConfigError(
                "recon min_5min_volume must be non-negative".to_string(),
            ));
        }
        let t = &self.technical;
        if t.ema_short_period == 0
            || t.ema_long_period == 0
            || t.rsi_period == 0
            || t.macd_fast_period == 0
            || t.macd_slow_period == 0
            || t.macd_signal_period == 0
        {
            return Err(Error::ConfigError(
                "technical indicator periods must be positive".to_string(),
            ));
        }
        if t.ema_short_period >= t.ema_long_period {
            return Err(Error::ConfigError(format!(
                "ema_short_period {} must be below ema_long_period {}",
                t.ema_short_period, t.ema_long_period
            )));
        }
        if t.macd_fast_period >= t.macd_slow_period {
            return Err(Error::ConfigError(format!(
                "macd_fast_period {} must be below macd_slow_period {}",
                t.macd_fast_period, t.macd_slow_period
            )));
        }
        if t.rsi_oversold >= t.rsi_overbought {
            return Err(Error::ConfigError(format!(
                "rsi_oversold {} must be below rsi_overbought {}",
                t.rsi_oversold, t.rsi_overbought
            )));
        }
        let d = &self.decision;
        if !(0.0..=1.0).contains(&d.min_confidence_buy) {
            return Err(Error::ConfigError(
                "min_confidence_buy must be within [0, 1]".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&d.stop_loss_percent) || d.stop_loss_percent == 0.0 {
            return Err(Error::ConfigError(
                "stop_loss_percent must be within (0, 1)".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&d.partial_sell_percent) || d.partial_sell_percent == 0.0 {
            return Err(Error::ConfigError(
                "partial_sell_percent must be within (0, 1]".to_string(),
            ));
        }
        if d.post_rug_take_profit_percent <= 0.0 {
            return Err(Error::ConfigError(
                "post_rug_take_profit_percent must be positive".to_string(),
            ));
        }
        if self.whale.lookback_minutes == 0 {
            return Err(Error::ConfigError(
                "whale lookback_minutes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
