use crate::config::WhaleConfig;
use crate::models::{TokenSnapshot, TradeSide, WhaleSummary};
use chrono::Duration;
use log::debug;
use std::collections::HashSet;

/// Summarizes net buy volume and distinct buyers among tracked large
/// wallets. Prefers the pre-aggregated snapshot field; when that is absent
/// the same summary is derived from the raw transaction stream filtered
/// against the tracked wallet set within the lookback window.
#[derive(Debug, Clone)]
pub struct WhaleTracker {
    tracked_wallets: HashSet<String>,
    lookback_minutes: u32,
}

impl WhaleTracker {
    pub fn new(config: &WhaleConfig, tracked_wallets: HashSet<String>) -> Self {
        Self {
            tracked_wallets,
            lookback_minutes: config.lookback_minutes,
        }
    }

    pub fn analyze(&self, token: &TokenSnapshot) -> WhaleSummary {
        if let Some(activity) = &token.whale_activity {
            return WhaleSummary {
                token_id: token.token_id.clone(),
                net_buy_volume_usd: activity.net_buy_volume_last_15_min_usd.unwrap_or(0.0),
                distinct_buyers: activity.distinct_buying_whales.unwrap_or(0),
            };
        }
        if !token.transaction_stream.is_empty() {
            return self.summarize_stream(token);
        }
        debug!(
            "WhaleTracker: no whale activity or transaction stream for {}",
            token.ticker
        );
        WhaleSummary {
            token_id: token.token_id.clone(),
            net_buy_volume_usd: 0.0,
            distinct_buyers: 0,
        }
    }

    /// Windows relative to the newest transaction so the summary stays a
    /// pure function of the snapshot.
    fn summarize_stream(&self, token: &TokenSnapshot) -> WhaleSummary {
        let newest = token
            .transaction_stream
            .iter()
            .map(|tx| tx.timestamp)
            .max();
        let mut net_buy = 0.0;
        let mut buyers: HashSet<&str> = HashSet::new();
        if let Some(newest) = newest {
            let cutoff = newest - Duration::minutes(self.lookback_minutes as i64);
            for tx in &token.transaction_stream {
                if tx.timestamp < cutoff || !self.tracked_wallets.contains(&tx.wallet_address) {
                    continue;
                }
                match tx.side {
                    TradeSide::Buy => {
                        net_buy += tx.amount_usd;
                        buyers.insert(tx.wallet_address.as_str());
                    }
                    TradeSide::Sell => net_buy -= tx.amount_usd,
                }
            }
        }
        WhaleSummary {
            token_id: token.token_id.clone(),
            net_buy_volume_usd: net_buy,
            distinct_buyers: buyers.len() as u32,
        }
    }
}
