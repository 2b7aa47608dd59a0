use crate::config::ReconConfig;
use crate::models::TokenSnapshot;
use log::{debug, info};

/// Coarse admission gate on market cap and short-window volume. Tokens with
/// either field missing are excluded, never defaulted.
#[derive(Debug, Clone)]
pub struct Reconnaissance {
    min_market_cap: f64,
    max_market_cap: f64,
    min_5min_volume: f64,
}

impl Reconnaissance {
    pub fn new(config: &ReconConfig) -> Self {
        Self {
            min_market_cap: config.min_market_cap,
            max_market_cap: config.max_market_cap,
            min_5min_volume: config.min_5min_volume,
        }
    }

    pub fn filter_tokens(&self, tokens: Vec<TokenSnapshot>) -> Vec<TokenSnapshot> {
        let total = tokens.len();
        let candidates: Vec<TokenSnapshot> = tokens
            .into_iter()
            .filter(|token| self.is_eligible(token))
            .collect();
        info!(
            "Recon: {} potential candidates from {}",
            candidates.len(),
            total
        );
        candidates
    }

    fn is_eligible(&self, token: &TokenSnapshot) -> bool {
        let market_cap = match token.market_cap {
            Some(mc) => mc,
            None => {
                debug!("Recon: skipping {} (no market cap)", token.ticker);
                return false;
            }
        };
        let volume = match token.volume.as_ref().and_then(|v| v.five_min_usd) {
            Some(v) => v,
            None => {
                debug!("Recon: skipping {} (no 5min volume)", token.ticker);
                return false;
            }
        };

        if !(self.min_market_cap..=self.max_market_cap).contains(&market_cap) {
            debug!(
                "Recon: skipping {} (market cap {} outside band)",
                token.ticker, market_cap
            );
            return false;
        }
        if volume < self.min_5min_volume {
            debug!(
                "Recon: skipping {} (5min volume {} below {})",
                token.ticker, volume, self.min_5min_volume
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;
    use crate::tests::common::base_snapshot;

    fn filter() -> Reconnaissance {
        Reconnaissance::new(&ReconConfig::default())
    }

    #[test]
    fn test_token_in_band_is_admitted() {
        let token = base_snapshot("TOK1", "ROCKET", Some(85_000.0), Some(15_200.0));
        let out = filter().filter_tokens(vec![token]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].token_id, "TOK1");
    }

    #[test]
    fn test_missing_market_cap_is_excluded() {
        let token = base_snapshot("TOK1", "ROCKET", None, Some(15_000.0));
        assert!(filter().filter_tokens(vec![token]).is_empty());
    }

    #[test]
    fn test_missing_volume_is_excluded() {
        let mut token = base_snapshot("TOK1", "ROCKET", Some(85_000.0), None);
        token.volume = None;
        assert!(filter().filter_tokens(vec![token]).is_empty());
    }

    #[test]
    fn test_market_cap_band_is_inclusive() {
        let low = base_snapshot("LOW", "LOW", Some(70_000.0), Some(15_000.0));
        let high = base_snapshot("HIGH", "HIGH", Some(11_000_000.0), Some(15_000.0));
        let over = base_snapshot("OVER", "OVER", Some(11_000_001.0), Some(15_000.0));
        let out = filter().filter_tokens(vec![low, high, over]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_low_volume_is_excluded() {
        let token = base_snapshot("TOK1", "ROCKET", Some(85_000.0), Some(9_999.0));
        assert!(filter().filter_tokens(vec![token]).is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let a = base_snapshot("A", "A", Some(100_000.0), Some(20_000.0));
        let b = base_snapshot("B", "B", Some(50_000.0), Some(20_000.0));
        let c = base_snapshot("C", "C", Some(200_000.0), Some(20_000.0));
        let out = filter().filter_tokens(vec![a, b, c]);
        let ids: Vec<&str> = out.iter().map(|t| t.token_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }
}
