use crate::error::Result;
use crate::models::{Candle, TokenSnapshot};
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Loads token snapshots from a JSON file: an array of snapshot objects in
/// the feed's camelCase naming (volume windows as "5minUSD" etc.).
///
/// A malformed entry is skipped with a warning; only an unreadable or
/// non-array file is an error.
pub fn load_token_snapshots(file_path: &Path) -> Result<Vec<TokenSnapshot>> {
    info!("Loading token snapshots from {:?}", file_path);
    let raw = fs::read_to_string(file_path)?;
    let snapshots = parse_token_snapshots(&raw)?;
    info!("Loaded {} token snapshots", snapshots.len());
    Ok(snapshots)
}

pub fn parse_token_snapshots(raw: &str) -> Result<Vec<TokenSnapshot>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    let mut snapshots = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<TokenSnapshot>(entry) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                warn!("Skipping malformed snapshot entry {}: {}", index, e);
            }
        }
    }
    Ok(snapshots)
}

/// Loads historical OHLCV data for one token from
/// `{base_dir}/{token_id}_ohlcv.json`, shaped as
/// `{"1m": [candles], "5m": [candles]}`. A missing or unreadable file
/// yields an empty map, not an error.
pub fn load_historical_data(token_id: &str, base_dir: &Path) -> HashMap<String, Vec<Candle>> {
    let file_path = base_dir.join(format!("{}_ohlcv.json", token_id));
    let raw = match fs::read_to_string(&file_path) {
        Ok(raw) => raw,
        Err(_) => {
            warn!("Historical data not found for {} at {:?}", token_id, file_path);
            return HashMap::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(data) => data,
        Err(e) => {
            warn!("Could not decode historical data for {}: {}", token_id, e);
            HashMap::new()
        }
    }
}

/// Loads the tracked whale wallet set, one address per line. A missing file
/// yields an empty set with a warning.
pub fn load_tracked_whales(file_path: &Path) -> HashSet<String> {
    match fs::read_to_string(file_path) {
        Ok(raw) => raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => {
            warn!("Whale wallet file not found: {:?}. Using empty set.", file_path);
            HashSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshots_with_feed_naming() {
        let raw = r#"[
            {
                "tokenId": "MOCK001_SOL_PUMP",
                "timestampCollected": "2024-07-29T10:00:05Z",
                "source": "Pulse_NewPairs",
                "contractAddress": "MockSoLmAeMCo1nAdDrEsS001PUMP",
                "ticker": "MOCKROCKET",
                "name": "Mock Rocket To The Moon",
                "marketCap": 85000.0,
                "volume": {"5minUSD": 15200.0},
                "security": {"mintAuthorityDisabled": true, "freezeAuthorityDisabled": true},
                "whaleActivity": {"netBuyVolumeLast15MinUSD": 1200.0, "distinctBuyingWhales": 2}
            }
        ]"#;
        let snapshots = parse_token_snapshots(raw).unwrap();
        assert_eq!(snapshots.len(), 1);
        let snap = &snapshots[0];
        assert_eq!(snap.token_id, "MOCK001_SOL_PUMP");
        assert_eq!(snap.market_cap, Some(85_000.0));
        assert_eq!(snap.five_min_volume(), 15_200.0);
        assert_eq!(
            snap.security.as_ref().unwrap().mint_authority_disabled,
            Some(true)
        );
        assert_eq!(
            snap.whale_activity
                .as_ref()
                .unwrap()
                .net_buy_volume_last_15_min_usd,
            Some(1_200.0)
        );
        assert!(snap.historical_candle_data.is_empty());
    }

    #[test]
    fn test_malformed_entry_is_skipped_not_fatal() {
        let raw = r#"[
            {"this_is_not": "a snapshot"},
            {
                "tokenId": "TOK2",
                "timestampCollected": "2024-07-29T10:00:05Z",
                "contractAddress": "Addr2",
                "ticker": "TOK2",
                "marketCap": 100000.0
            }
        ]"#;
        let snapshots = parse_token_snapshots(raw).unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].token_id, "TOK2");
    }

    #[test]
    fn test_non_array_input_is_an_error() {
        assert!(parse_token_snapshots("{\"not\": \"an array\"}").is_err());
    }

    #[test]
    fn test_candle_map_round_trip() {
        let raw = r#"{
            "1m": [
                {"timestamp": "2024-07-29T09:58:00Z", "open": 0.000082,
                 "high": 0.000083, "low": 0.000081, "close": 0.000083,
                 "volume": 5200.0}
            ]
        }"#;
        let data: HashMap<String, Vec<Candle>> = serde_json::from_str(raw).unwrap();
        assert_eq!(data["1m"].len(), 1);
        assert_eq!(data["1m"][0].close, 0.000083);
    }
}
