use crate::config::SecurityConfig;
use crate::models::{
    FindingStatus, SecurityFinding, SecurityResult, SecurityTier, TokenSnapshot,
};

/// Scores a token's on-chain risk into a discrete tier with an itemized
/// finding list. Absence of the whole security group is treated as the worst
/// case, never as safety.
#[derive(Debug, Clone)]
pub struct SecurityAnalyzer {
    max_top_holder_percent: f64,
    max_dev_holdings_percent: f64,
    max_total_bundled_percent: f64,
    min_lp_burned_percent: f64,
}

struct FindingSink {
    findings: Vec<SecurityFinding>,
    critical_failures: u32,
    high_risk_flags: u32,
    warnings: u32,
}

impl FindingSink {
    fn new() -> Self {
        Self {
            findings: Vec::new(),
            critical_failures: 0,
            high_risk_flags: 0,
            warnings: 0,
        }
    }

    fn add(&mut self, check: &str, status: FindingStatus, reason: String) {
        match status {
            FindingStatus::FailCritical => self.critical_failures += 1,
            FindingStatus::FailHighRisk => self.high_risk_flags += 1,
            FindingStatus::Warning => self.warnings += 1,
            FindingStatus::Pass | FindingStatus::Info => {}
        }
        self.findings.push(SecurityFinding {
            check: check.to_string(),
            status,
            reason,
        });
    }

    /// Ties always resolve toward the worse tier.
    fn tier(&self) -> SecurityTier {
        if self.critical_failures > 0 {
            SecurityTier::ScamLikely
        } else if self.high_risk_flags > 0 {
            SecurityTier::HighRisk
        } else if self.warnings > 0 {
            SecurityTier::ModerateRisk
        } else {
            SecurityTier::Safe
        }
    }
}

impl SecurityAnalyzer {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            max_top_holder_percent: config.max_top_holder_percent,
            max_dev_holdings_percent: config.max_dev_holdings_percent,
            max_total_bundled_percent: config.max_total_bundled_percent,
            min_lp_burned_percent: config.min_lp_burned_percent,
        }
    }

    pub fn analyze(&self, token: &TokenSnapshot) -> SecurityResult {
        let mut sink = FindingSink::new();

        let sec_info = match &token.security {
            Some(info) => info,
            None => {
                sink.add(
                    "Overall Security Data",
                    FindingStatus::FailCritical,
                    "Security data missing for token.".to_string(),
                );
                return SecurityResult {
                    token_id: token.token_id.clone(),
                    tier: SecurityTier::ScamLikely,
                    findings: sink.findings,
                };
            }
        };

        // Mint authority: only an explicit `false` fails the check.
        if sec_info.mint_authority_disabled == Some(false) {
            sink.add(
                "Mint Authority",
                FindingStatus::FailCritical,
                "Mint authority is ENABLED.".to_string(),
            );
        } else {
            sink.add(
                "Mint Authority",
                FindingStatus::Pass,
                "Mint authority disabled.".to_string(),
            );
        }

        if sec_info.freeze_authority_disabled == Some(false) {
            sink.add(
                "Freeze Authority",
                FindingStatus::FailCritical,
                "Freeze authority is ENABLED (Honeypot risk).".to_string(),
            );
        } else {
            sink.add(
                "Freeze Authority",
                FindingStatus::Pass,
                "Freeze authority disabled.".to_string(),
            );
        }

        // LP burn: missing data is inconclusive, a warning rather than a failure.
        match token.liquidity.as_ref().and_then(|l| l.lp_burned_percent) {
            Some(burned) if burned < self.min_lp_burned_percent => {
                sink.add(
                    "LP Burn",
                    FindingStatus::FailHighRisk,
                    format!(
                        "LP burned: {}% (should be >{}% after migration).",
                        burned, self.min_lp_burned_percent
                    ),
                );
            }
            Some(burned) => {
                sink.add("LP Burn", FindingStatus::Pass, format!("LP burned: {}%.", burned));
            }
            None => {
                sink.add(
                    "LP Burn",
                    FindingStatus::Warning,
                    "LP burn information missing or not applicable.".to_string(),
                );
            }
        }

        match token.holders.as_ref().and_then(|h| h.top10_holder_percent) {
            Some(pct) if pct > self.max_top_holder_percent => {
                sink.add(
                    "Top 10 Holders",
                    FindingStatus::FailHighRisk,
                    format!(
                        "Top 10 holders own {}%. Limit: {}%.",
                        pct, self.max_top_holder_percent
                    ),
                );
            }
            Some(pct) => {
                sink.add(
                    "Top 10 Holders",
                    FindingStatus::Pass,
                    format!("Top 10 holders own {}%.", pct),
                );
            }
            None => {
                sink.add(
                    "Top 10 Holders",
                    FindingStatus::Warning,
                    "Top 10 holder information missing.".to_string(),
                );
            }
        }

        // Dev holdings over the ceiling stay a warning, not high-risk.
        match sec_info.dev_holdings_percent {
            Some(pct) if pct > self.max_dev_holdings_percent => {
                sink.add(
                    "Dev Holdings",
                    FindingStatus::Warning,
                    format!(
                        "Dev holds {}%. Limit: {}%.",
                        pct, self.max_dev_holdings_percent
                    ),
                );
            }
            Some(pct) => {
                sink.add("Dev Holdings", FindingStatus::Pass, format!("Dev holds {}%.", pct));
            }
            None => {
                sink.add(
                    "Dev Holdings",
                    FindingStatus::Info,
                    "Dev holdings info not available or 0%.".to_string(),
                );
            }
        }

        if let Some(bundle) = &sec_info.bundler_analysis {
            match bundle.total_bundled_percent {
                Some(pct) if pct > self.max_total_bundled_percent => {
                    sink.add(
                        "Bundled Supply",
                        FindingStatus::FailHighRisk,
                        format!(
                            "Total bundled supply is {}%. Limit: {}%.",
                            pct, self.max_total_bundled_percent
                        ),
                    );
                }
                Some(pct) => {
                    sink.add(
                        "Bundled Supply",
                        FindingStatus::Pass,
                        format!("Total bundled supply is {}%.", pct),
                    );
                }
                None => {}
            }
            if bundle.fresh_wallet_bundles == Some(true) {
                sink.add(
                    "Fresh Wallet Bundles",
                    FindingStatus::Warning,
                    "Fresh wallets involved in bundling detected.".to_string(),
                );
            } else {
                sink.add(
                    "Fresh Wallet Bundles",
                    FindingStatus::Info,
                    "No significant fresh wallet bundling detected.".to_string(),
                );
            }
        } else {
            sink.add(
                "Bundler Analysis",
                FindingStatus::Info,
                "Bundler analysis data not available.".to_string(),
            );
        }

        if sec_info.is_copycat == Some(true) {
            sink.add(
                "Copycat Check",
                FindingStatus::FailHighRisk,
                "Token identified as a potential copycat.".to_string(),
            );
        } else {
            sink.add(
                "Copycat Check",
                FindingStatus::Pass,
                "Token does not appear to be a copycat.".to_string(),
            );
        }

        SecurityResult {
            token_id: token.token_id.clone(),
            tier: sink.tier(),
            findings: sink.findings,
        }
    }
}
