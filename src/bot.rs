use crate::analysis::{Reconnaissance, SecurityAnalyzer, TechnicalAnalyzer, WhaleTracker};
use crate::config::Config;
use crate::decision::DecisionEngine;
use crate::models::{BuySignal, Position, SecurityTier, SellSignal, TokenSnapshot};
use crate::positions::PositionRegistry;
use crate::strategies::StrategyEngine;
use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// Paper amount recorded per opened position; order execution is outside
/// this system.
const SIMULATED_POSITION_AMOUNT: f64 = 1_000.0;

#[derive(Debug, Clone)]
pub enum SignalEvent {
    Buy(BuySignal),
    Sell(SellSignal),
}

/// Wires the analyzers into the per-token evaluation loop and owns the
/// position registry. For a token with an open position only the sell path
/// runs in a cycle; the buy path is never evaluated while a position exists.
pub struct SignalBot {
    recon: Reconnaissance,
    security: SecurityAnalyzer,
    technical: TechnicalAnalyzer,
    whale: WhaleTracker,
    strategies: StrategyEngine,
    decision: DecisionEngine,
    positions: PositionRegistry,
}

impl SignalBot {
    pub fn new(config: Arc<Config>, tracked_whales: HashSet<String>) -> Self {
        Self {
            recon: Reconnaissance::new(&config.recon),
            security: SecurityAnalyzer::new(&config.security),
            technical: TechnicalAnalyzer::new(&config.technical),
            whale: WhaleTracker::new(&config.whale, tracked_whales),
            strategies: StrategyEngine::new(&config.strategy),
            decision: DecisionEngine::new(&config.decision),
            positions: PositionRegistry::new(),
        }
    }

    pub fn positions(&self) -> &PositionRegistry {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut PositionRegistry {
        &mut self.positions
    }

    /// Runs one full evaluation cycle over a batch of snapshots. A failure
    /// on one token never prevents processing of the next.
    pub fn evaluate_cycle(&mut self, snapshots: Vec<TokenSnapshot>) -> Vec<SignalEvent> {
        let candidates = self.recon.filter_tokens(snapshots);
        let mut events = Vec::new();

        for token in &candidates {
            info!("--- Analyzing token: {} ({}) ---", token.ticker, token.contract_address);

            if self.positions.contains(&token.token_id) {
                if let Some(event) = self.run_sell_path(token) {
                    events.push(event);
                }
                // Sell path pre-empts buy path for the same token.
                continue;
            }

            if let Some(event) = self.run_buy_path(token) {
                events.push(event);
            }
        }

        info!(
            "Cycle complete: {} signals, {} open positions",
            events.len(),
            self.positions.len()
        );
        events
    }

    fn run_sell_path(&mut self, token: &TokenSnapshot) -> Option<SignalEvent> {
        let position = self.positions.get(&token.token_id)?.clone();
        let ta = self.technical.analyze(token);
        let security = self.security.analyze(token);

        let signal = self.decision.generate_sell(token, &position, &ta, &security)?;
        info!(
            "SELL signal for {}: type {:?}, price ${:.6}",
            signal.ticker, signal.sell_type, signal.exit_price
        );
        for reason in &signal.reasoning {
            info!("  - {}", reason);
        }
        // Accepting any sell signal closes the bookkeeping entry; sizing the
        // actual partial exit belongs to the execution layer.
        self.positions.close(&token.token_id);
        Some(SignalEvent::Sell(signal))
    }

    fn run_buy_path(&mut self, token: &TokenSnapshot) -> Option<SignalEvent> {
        let security = self.security.analyze(token);
        if security.tier >= SecurityTier::HighRisk {
            info!("Security risk for {}: {}", token.ticker, security.tier);
            for finding in &security.findings {
                info!("  - {}: {:?} - {}", finding.check, finding.status, finding.reason);
            }
            return None;
        }

        let ta = self.technical.analyze(token);
        let whale = self.whale.analyze(token);
        let strategies = self.strategies.applicable(token, &ta, &whale, &security);
        if strategies.is_empty() {
            return None;
        }

        let signal = self
            .decision
            .generate_buy(token, &strategies, &ta, &whale, &security)?;
        info!(
            "BUY signal for {}: strategy {}, confidence {:.2}",
            signal.ticker, signal.strategy, signal.confidence
        );
        for reason in &signal.reasoning {
            info!("  - {}", reason);
        }

        let entry_price = (signal.entry_range.0 + signal.entry_range.1) / 2.0;
        let position = Position::new(
            entry_price,
            SIMULATED_POSITION_AMOUNT,
            signal.strategy,
            security.tier,
        );
        if let Err(e) = self.positions.open(&token.token_id, position) {
            warn!("Could not open position for {}: {}", token.ticker, e);
        }
        Some(SignalEvent::Buy(signal))
    }
}
