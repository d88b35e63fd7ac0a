//! Agent Runtime - the per-agent bidding loop
//!
//! Each agent runs as its own tokio task and, for every repetition:
//! - Sleeps until the repetition starts
//! - Runs one bidding round per interval under the repetition lock
//! - Settles after the last round and moves on
//!
//! ```text
//! Idle ──start──► Bidding{round, of} ──last round / closed / late──► FinalSettle ──► Closed
//!                    │        ▲
//!                    └─sleep──┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use agora_clock::{Clock, sleep_until};
use agora_core::{
    AgentId, MarketParams, NewOrder, Price, PrivateValues, Quote, QuoteStatus, Side, Timestamp,
    Transaction,
};
use agora_matching::{Exchange, Repetition, SubmitOutcome};
use agora_strategy::{BeliefRegistry, Strategy, StrategyContext, StrategyKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::scoring;

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Unique agent identifier
    pub agent_id: AgentId,
    pub side: Side,
    pub strategy: StrategyKind,
    pub values: PrivateValues,
    /// Seeds the strategy and the wake-up jitter
    pub seed: u64,
}

/// Where the agent is within the current repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Bidding { round: usize, of: usize },
    FinalSettle,
    Closed,
}

/// One accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub repetition: usize,
    /// Unit the price was for (holdings at submission time)
    pub unit: usize,
    pub price: Price,
    pub timestamp: Timestamp,
}

/// What the agent saw of one repetition
#[derive(Debug, Default)]
struct AuctionData {
    holdings: usize,
    quote: Quote,
    /// Last price submitted for each unit
    unit_bids: Vec<Price>,
    closed: bool,
    tx_cursor: usize,
    transactions: Vec<Transaction>,
    submissions: Vec<Submission>,
}

enum RoundOutcome {
    Continue,
    Stop,
}

/// Final account of one agent over a run
#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub agent_id: AgentId,
    pub strategy: StrategyKind,
    pub side: Side,
    pub values: PrivateValues,
    /// Units traded, per repetition
    pub holdings: Vec<usize>,
    pub submissions: Vec<Submission>,
    /// Own transactions, per repetition
    pub transactions: Vec<Vec<Transaction>>,
    pub payoff: f64,
}

impl AgentReport {
    /// Rebuild holdings, transactions and payoff from the final logs
    pub fn settle(&mut self, logs: &[Vec<Transaction>], params: &MarketParams) {
        self.transactions = logs
            .iter()
            .map(|log| {
                log.iter()
                    .filter(|tx| tx.side_of(&self.agent_id) == Some(self.side))
                    .cloned()
                    .collect()
            })
            .collect();
        self.holdings = self
            .transactions
            .iter()
            .map(|txs: &Vec<Transaction>| txs.len().min(params.max_trades))
            .collect();
        self.payoff = scoring::payoff(self.side, &self.values, &self.transactions, params.max_trades);
    }
}

/// Agent runtime - drives one strategy through every repetition
pub struct AgentRuntime {
    config: AgentConfig,
    params: MarketParams,
    strategy: Box<dyn Strategy>,
    exchange: Arc<Exchange>,
    clock: Arc<dyn Clock>,
    game_start: Timestamp,
    auctions: Vec<AuctionData>,
    phase: Phase,
    rng: StdRng,
}

impl AgentRuntime {
    pub fn new(
        config: AgentConfig,
        params: MarketParams,
        beliefs: &Arc<BeliefRegistry>,
        exchange: Arc<Exchange>,
        clock: Arc<dyn Clock>,
        game_start: Timestamp,
    ) -> Self {
        let strategy = config.strategy.build(&params, config.seed, beliefs);
        let rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
        let auctions = (0..params.repetitions).map(|_| AuctionData::default()).collect();

        Self {
            config,
            params,
            strategy,
            exchange,
            clock,
            game_start,
            auctions,
            phase: Phase::Idle,
            rng,
        }
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.config.agent_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run every repetition and report
    pub async fn run(mut self) -> AgentReport {
        log::info!(
            "[{}] Agent started ({} {:?})",
            self.config.agent_id,
            self.config.strategy,
            self.config.side
        );

        for repetition in 0..self.params.repetitions {
            self.run_repetition(repetition).await;
        }

        log::info!("[{}] Agent stopped", self.config.agent_id);
        self.into_report()
    }

    async fn run_repetition(&mut self, repetition: usize) {
        self.phase = Phase::Idle;
        let start = self.params.repetition_start(self.game_start, repetition);
        sleep_until(self.clock.as_ref(), start).await;

        let (previous_transactions, previous_unit_bids) = match repetition.checked_sub(1) {
            Some(previous) => {
                let transactions = self.exchange.transactions(previous).await.unwrap_or_else(|e| {
                    log::warn!("[{}] No previous transactions: {}", self.config.agent_id, e);
                    Vec::new()
                });
                (transactions, self.auctions[previous].unit_bids.clone())
            }
            None => (Vec::new(), Vec::new()),
        };

        let rounds = self.params.bidding_rounds();
        let interval = self.params.bid_interval_ms;
        for round in 0..rounds {
            self.phase = Phase::Bidding { round, of: rounds };

            let outcome = self
                .bid_round(repetition, &previous_transactions, &previous_unit_bids)
                .await;
            if let RoundOutcome::Stop = outcome {
                break;
            }
            self.refresh(repetition).await;
            if round + 1 == rounds {
                break;
            }

            let jitter = (self.rng.gen_range(0.0..0.25) * interval as f64) as i64;
            let wake = start + (round as i64 + 1) * interval - jitter;
            if wake > self.clock.now() {
                sleep_until(self.clock.as_ref(), wake).await;
            } else {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }

        self.phase = Phase::FinalSettle;
        tokio::time::sleep(Duration::from_millis((self.params.buffer_len_ms / 2) as u64)).await;
        self.refresh(repetition).await;

        self.phase = Phase::Closed;
        let data = &self.auctions[repetition];
        log::info!(
            "[{}] Repetition {} done: {} units, {} submissions",
            self.config.agent_id,
            repetition,
            data.holdings,
            data.submissions.len()
        );
    }

    /// One decide-and-submit step, all under the repetition lock
    async fn bid_round(
        &mut self,
        repetition: usize,
        previous_transactions: &[Transaction],
        previous_unit_bids: &[Price],
    ) -> RoundOutcome {
        let shared = match self.exchange.repetition(repetition) {
            Ok(shared) => shared,
            Err(e) => {
                log::warn!("[{}] Skipping round: {}", self.config.agent_id, e);
                return RoundOutcome::Continue;
            }
        };
        let mut market = shared.lock().await;
        let now = self.clock.now();

        self.absorb(repetition, &market);
        let data = &self.auctions[repetition];
        if data.closed {
            return RoundOutcome::Stop;
        }
        let holdings = data.holdings;

        let ctx = StrategyContext {
            repetition,
            side: self.config.side,
            params: &self.params,
            values: &self.config.values,
            holdings,
            quote: data.quote,
            current_bid: data.unit_bids.get(holdings).copied(),
            previous_unit_bids,
            history: market.history(),
            previous_transactions,
            now,
            repetition_start: self.params.repetition_start(self.game_start, repetition),
        };
        self.strategy.adjust_state(&ctx);

        if holdings >= self.params.max_trades {
            return RoundOutcome::Continue;
        }
        let end = self.params.repetition_end(self.game_start, repetition);
        if now > end - self.params.buffer_len_ms / 2 {
            log::warn!(
                "[{}] Late for repetition {}; no more rounds",
                self.config.agent_id,
                repetition
            );
            return RoundOutcome::Stop;
        }

        let proposed = self.strategy.submit_bids(&ctx);
        let submitted_before = self.auctions[repetition].submissions.len();
        if let Some(price) = proposed {
            self.submit(repetition, &mut market, price, now);
        }

        let data = &self.auctions[repetition];
        let fallback = match data.unit_bids.get(data.holdings) {
            None => Some(self.config.side.passive_extreme(self.params.v_min, self.params.v_max)),
            Some(&standing) if data.submissions.len() == submitted_before => Some(standing),
            Some(_) => None,
        };
        if let Some(price) = fallback {
            self.submit(repetition, &mut market, price, now);
        }
        RoundOutcome::Continue
    }

    /// Push one price through the repetition. Returns false if nothing was recorded.
    fn submit(&mut self, repetition: usize, market: &mut Repetition, price: Price, now: Timestamp) -> bool {
        let agent_id = &self.config.agent_id;
        let side = self.config.side;
        let data = &mut self.auctions[repetition];

        if data.holdings >= self.params.max_trades {
            return false;
        }
        let Some(value) = self.config.values.get(data.holdings) else {
            return false;
        };
        if side.loses_at(price, value) {
            log::warn!(
                "[{}] Rejected {:?} at {}: value for unit {} is {}",
                agent_id,
                side,
                price,
                data.holdings,
                value
            );
            return false;
        }
        let price = self.params.clamp_price(price);

        match market.submit(NewOrder::new(agent_id.clone(), side, price, now)) {
            SubmitOutcome::Closed => {
                data.closed = true;
                return false;
            }
            SubmitOutcome::Matched(seq, tx) => {
                log::debug!("[{}] #{} {:?} {} matched at {}", agent_id, seq, side, price, tx.price);
            }
            SubmitOutcome::Rested(seq) => {
                log::debug!("[{}] #{} {:?} {} rests", agent_id, seq, side, price);
            }
            SubmitOutcome::NotImproving(seq) => {
                log::trace!("[{}] #{} {:?} {} does not improve", agent_id, seq, side, price);
            }
        }

        data.unit_bids.resize(data.holdings, price);
        data.unit_bids.push(price);
        data.submissions.push(Submission {
            repetition,
            unit: data.holdings,
            price,
            timestamp: now,
        });
        true
    }

    async fn refresh(&mut self, repetition: usize) {
        match self.exchange.repetition(repetition) {
            Ok(shared) => {
                let market = shared.lock().await;
                self.absorb(repetition, &market);
            }
            Err(e) => log::warn!("[{}] Refresh failed: {}", self.config.agent_id, e),
        }
    }

    /// Pick up the quote and any new transactions involving this agent
    fn absorb(&mut self, repetition: usize, market: &Repetition) {
        let data = &mut self.auctions[repetition];
        match market.current_quote() {
            QuoteStatus::Open(quote) => data.quote = quote,
            QuoteStatus::Closed => data.closed = true,
        }

        for tx in market.history().transactions_since(&mut data.tx_cursor) {
            if tx.side_of(&self.config.agent_id) != Some(self.config.side) {
                continue;
            }
            data.transactions.push(tx.clone());
            if data.holdings < self.params.max_trades {
                data.holdings += 1;
            }
            log::debug!(
                "[{}] Traded unit {} at {} (rep {})",
                self.config.agent_id,
                data.holdings,
                tx.price,
                repetition
            );
        }
    }

    fn into_report(self) -> AgentReport {
        let transactions: Vec<Vec<Transaction>> = self
            .auctions
            .iter()
            .map(|data| data.transactions.clone())
            .collect();
        let payoff = scoring::payoff(
            self.config.side,
            &self.config.values,
            &transactions,
            self.params.max_trades,
        );

        AgentReport {
            agent_id: self.config.agent_id,
            strategy: self.config.strategy,
            side: self.config.side,
            values: self.config.values,
            holdings: self.auctions.iter().map(|data| data.holdings).collect(),
            submissions: self
                .auctions
                .into_iter()
                .flat_map(|data| data.submissions)
                .collect(),
            transactions,
            payoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_clock::SimulationClock;

    fn params() -> MarketParams {
        MarketParams {
            repetitions: 1,
            auction_len_ms: 2_000,
            buffer_len_ms: 400,
            bid_interval_ms: 100,
            ..Default::default()
        }
    }

    fn runtime(
        exchange: &Arc<Exchange>,
        clock: &Arc<SimulationClock>,
        id: &str,
        side: Side,
        value: Price,
        strategy: StrategyKind,
    ) -> AgentRuntime {
        let params = params();
        let beliefs = Arc::new(BeliefRegistry::new(&params));
        let config = AgentConfig {
            agent_id: AgentId::from(id),
            side,
            strategy,
            values: PrivateValues::new(vec![value; params.max_trades], side),
            seed: 7,
        };
        let clock: Arc<dyn Clock> = clock.clone();
        AgentRuntime::new(config, params, &beliefs, Arc::clone(exchange), clock, 0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_rejects_losing_price() {
        let exchange = Arc::new(Exchange::new(1));
        let clock = Arc::new(SimulationClock::starting_at(0));
        let mut agent = runtime(&exchange, &clock, "zi1", Side::Buy, 200, StrategyKind::Zi);

        let shared = exchange.repetition(0).unwrap();
        let mut market = shared.lock().await;
        assert!(!agent.submit(0, &mut market, 201, 0));
        assert!(agent.submit(0, &mut market, 150, 0));
        assert_eq!(market.history().len(), 1);
        assert_eq!(agent.auctions[0].unit_bids, vec![150]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_on_closed_repetition_is_noop() {
        let exchange = Arc::new(Exchange::new(1));
        let clock = Arc::new(SimulationClock::starting_at(0));
        let mut agent = runtime(&exchange, &clock, "zi1", Side::Sell, 100, StrategyKind::Zi);
        exchange.close(0).await.unwrap();

        let shared = exchange.repetition(0).unwrap();
        let mut market = shared.lock().await;
        assert!(!agent.submit(0, &mut market, 150, 0));
        assert!(market.history().is_empty());
        assert!(agent.auctions[0].closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_holdings_follow_transactions() {
        let exchange = Arc::new(Exchange::new(1));
        let clock = Arc::new(SimulationClock::starting_at(0));
        let mut buyer = runtime(&exchange, &clock, "zi1", Side::Buy, 200, StrategyKind::Zi);

        {
            let shared = exchange.repetition(0).unwrap();
            let mut market = shared.lock().await;
            assert!(buyer.submit(0, &mut market, 150, 10));
            market.submit(NewOrder::new(AgentId::from("zi2"), Side::Sell, 140, 20));
        }
        buyer.refresh(0).await;

        let data = &buyer.auctions[0];
        assert_eq!(data.holdings, 1);
        assert_eq!(data.transactions.len(), 1);
        assert_eq!(data.transactions[0].price, 150);
        assert_eq!(data.transactions[0].timestamp, 20);
        // The matched bid no longer stands for the next unit
        assert_eq!(data.unit_bids.get(data.holdings), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lone_agent_runs_to_closed() {
        let exchange = Arc::new(Exchange::new(1));
        let clock = Arc::new(SimulationClock::starting_at(0));
        let agent = runtime(&exchange, &clock, "kaplan1", Side::Buy, 180, StrategyKind::Kaplan);

        let report = agent.run().await;
        assert_eq!(report.holdings, vec![0]);
        assert_eq!(report.payoff, 0.0);
        assert!(!report.submissions.is_empty());
        // Without a better idea the agent keeps its passive bid standing
        assert!(report.submissions.iter().all(|s| s.price <= 180));
        assert!(clock.now() < params().repetition_end(0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_settle_follows_last_round() {
        let exchange = Arc::new(Exchange::new(1));
        let clock = Arc::new(SimulationClock::starting_at(0));
        let agent = runtime(&exchange, &clock, "zi1", Side::Sell, 100, StrategyKind::Zi);
        agent.run().await;

        // Last round wakes by its nominal slot; settling takes half the buffer
        let params = params();
        let last_round = (params.bidding_rounds() as i64 - 1) * params.bid_interval_ms;
        let settled = last_round + params.buffer_len_ms / 2;
        assert!(clock.now() >= settled - params.bid_interval_ms / 4);
        assert!(clock.now() < settled + params.bid_interval_ms / 2);
    }
}
