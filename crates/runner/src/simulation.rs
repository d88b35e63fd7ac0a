//! Simulation - full repeated-auction orchestration
//!
//! Ties together all components:
//! - Bootstrap (values, seeds, population)
//! - The in-process exchange, one repetition per index
//! - One tokio task per agent
//! - A closer that ends each repetition on time
//! - Payoff scoring over the final transaction logs

use std::sync::Arc;

use agora_clock::{Clock, SystemClock, sleep_until};
use agora_core::{Side, Timestamp, Transaction};
use agora_matching::Exchange;
use agora_strategy::{BeliefRegistry, StrategyKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::agent::{AgentReport, AgentRuntime};
use crate::bootstrap::{SimulationBootstrap, SimulationConfig};
use crate::error::{Result, SimulationError};
use crate::scoring::{self, StrategyPayoff};

/// Transaction log of one repetition
#[derive(Debug, Clone, Serialize)]
pub struct RepetitionLog {
    pub index: usize,
    pub orders: usize,
    pub transactions: Vec<Transaction>,
}

/// Simulation results
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResults {
    /// Master seed the run was drawn from
    pub seed: u64,
    pub game_start: Timestamp,
    pub repetitions: Vec<RepetitionLog>,
    pub agents: Vec<AgentReport>,
    /// Mean payoff per (side, strategy)
    pub payoffs: Vec<StrategyPayoff>,
}

impl SimulationResults {
    pub fn total_transactions(&self) -> usize {
        self.repetitions.iter().map(|r| r.transactions.len()).sum()
    }

    pub fn agent(&self, agent_id: &str) -> Option<&AgentReport> {
        self.agents.iter().find(|a| a.agent_id.as_str() == agent_id)
    }

    pub fn mean_payoff(&self, side: Side, strategy: StrategyKind) -> Option<f64> {
        self.payoffs
            .iter()
            .find(|p| p.side == side && p.strategy == strategy)
            .map(|p| p.mean_payoff)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Full trading simulation
pub struct TradingSimulation {
    config: SimulationConfig,
    clock: Arc<dyn Clock>,
    exchange: Arc<Exchange>,
    beliefs: Arc<BeliefRegistry>,
}

impl TradingSimulation {
    /// Create a simulation on wall-clock time
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: SimulationConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let exchange = Arc::new(Exchange::new(config.params.repetitions));
        let beliefs = Arc::new(BeliefRegistry::new(&config.params));

        Ok(Self {
            config,
            clock,
            exchange,
            beliefs,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn exchange(&self) -> &Arc<Exchange> {
        &self.exchange
    }

    pub fn beliefs(&self) -> &Arc<BeliefRegistry> {
        &self.beliefs
    }

    /// Discard every book, history and shared belief
    pub fn reset(&self) {
        self.exchange.reset();
        self.beliefs.reset();
        log::info!("Simulation reset");
    }

    /// Run every repetition with a fresh population and score it
    pub async fn run_repetitions(&self) -> Result<SimulationResults> {
        self.reset();
        let params = &self.config.params;
        let bootstrap = SimulationBootstrap::new(&self.config)?;
        let game_start = self.clock.now() + self.config.start_delay_ms;

        log::info!(
            "Starting simulation: {} agents, {} repetitions, seed {}",
            bootstrap.agents.len(),
            params.repetitions,
            bootstrap.seed
        );

        let mut agents = bootstrap.agents;
        agents.shuffle(&mut StdRng::seed_from_u64(bootstrap.seed));

        let mut handles = Vec::with_capacity(agents.len());
        for config in agents {
            let agent_id = config.agent_id.clone();
            let runtime = AgentRuntime::new(
                config,
                params.clone(),
                &self.beliefs,
                Arc::clone(&self.exchange),
                Arc::clone(&self.clock),
                game_start,
            );
            handles.push((agent_id, tokio::spawn(runtime.run())));
        }

        for repetition in 0..params.repetitions {
            sleep_until(
                self.clock.as_ref(),
                params.repetition_end(game_start, repetition),
            )
            .await;
            self.exchange.close(repetition).await?;
        }

        let mut reports = Vec::with_capacity(handles.len());
        let mut failure = None;
        for (agent_id, handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    log::error!("[{}] Agent task failed: {}", agent_id, e);
                    failure.get_or_insert(SimulationError::Join {
                        agent: agent_id.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        if let Some(error) = failure {
            return Err(error);
        }

        let mut repetitions = Vec::with_capacity(params.repetitions);
        for index in 0..params.repetitions {
            repetitions.push(RepetitionLog {
                index,
                orders: self.exchange.orders(index).await?.len(),
                transactions: self.exchange.transactions(index).await?,
            });
        }

        let logs: Vec<Vec<Transaction>> = repetitions
            .iter()
            .map(|r| r.transactions.clone())
            .collect();
        for report in &mut reports {
            report.settle(&logs, params);
        }
        reports.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
        let payoffs = scoring::mean_payoffs(&reports);

        let results = SimulationResults {
            seed: bootstrap.seed,
            game_start,
            repetitions,
            agents: reports,
            payoffs,
        };
        log::info!(
            "Simulation finished: {} transactions over {} repetitions",
            results.total_transactions(),
            params.repetitions
        );
        Ok(results)
    }
}
