//! Bootstrap - population and private value setup
//!
//! Handles initial setup of a simulation run:
//! - Parsing and validating the JSON configuration
//! - Building the standard population (`n` sellers and `n` buyers per strategy)
//! - Drawing private values and per-agent seeds from the master seed

use std::collections::HashSet;

use agora_core::{AgentId, MarketParams, Price, PrivateValues, Side};
use agora_strategy::StrategyKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::agent::AgentConfig;
use crate::error::{Result, SimulationError};

/// One agent in the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    /// Resolved from the name prefix (`zip3` → ZIP) when absent
    #[serde(default)]
    pub strategy: Option<StrategyKind>,
    pub side: Side,
    /// Drawn at bootstrap when absent
    #[serde(default)]
    pub values: Option<Vec<Price>>,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, strategy: StrategyKind, side: Side) -> Self {
        Self {
            name: name.into(),
            strategy: Some(strategy),
            side,
            values: None,
        }
    }

    pub fn with_values(mut self, values: Vec<Price>) -> Self {
        self.values = Some(values);
        self
    }

    pub fn kind(&self) -> Result<StrategyKind> {
        match self.strategy {
            Some(kind) => Ok(kind),
            None => Ok(StrategyKind::from_agent_name(&self.name)?),
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub params: MarketParams,
    pub agents: Vec<AgentSpec>,
    /// Master seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Delay between `run_repetitions` and the first repetition
    pub start_delay_ms: i64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::profile(&StrategyKind::ALL, 1)
    }
}

impl SimulationConfig {
    /// `per_role` sellers then `per_role` buyers for each strategy, named
    /// `<strategy><n>` with `n` counting across both roles
    pub fn profile(kinds: &[StrategyKind], per_role: usize) -> Self {
        let mut agents = Vec::with_capacity(kinds.len() * per_role * 2);
        for kind in kinds {
            let prefix = kind.name().to_lowercase();
            for n in 0..per_role * 2 {
                let side = if n < per_role { Side::Sell } else { Side::Buy };
                agents.push(AgentSpec::new(format!("{}{}", prefix, n + 1), *kind, side));
            }
        }

        Self {
            params: MarketParams::default(),
            agents,
            seed: None,
            start_delay_ms: 0,
        }
    }

    pub fn with_params(mut self, params: MarketParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        if self.agents.is_empty() {
            return Err(SimulationError::Config("no agents configured".to_string()));
        }
        if self.start_delay_ms < 0 {
            return Err(SimulationError::Config(format!(
                "negative start delay {}ms",
                self.start_delay_ms
            )));
        }

        let mut names = HashSet::new();
        for agent in &self.agents {
            if !names.insert(agent.name.as_str()) {
                return Err(SimulationError::Config(format!(
                    "duplicate agent name '{}'",
                    agent.name
                )));
            }
            agent.kind()?;
            if let Some(values) = &agent.values {
                if values.len() != self.params.max_trades {
                    return Err(SimulationError::Config(format!(
                        "agent '{}' has {} values, expected {}",
                        agent.name,
                        values.len(),
                        self.params.max_trades
                    )));
                }
                for value in values {
                    self.params.check_value(*value)?;
                }
            }
        }
        Ok(())
    }
}

/// Agents ready to run, with everything random already drawn
pub struct SimulationBootstrap {
    pub seed: u64,
    pub agents: Vec<AgentConfig>,
}

impl SimulationBootstrap {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let params = &config.params;

        let mut agents = Vec::with_capacity(config.agents.len());
        for spec in &config.agents {
            let strategy = spec.kind()?;
            let values = match &spec.values {
                Some(values) => values.clone(),
                None => (0..params.max_trades)
                    .map(|_| rng.gen_range(params.v_min..=params.v_max))
                    .collect(),
            };
            let agent = AgentConfig {
                agent_id: AgentId::from(spec.name.as_str()),
                side: spec.side,
                strategy,
                values: PrivateValues::new(values, spec.side),
                seed: rng.r#gen(),
            };
            log::info!(
                "Registered {} {:?} agent '{}' with values {:?}",
                agent.strategy,
                agent.side,
                agent.agent_id,
                agent.values.as_slice()
            );
            agents.push(agent);
        }

        Ok(Self { seed, agents })
    }

    /// Get agent by id
    pub fn get_agent(&self, agent_id: &str) -> Option<&AgentConfig> {
        self.agents.iter().find(|a| a.agent_id.as_str() == agent_id)
    }

    pub fn buyers(&self) -> Vec<&AgentConfig> {
        self.agents.iter().filter(|a| a.side == Side::Buy).collect()
    }

    pub fn sellers(&self) -> Vec<&AgentConfig> {
        self.agents.iter().filter(|a| a.side == Side::Sell).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_names_and_roles() {
        let config = SimulationConfig::profile(&[StrategyKind::Zip, StrategyKind::Gdx], 2);
        let names: Vec<&str> = config.agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            ["zip1", "zip2", "zip3", "zip4", "gdx1", "gdx2", "gdx3", "gdx4"]
        );
        assert_eq!(config.agents[0].side, Side::Sell);
        assert_eq!(config.agents[3].side, Side::Buy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_values_drawn_in_range_and_sorted() {
        let config = SimulationConfig::profile(&StrategyKind::ALL, 1).with_seed(11);
        let bootstrap = SimulationBootstrap::new(&config).unwrap();
        assert_eq!(bootstrap.agents.len(), 16);
        assert_eq!(bootstrap.buyers().len(), 8);

        for agent in &bootstrap.agents {
            let values = agent.values.as_slice();
            assert_eq!(values.len(), 10);
            assert!(values.iter().all(|v| (61..=260).contains(v)));
            for pair in values.windows(2) {
                match agent.side {
                    Side::Buy => assert!(pair[0] >= pair[1]),
                    Side::Sell => assert!(pair[0] <= pair[1]),
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_draws() {
        let config = SimulationConfig::profile(&[StrategyKind::Zi], 3).with_seed(5);
        let a = SimulationBootstrap::new(&config).unwrap();
        let b = SimulationBootstrap::new(&config).unwrap();
        for (x, y) in a.agents.iter().zip(&b.agents) {
            assert_eq!(x.values, y.values);
            assert_eq!(x.seed, y.seed);
        }
        assert!(a.get_agent("zi4").is_some());
    }

    #[test]
    fn test_from_json_resolves_names() {
        let json = r#"{
            "params": { "repetitions": 2 },
            "agents": [
                { "name": "kaplan1", "side": "Sell", "values": [100, 100, 100, 100, 100, 100, 100, 100, 100, 100] },
                { "name": "aa1", "strategy": "AA", "side": "Buy" }
            ],
            "seed": 3
        }"#;
        let config = SimulationConfig::from_json(json).unwrap();
        assert_eq!(config.params.repetitions, 2);
        assert_eq!(config.params.v_max, 260);
        assert_eq!(config.agents[0].kind().unwrap(), StrategyKind::Kaplan);
        assert_eq!(config.agents[1].kind().unwrap(), StrategyKind::Aa);
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = SimulationConfig::profile(&[StrategyKind::Zi], 1);
        config.agents[1].name = "zi1".to_string();
        assert!(matches!(config.validate(), Err(SimulationError::Config(_))));

        let config = SimulationConfig::profile(&[StrategyKind::Zi], 1).with_params(MarketParams {
            v_min: 300,
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(SimulationError::Params(_))));

        let mut config = SimulationConfig::profile(&[StrategyKind::Zi], 1);
        config.agents[0] = AgentSpec {
            name: "mystery1".to_string(),
            strategy: None,
            side: Side::Buy,
            values: None,
        };
        assert!(matches!(config.validate(), Err(SimulationError::Strategy(_))));

        let mut config = SimulationConfig::profile(&[StrategyKind::Zi], 1);
        config.agents[0] = config.agents[0].clone().with_values(vec![100; 3]);
        assert!(matches!(config.validate(), Err(SimulationError::Config(_))));

        assert!(matches!(
            SimulationConfig::from_json("{ not json"),
            Err(SimulationError::Json(_))
        ));
    }
}
