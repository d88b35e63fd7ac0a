//! Strategy selection by name.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use agora_core::MarketParams;
use serde::{Deserialize, Serialize};

use crate::belief::{BeliefKind, BeliefRegistry};
use crate::error::{Result, StrategyError};
use crate::gd::Gd;
use crate::gdx::Gdx;
use crate::kaplan::Kaplan;
use crate::risk::{Aa, Rb};
use crate::strategy::Strategy;
use crate::zi::{Zi, Zibtq};
use crate::zip::Zip;

/// The closed set of bidding strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrategyKind {
    Zi,
    Zibtq,
    Zip,
    Kaplan,
    Rb,
    Aa,
    Gd,
    Gdx,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 8] = [
        StrategyKind::Zi,
        StrategyKind::Zibtq,
        StrategyKind::Zip,
        StrategyKind::Kaplan,
        StrategyKind::Rb,
        StrategyKind::Aa,
        StrategyKind::Gd,
        StrategyKind::Gdx,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Zi => "ZI",
            StrategyKind::Zibtq => "ZIBTQ",
            StrategyKind::Zip => "ZIP",
            StrategyKind::Kaplan => "KAPLAN",
            StrategyKind::Rb => "RB",
            StrategyKind::Aa => "AA",
            StrategyKind::Gd => "GD",
            StrategyKind::Gdx => "GDX",
        }
    }

    /// Resolve an agent name such as `zip3` or `gdx1` by its prefix
    pub fn from_agent_name(agent_name: &str) -> Result<Self> {
        let lower = agent_name.to_lowercase();
        // Longer names first: "zip"/"zibtq" before "zi", "gdx" before "gd"
        const PREFIXES: [(&str, StrategyKind); 8] = [
            ("zip", StrategyKind::Zip),
            ("zibtq", StrategyKind::Zibtq),
            ("zi", StrategyKind::Zi),
            ("rb", StrategyKind::Rb),
            ("kaplan", StrategyKind::Kaplan),
            ("gdx", StrategyKind::Gdx),
            ("gd", StrategyKind::Gd),
            ("aa", StrategyKind::Aa),
        ];
        PREFIXES
            .iter()
            .find(|(prefix, _)| lower.starts_with(prefix))
            .map(|(_, kind)| *kind)
            .ok_or_else(|| StrategyError::UnknownStrategy(agent_name.to_string()))
    }

    /// Build a fresh strategy instance
    ///
    /// GD and GDX agents share their belief state through `beliefs`.
    pub fn build(
        &self,
        params: &MarketParams,
        seed: u64,
        beliefs: &Arc<BeliefRegistry>,
    ) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Zi => Box::new(Zi::new(seed)),
            StrategyKind::Zibtq => Box::new(Zibtq::new(seed)),
            StrategyKind::Zip => Box::new(Zip::new(seed)),
            StrategyKind::Kaplan => Box::new(Kaplan::new(seed)),
            StrategyKind::Rb => Box::new(Rb::new(seed)),
            StrategyKind::Aa => Box::new(Aa::new(seed)),
            StrategyKind::Gd => Box::new(Gd::new(Arc::clone(beliefs), BeliefKind::Gd)),
            StrategyKind::Gdx => Box::new(Gdx::new(
                Arc::clone(beliefs),
                BeliefKind::Gdx,
                params.max_trades,
            )),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StrategyError::UnknownStrategy(s.to_string()))
    }
}
