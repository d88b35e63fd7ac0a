use agora_core::{MarketParams, Price, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::adapter::{RiskAdapter, RiskSnapshot, TargetModel};
use super::{LAMBDA_A, LAMBDA_R, step_toward};
use crate::registry::StrategyKind;
use crate::strategy::{Strategy, StrategyContext};

const RHO: f64 = 0.9;
const ALPHA_MIN: f64 = 0.0;
const ALPHA_MAX: f64 = 0.2;
const GAMMA: f64 = 2.0;
const THETA_MIN: f64 = -8.0;
const THETA_MAX: f64 = 4.0;
const THETA_INIT: f64 = -4.0;

/// Adaptive-aggressiveness target (Vytelingum et al., 2008)
///
/// Positive `r` pulls the target from `p*` toward the agent's own value,
/// negative `r` pushes it toward the passive extreme. `θ` sets how sharply
/// the curve bends and follows market volatility.
#[derive(Debug, Clone)]
pub struct AaModel {
    theta: f64,
    /// β1, learning rate of `r`
    risk_rate: f64,
    /// β2, learning rate of `θ`
    theta_rate: f64,
}

impl AaModel {
    pub fn new(risk_rate: f64, theta_rate: f64) -> Self {
        Self {
            theta: THETA_INIT,
            risk_rate,
            theta_rate,
        }
    }

    /// `(e^{xθ} − 1) / (e^θ − 1)`, rising from 0 at x = 0 to 1 at x = 1
    fn bend(&self, x: f64) -> f64 {
        ((x * self.theta).exp() - 1.0) / (self.theta.exp() - 1.0)
    }

    /// Long-run θ for a market whose volatility is `alpha`
    fn theta_goal(alpha: f64) -> f64 {
        let normalised = (alpha - ALPHA_MIN) / (ALPHA_MAX - ALPHA_MIN);
        let goal = (THETA_MAX - THETA_MIN)
            * (1.0 - normalised * (GAMMA * (normalised - 1.0)).exp())
            + THETA_MIN;
        goal.clamp(THETA_MIN, THETA_MAX)
    }
}

impl TargetModel for AaModel {
    fn decay(&self) -> f64 {
        RHO
    }

    fn learning_rate(&self) -> f64 {
        self.risk_rate
    }

    fn target(
        &self,
        side: Side,
        value: f64,
        reference: f64,
        risk: f64,
        params: &MarketParams,
    ) -> f64 {
        let v_min = f64::from(params.v_min);
        let v_max = f64::from(params.v_max);
        let p = reference;
        let r = risk;

        match side {
            Side::Buy => {
                let intramarginal = value > p;
                match (intramarginal, r >= 0.0) {
                    (true, true) => p + (value - p) * self.bend(r),
                    (true, false) => p - (p - v_min) * self.bend(-r),
                    (false, true) => value,
                    (false, false) => value - (value - v_min) * self.bend(-r),
                }
            }
            Side::Sell => {
                let intramarginal = value < p;
                match (intramarginal, r >= 0.0) {
                    (true, true) => value + (p - value) * (1.0 - self.bend(r)),
                    (true, false) => p + (v_max - p) * self.bend(-r),
                    (false, true) => value,
                    (false, false) => value + (v_max - value) * self.bend(-r),
                }
            }
        }
    }

    fn observe(&mut self, window: &[f64], reference: f64) {
        if window.is_empty() || reference <= 0.0 {
            return;
        }
        let variance = window
            .iter()
            .map(|price| (price - reference).powi(2))
            .sum::<f64>()
            / window.len() as f64;
        let alpha = variance.sqrt() / reference;
        let goal = Self::theta_goal(alpha);
        self.theta += self.theta_rate * (goal - self.theta);
    }

    fn reset(&mut self) {
        self.theta = THETA_INIT;
    }

    fn theta(&self) -> Option<f64> {
        Some(self.theta)
    }
}

pub struct Aa {
    adapter: RiskAdapter<AaModel>,
}

impl Aa {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let risk_rate = 0.4 * rng.r#gen::<f64>() + 0.2;
        let theta_rate = 0.4 * rng.r#gen::<f64>() + 0.2;
        Self {
            adapter: RiskAdapter::new(AaModel::new(risk_rate, theta_rate), rng.r#gen()),
        }
    }

    pub fn snapshot(&self) -> RiskSnapshot {
        self.adapter.snapshot()
    }
}

impl Strategy for Aa {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Aa
    }

    fn adjust_state(&mut self, ctx: &StrategyContext<'_>) {
        self.adapter.adjust(ctx);
    }

    fn submit_bids(&mut self, ctx: &StrategyContext<'_>) -> Option<Price> {
        self.adapter.enter(ctx.repetition);
        let value = ctx.current_value()?;
        let bid = ctx.bid_or_floor();
        let ask = ctx.ask_or_ceiling();
        let target = self.adapter.target();

        let price = match ctx.side {
            Side::Buy => {
                if bid >= value {
                    ctx.params.v_min
                } else {
                    match target {
                        None => {
                            let ask_plus = (1.0 + LAMBDA_R) * f64::from(ask) + LAMBDA_A;
                            step_toward(Side::Buy, bid, f64::from(value).min(ask_plus))
                        }
                        Some(tau) if f64::from(ask) <= tau => ask,
                        Some(tau) => step_toward(Side::Buy, bid, tau),
                    }
                }
            }
            Side::Sell => {
                if ask <= value {
                    ctx.params.v_max
                } else {
                    match target {
                        None => {
                            let bid_minus = (1.0 - LAMBDA_R) * f64::from(bid) - LAMBDA_A;
                            step_toward(Side::Sell, ask, f64::from(value).max(bid_minus))
                        }
                        Some(tau) if f64::from(bid) >= tau => bid,
                        Some(tau) => step_toward(Side::Sell, ask, tau),
                    }
                }
            }
        };
        Some(ctx.side.clamp_to_value(price, value))
    }
}
