use agora_core::{MarketParams, Price, Side};

use super::adapter::{RiskAdapter, RiskSnapshot, TargetModel};
use super::step_toward;
use crate::registry::StrategyKind;
use crate::strategy::{Strategy, StrategyContext};

const THETA: f64 = 1.0;
const BETA: f64 = 0.5;
/// Spread at or below which the opposing quote is taken outright
const DELTA: Price = 1;

/// Risk-based target: positive `r` shades the target away from the value
#[derive(Debug, Clone, Default)]
pub struct RbModel;

impl TargetModel for RbModel {
    fn decay(&self) -> f64 {
        1.0
    }

    fn learning_rate(&self) -> f64 {
        BETA
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
            Side::Buy if (0.0..=1.0).contains(&r) => {
                p - (p - v_min) * r * (THETA * (r - 1.0)).exp()
            }
            Side::Buy if (-1.0..0.0).contains(&r) => {
                let bend = ((p - v_min) / (value - p)).ln() - THETA;
                p - (value - p) * r * ((r + 1.0) * bend).exp()
            }
            Side::Sell if (0.0..=1.0).contains(&r) => {
                p + (v_max - p) * r * ((r - 1.0) * THETA).exp()
            }
            Side::Sell if (-1.0..0.0).contains(&r) => {
                let bend = ((v_max - p) / (p - value)).ln() - THETA;
                p + (p - value) * r * ((r + 1.0) * bend).exp()
            }
            _ => f64::NAN,
        }
    }
}

pub struct Rb {
    adapter: RiskAdapter<RbModel>,
}

impl Rb {
    pub fn new(seed: u64) -> Self {
        Self {
            adapter: RiskAdapter::new(RbModel, seed),
        }
    }

    pub fn snapshot(&self) -> RiskSnapshot {
        self.adapter.snapshot()
    }
}

impl Strategy for Rb {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Rb
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
                if bid > value {
                    ctx.params.v_min
                } else if ask - bid <= DELTA {
                    ask
                } else {
                    match target {
                        None => step_toward(Side::Buy, bid, f64::from(value.min(ask))),
                        Some(tau) if f64::from(ask) <= tau => ask,
                        Some(tau) => step_toward(Side::Buy, bid, tau),
                    }
                }
            }
            Side::Sell => {
                if ask < value {
                    ctx.params.v_max
                } else if ask - bid <= DELTA {
                    bid
                } else {
                    match target {
                        None => step_toward(Side::Sell, ask, f64::from(value.max(bid))),
                        Some(tau) if f64::from(bid) >= tau => bid,
                        Some(tau) => step_toward(Side::Sell, ask, tau),
                    }
                }
            }
        };
        Some(ctx.side.clamp_to_value(price, value))
    }
}
