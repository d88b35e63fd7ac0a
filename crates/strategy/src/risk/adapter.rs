use std::collections::HashSet;

use agora_core::{MarketParams, Order, OrderSeq, Side};
use agora_matching::HistoryCursor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{LAMBDA_A, LAMBDA_R, WINDOW};
use crate::strategy::StrategyContext;

/// What a shout says about the agent's target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pressure {
    /// The target would have traded with surplus to spare
    Extract,
    /// The target was beaten or too greedy to trade
    Concede,
}

impl Pressure {
    /// Sign `d` of the risk update: `r` rises on extract, falls on concede
    pub fn sign(self) -> f64 {
        match self {
            Pressure::Extract => 1.0,
            Pressure::Concede => -1.0,
        }
    }
}

/// The price-risk mapping a risk-adaptive strategy plugs in
pub trait TargetModel: Send {
    /// Weight ratio between successive older prices in `p*`
    fn decay(&self) -> f64;

    /// Learning rate β of the risk update
    fn learning_rate(&self) -> f64;

    /// Target price for `value` given `p*` and risk `r`
    fn target(
        &self,
        side: Side,
        value: f64,
        reference: f64,
        risk: f64,
        params: &MarketParams,
    ) -> f64;

    /// Hook run after each risk update with the window behind `p*`
    fn observe(&mut self, _window: &[f64], _reference: f64) {}

    /// Start of a new repetition
    fn reset(&mut self) {}

    fn theta(&self) -> Option<f64> {
        None
    }
}

/// Weighted mean of `window` (most recent first), weights `decay^i`
/// normalised to one. `None` on an empty window.
pub fn reference_price(window: &[f64], decay: f64) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    let mut weight = 1.0;
    let mut total_weight = 0.0;
    let mut sum = 0.0;
    for price in window {
        sum += weight * price;
        total_weight += weight;
        weight *= decay;
    }
    Some(sum / total_weight)
}

/// Observable adapter state
#[derive(Debug, Clone, PartialEq)]
pub struct RiskSnapshot {
    pub risk: f64,
    pub target: Option<f64>,
    pub theta: Option<f64>,
    pub consumed: usize,
    pub handled: usize,
}

/// Risk factor and target tracking shared by RB and AA
pub struct RiskAdapter<M> {
    model: M,
    rng: StdRng,
    risk: f64,
    target: Option<f64>,
    cursor: HistoryCursor,
    /// Orders already scored as the counterpart of an earlier shout
    handled: HashSet<OrderSeq>,
    repetition: Option<usize>,
}

impl<M: TargetModel> RiskAdapter<M> {
    pub fn new(model: M, seed: u64) -> Self {
        Self {
            model,
            rng: StdRng::seed_from_u64(seed),
            risk: 0.0,
            target: None,
            cursor: HistoryCursor::default(),
            handled: HashSet::new(),
            repetition: None,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn target(&self) -> Option<f64> {
        self.target
    }

    pub fn risk(&self) -> f64 {
        self.risk
    }

    pub fn snapshot(&self) -> RiskSnapshot {
        RiskSnapshot {
            risk: self.risk,
            target: self.target,
            theta: self.model.theta(),
            consumed: self.cursor.position(),
            handled: self.handled.len(),
        }
    }

    /// Fresh risk factor and target at the start of each repetition
    pub fn enter(&mut self, repetition: usize) {
        if self.repetition == Some(repetition) {
            return;
        }
        self.repetition = Some(repetition);
        self.risk = self.rng.gen_range(-0.2..=0.2);
        self.target = None;
        self.cursor = HistoryCursor::default();
        self.handled.clear();
        self.model.reset();
    }

    /// Score every shout recorded since the last call
    pub fn adjust(&mut self, ctx: &StrategyContext<'_>) {
        self.enter(ctx.repetition);
        let Some(value) = ctx.current_value() else {
            return;
        };
        // Nothing to anchor p* on until the first trade; keep the cursor
        if ctx.history.transactions().is_empty() {
            return;
        }

        let mut cursor = self.cursor;
        for shout in ctx.history.since(&mut cursor) {
            self.observe_shout(ctx, f64::from(value), shout);
        }
        self.cursor = cursor;
    }

    fn observe_shout(&mut self, ctx: &StrategyContext<'_>, value: f64, shout: &Order) {
        if self.handled.contains(&shout.seq) {
            return;
        }

        let window: Vec<f64> = ctx
            .history
            .transactions_until(shout.timestamp)
            .iter()
            .rev()
            .take(WINDOW)
            .map(|tx| f64::from(tx.price))
            .collect();
        let Some(reference) = reference_price(&window, self.model.decay()) else {
            return;
        };

        let target = self
            .model
            .target(ctx.side, value, reference, self.risk, ctx.params);
        if !target.is_finite() {
            return;
        }
        self.target = Some(target);

        let pressure = match ctx.history.transaction_for(shout) {
            Some(tx) => {
                if let Some(counterpart) = tx.counterpart_of(shout.seq) {
                    self.handled.insert(counterpart);
                }
                let q = f64::from(tx.price);
                let room = match ctx.side {
                    Side::Buy => target >= q,
                    Side::Sell => target <= q,
                };
                if room {
                    Pressure::Extract
                } else {
                    Pressure::Concede
                }
            }
            None if shout.side == ctx.side => {
                let price = f64::from(shout.price);
                let beaten = match ctx.side {
                    Side::Buy => target <= price,
                    Side::Sell => target >= price,
                };
                if !beaten {
                    return;
                }
                Pressure::Concede
            }
            None => return,
        };

        let direction = pressure.sign();
        let desired = self.risk * (1.0 + direction * LAMBDA_R) + direction * LAMBDA_A;
        self.risk = (self.risk + self.model.learning_rate() * (desired - self.risk)).clamp(-1.0, 1.0);
        self.model.observe(&window, reference);

        log::debug!(
            "{:?} shout {} @ {}: p*={:.2} tau={:.2} r={:.4}",
            pressure,
            shout.seq,
            shout.price,
            reference,
            target,
            self.risk
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::Price;
    use crate::risk::{AaModel, RbModel};
    use crate::strategy::testing::Fixture;
    use approx::assert_relative_eq;

    /// Fixture with one trade at `q`, priced by the resting bid
    fn traded_at(side: Side, value: Price, q: Price) -> Fixture {
        let mut fixture = Fixture::new(side, vec![value; 10]);
        fixture.trade(q, q, 100);
        fixture
    }

    /// Adapter entered into repetition 0 with its risk pinned to `risk`
    fn adapter_at<M: TargetModel>(model: M, risk: f64) -> RiskAdapter<M> {
        let mut adapter = RiskAdapter::new(model, 1);
        adapter.enter(0);
        adapter.risk = risk;
        adapter
    }

    /// Risk after scoring the single trade in `fixture`, with its target
    fn after_trade<M: TargetModel>(model: M, fixture: &Fixture, risk: f64) -> (f64, f64) {
        let mut adapter = adapter_at(model, risk);
        adapter.adjust(&fixture.context());
        assert_eq!(adapter.snapshot().handled, 1);
        (adapter.risk(), adapter.target().unwrap())
    }

    fn assert_trade_directions<M: TargetModel + Clone>(model: M, extract_risk: f64, concede_risk: f64) {
        // Buyer value 200 against q = 100, seller value 100 against q = 200
        for (side, value, q) in [(Side::Buy, 200, 100), (Side::Sell, 100, 200)] {
            let fixture = traded_at(side, value, q);
            let q = f64::from(q);

            let (risk, target) = after_trade(model.clone(), &fixture, extract_risk);
            match side {
                Side::Buy => assert!(target >= q),
                Side::Sell => assert!(target <= q),
            }
            assert!(risk > extract_risk, "{side:?}: tau {target} left room at {q}, r {extract_risk} -> {risk}");

            let (risk, target) = after_trade(model.clone(), &fixture, concede_risk);
            match side {
                Side::Buy => assert!(target < q),
                Side::Sell => assert!(target > q),
            }
            assert!(risk < concede_risk, "{side:?}: tau {target} missed {q}, r {concede_risk} -> {risk}");
        }
    }

    fn assert_beaten_shout_lowers_risk<M: TargetModel + Clone>(model: M, risk: f64) {
        // Each own-side shout sits at the agent's value, beyond any target
        for (side, value, q) in [(Side::Buy, 200, 100), (Side::Sell, 100, 200)] {
            let mut fixture = traded_at(side, value, q);
            let mut adapter = adapter_at(model.clone(), risk);
            adapter.adjust(&fixture.context());

            adapter.risk = risk;
            fixture.shout("rival", side, value, 200);
            adapter.adjust(&fixture.context());
            assert!(adapter.risk() < risk, "{side:?}: r {risk} -> {}", adapter.risk());
        }
    }

    #[test]
    fn test_rb_risk_direction() {
        assert_trade_directions(RbModel, -0.1, 0.1);
        assert_beaten_shout_lowers_risk(RbModel, 0.1);
    }

    #[test]
    fn test_aa_risk_direction() {
        assert_trade_directions(AaModel::new(0.3, 0.3), 0.1, -0.1);
        assert_beaten_shout_lowers_risk(AaModel::new(0.3, 0.3), 0.1);
    }

    #[test]
    fn test_unmatched_rival_side_shout_is_ignored() {
        let mut fixture = traded_at(Side::Buy, 200, 100);
        let mut adapter = adapter_at(RbModel, 0.1);
        adapter.adjust(&fixture.context());

        adapter.risk = 0.1;
        fixture.shout("rival", Side::Sell, 61, 200);
        adapter.adjust(&fixture.context());
        assert_relative_eq!(adapter.risk(), 0.1);
    }

    #[test]
    fn test_reference_price_weights_recent_first() {
        assert_eq!(reference_price(&[], 0.9), None);
        assert_relative_eq!(reference_price(&[100.0, 200.0], 1.0).unwrap(), 150.0);
        assert_relative_eq!(
            reference_price(&[100.0, 200.0], 0.9).unwrap(),
            (100.0 + 0.9 * 200.0) / 1.9
        );
    }

    #[test]
    fn test_reference_price_is_idempotent() {
        let window = [150.0, 148.0, 155.0, 160.0, 140.0];
        let first = reference_price(&window, 0.9);
        assert_eq!(first, reference_price(&window, 0.9));
        assert_eq!(first, reference_price(&window, 0.9));
    }
}
