use std::collections::VecDeque;

use agora_core::{MarketParams, Order, Price, Side, Timestamp, Transaction};
use agora_matching::{BidHistory, HistoryCursor};

use super::interpolate::fill_gaps;

/// Matched pairs kept in the window, besides the one that bounds it
pub const MEMORY: usize = 7;

/// Gjerstad-Dickhaut belief that a shout at a given price will trade
///
/// The estimator replays the repetition's history through its own pair of
/// improving-order stacks. Orders that beat their stack top enter the
/// window; crossing tops move to the accepted lists. The window keeps the
/// last `MEMORY` matched pairs and the orders after the pair before them.
///
/// ```text
/// Pr(buy, p)  = (TBL + AL) / (TBL + AL + RBG)     0 below the standing bid
/// Pr(sell, p) = (TAG + BG) / (TAG + BG + RAL)     0 above the standing ask
///
/// TBL/TAG  accepted bids ≤ p / accepted asks ≥ p
/// AL/BG    window asks ≤ p / window bids ≥ p
/// RBG/RAL  resting bids ≥ p / resting asks ≤ p
/// ```
#[derive(Debug)]
pub struct BeliefEstimator {
    v_min: Price,
    v_max: Price,
    memory: usize,
    window: VecDeque<Order>,
    bids: VecDeque<Order>,
    asks: VecDeque<Order>,
    accepted_bids: VecDeque<Order>,
    accepted_asks: VecDeque<Order>,
    cursor: HistoryCursor,
    buyer: Vec<f64>,
    seller: Vec<f64>,
    computed: bool,
}

impl BeliefEstimator {
    pub fn new(params: &MarketParams) -> Self {
        Self::with_memory(params, MEMORY)
    }

    pub fn with_memory(params: &MarketParams, memory: usize) -> Self {
        let levels = params.price_levels();
        Self {
            v_min: params.v_min,
            v_max: params.v_max,
            memory,
            window: VecDeque::new(),
            bids: VecDeque::new(),
            asks: VecDeque::new(),
            accepted_bids: VecDeque::new(),
            accepted_asks: VecDeque::new(),
            cursor: HistoryCursor::default(),
            buyer: vec![0.0; levels],
            seller: vec![0.0; levels],
            computed: false,
        }
    }

    /// Absorb new history and recompute the curves if anything changed
    pub fn refresh(&mut self, history: &BidHistory, previous: &[Transaction]) {
        let mut changed = false;
        let mut cursor = self.cursor;
        for order in history.since(&mut cursor) {
            changed |= self.absorb(order);
        }
        self.cursor = cursor;

        if changed || !self.computed {
            self.trim();
            self.recompute(previous);
            self.computed = true;
        }
    }

    /// Probability that a shout at `price` trades; 0 outside the price range
    pub fn probability(&self, side: Side, price: Price) -> f64 {
        let curve = self.curve(side);
        usize::try_from(price - self.v_min)
            .ok()
            .and_then(|index| curve.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    /// The whole curve, index 0 at `v_min`
    pub fn curve(&self, side: Side) -> &[f64] {
        match side {
            Side::Buy => &self.buyer,
            Side::Sell => &self.seller,
        }
    }

    /// Matched pairs currently in the window
    pub fn matched_pairs(&self) -> usize {
        self.accepted_bids.len()
    }

    fn absorb(&mut self, order: &Order) -> bool {
        let stack = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if !stack.back().is_none_or(|top| order.improves_on(top)) {
            return false;
        }
        stack.push_back(order.clone());
        self.window.push_back(order.clone());

        let crossed = match (self.bids.back(), self.asks.back()) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        };
        if crossed {
            if let (Some(bid), Some(ask)) = (self.bids.pop_back(), self.asks.pop_back()) {
                self.accepted_bids.push_back(bid);
                self.accepted_asks.push_back(ask);
            }
        }
        true
    }

    fn trim(&mut self) {
        let mut cutoff: Option<Timestamp> = None;
        while self.accepted_bids.len() > self.memory {
            if let (Some(bid), Some(ask)) =
                (self.accepted_bids.pop_front(), self.accepted_asks.pop_front())
            {
                cutoff = Some(bid.timestamp.max(ask.timestamp));
            }
        }
        let Some(cutoff) = cutoff else {
            return;
        };
        for queue in [
            &mut self.window,
            &mut self.bids,
            &mut self.asks,
            &mut self.accepted_bids,
            &mut self.accepted_asks,
        ] {
            while queue.front().is_some_and(|order| order.timestamp <= cutoff) {
                queue.pop_front();
            }
        }
    }

    fn count(orders: &VecDeque<Order>, keep: impl Fn(&Order) -> bool) -> f64 {
        orders.iter().filter(|order| keep(order)).count() as f64
    }

    fn raw_buyer(&self, price: Price) -> f64 {
        if self.bids.back().is_some_and(|top| price < top.price) {
            return 0.0;
        }
        let taken = Self::count(&self.accepted_bids, |o| o.price <= price)
            + Self::count(&self.window, |o| !o.is_bid() && o.price <= price);
        let rejected = Self::count(&self.bids, |o| o.price >= price);
        ratio(taken, rejected)
    }

    fn raw_seller(&self, price: Price) -> f64 {
        if self.asks.back().is_some_and(|top| price > top.price) {
            return 0.0;
        }
        let taken = Self::count(&self.accepted_asks, |o| o.price >= price)
            + Self::count(&self.window, |o| o.is_bid() && o.price >= price);
        let rejected = Self::count(&self.asks, |o| o.price <= price);
        ratio(taken, rejected)
    }

    fn recompute(&mut self, previous: &[Transaction]) {
        let prices = self.v_min..=self.v_max;
        let mut buyer: Vec<f64> = prices.clone().map(|p| self.raw_buyer(p)).collect();
        let mut seller: Vec<f64> = prices.map(|p| self.raw_seller(p)).collect();

        fill_gaps(&mut buyer);
        fill_gaps(&mut seller);

        // Last repetition's range bounds where trade is certain or hopeless
        let low = previous.iter().map(|tx| tx.price).min();
        let high = previous.iter().map(|tx| tx.price).max();
        if let (Some(low), Some(high)) = (low, high) {
            for (offset, price) in (self.v_min..=self.v_max).enumerate() {
                if price > high {
                    buyer[offset] = 1.0;
                    seller[offset] = 0.0;
                } else if price < low {
                    buyer[offset] = 0.0;
                    seller[offset] = 1.0;
                }
            }
        }

        for value in buyer.iter_mut().chain(seller.iter_mut()) {
            *value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        }
        self.buyer = buyer;
        self.seller = seller;
    }
}

/// `taken / (taken + rejected)`, NaN when both are zero
fn ratio(taken: f64, rejected: f64) -> f64 {
    let total = taken + rejected;
    if total == 0.0 { f64::NAN } else { taken / total }
}
