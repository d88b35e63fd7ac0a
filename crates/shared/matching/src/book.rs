use agora_core::{Order, Quote, Side, Transaction};

/// Result of pushing one order through the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookOutcome {
    /// The order became the best on its side
    Rested,
    /// The order crossed the opposing best and both left the book
    Matched(Transaction),
    /// Kept for the record only; the standing best is unchanged
    NotImproving,
}

/// Continuous double auction book of one repetition
///
/// Each side is a stack of improving orders: an order is pushed only if it
/// beats the current top, so the top is always the best bid (ask). When the
/// tops cross they are popped together and become a [`Transaction`] priced
/// at whichever of the two arrived first. After a match the next stacked
/// order is best again. One agent has at most one resting order per side:
/// a new submission withdraws its previous one.
#[derive(Debug, Default)]
pub struct MarketBook {
    bids: Vec<Order>,
    asks: Vec<Order>,
}

impl MarketBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, order: Order) -> BookOutcome {
        let stack = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        stack.retain(|resting| resting.agent_id != order.agent_id);

        let improves = stack.last().is_none_or(|best| order.improves_on(best));
        if !improves {
            return BookOutcome::NotImproving;
        }
        stack.push(order);

        match self.take_cross() {
            Some(tx) => BookOutcome::Matched(tx),
            None => BookOutcome::Rested,
        }
    }

    fn take_cross(&mut self) -> Option<Transaction> {
        let crossed = match (self.bids.last(), self.asks.last()) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        };
        if !crossed {
            return None;
        }
        let bid = self.bids.pop()?;
        let ask = self.asks.pop()?;

        let tx = if bid.arrived_before(&ask) {
            Transaction::between(&bid, &ask)
        } else {
            Transaction::between(&ask, &bid)
        };
        log::debug!(
            "Matched {} -> {} @ {} (t={})",
            tx.seller,
            tx.buyer,
            tx.price,
            tx.timestamp
        );
        Some(tx)
    }

    pub fn quote(&self) -> Quote {
        Quote::new(
            self.bids.last().map(|order| order.price),
            self.asks.last().map(|order| order.price),
        )
    }

    pub fn best_bid(&self) -> Option<&Order> {
        self.bids.last()
    }

    pub fn best_ask(&self) -> Option<&Order> {
        self.asks.last()
    }

    /// Resting orders on both sides
    pub fn depth(&self) -> usize {
        self.bids.len() + self.asks.len()
    }
}
