use serde::{Deserialize, Serialize};

use super::Side;
use crate::values::{AgentId, Price, Timestamp};

/// Submission sequence number, unique within one repetition
pub type OrderSeq = u64;

/// An order as handed to the market, before it is sequenced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub agent_id: AgentId,
    pub side: Side,
    pub price: Price,
    pub timestamp: Timestamp,
}

impl NewOrder {
    pub fn new(agent_id: AgentId, side: Side, price: Price, timestamp: Timestamp) -> Self {
        Self {
            agent_id,
            side,
            price,
            timestamp,
        }
    }

    /// Stamp with the sequence number assigned by the repetition
    pub fn sequenced(self, seq: OrderSeq) -> Order {
        Order {
            seq,
            agent_id: self.agent_id,
            side: self.side,
            price: self.price,
            timestamp: self.timestamp,
        }
    }
}

/// A recorded bid (Buy) or ask (Sell). Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    pub seq: OrderSeq,
    pub agent_id: AgentId,
    pub side: Side,
    pub price: Price,
    pub timestamp: Timestamp,
}

impl Order {
    /// Arrival order: timestamp first, submission sequence breaks ties
    pub fn arrived_before(&self, other: &Order) -> bool {
        (self.timestamp, self.seq) < (other.timestamp, other.seq)
    }

    /// True if this order beats `other` on the same side
    pub fn improves_on(&self, other: &Order) -> bool {
        match self.side {
            Side::Buy => self.price > other.price,
            Side::Sell => self.price < other.price,
        }
    }

    pub fn is_bid(&self) -> bool {
        self.side.is_buy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(seq: OrderSeq, side: Side, price: Price, timestamp: Timestamp) -> Order {
        NewOrder::new(AgentId::from("a"), side, price, timestamp).sequenced(seq)
    }

    #[test]
    fn test_arrival_ties_break_on_sequence() {
        let first = order(1, Side::Buy, 100, 10);
        let second = order(2, Side::Sell, 90, 10);
        assert!(first.arrived_before(&second));
        assert!(!second.arrived_before(&first));
    }

    #[test]
    fn test_improves_on() {
        assert!(order(1, Side::Buy, 101, 0).improves_on(&order(0, Side::Buy, 100, 0)));
        assert!(!order(1, Side::Buy, 100, 0).improves_on(&order(0, Side::Buy, 100, 0)));
        assert!(order(1, Side::Sell, 99, 0).improves_on(&order(0, Side::Sell, 100, 0)));
    }
}
