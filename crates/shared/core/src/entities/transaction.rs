use serde::{Deserialize, Serialize};

use super::{Order, OrderSeq, Side};
use crate::values::{AgentId, Price, Timestamp};

/// Identity of a transaction as reported by the host
pub type TransactionKey = (Price, Timestamp, AgentId, AgentId);

/// A matched (bid, ask) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    /// Price of whichever order arrived first
    pub price: Price,
    /// Arrival time of the later order
    pub timestamp: Timestamp,
    pub buyer: AgentId,
    pub seller: AgentId,
    pub bid_seq: OrderSeq,
    pub ask_seq: OrderSeq,
}

impl Transaction {
    /// Match `resting` against `incoming`; sides must differ
    pub fn between(resting: &Order, incoming: &Order) -> Self {
        let (bid, ask) = match resting.side {
            Side::Buy => (resting, incoming),
            Side::Sell => (incoming, resting),
        };
        let (earlier, later) = if resting.arrived_before(incoming) {
            (resting, incoming)
        } else {
            (incoming, resting)
        };

        Self {
            price: earlier.price,
            timestamp: later.timestamp,
            buyer: bid.agent_id.clone(),
            seller: ask.agent_id.clone(),
            bid_seq: bid.seq,
            ask_seq: ask.seq,
        }
    }

    pub fn key(&self) -> TransactionKey {
        (
            self.price,
            self.timestamp,
            self.buyer.clone(),
            self.seller.clone(),
        )
    }

    pub fn involves(&self, agent_id: &AgentId) -> bool {
        &self.buyer == agent_id || &self.seller == agent_id
    }

    /// Side `agent_id` traded on, if it took part
    pub fn side_of(&self, agent_id: &AgentId) -> Option<Side> {
        if &self.buyer == agent_id {
            Some(Side::Buy)
        } else if &self.seller == agent_id {
            Some(Side::Sell)
        } else {
            None
        }
    }

    /// Sequence number of the order matched against `seq`
    pub fn counterpart_of(&self, seq: OrderSeq) -> Option<OrderSeq> {
        if seq == self.bid_seq {
            Some(self.ask_seq)
        } else if seq == self.ask_seq {
            Some(self.bid_seq)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NewOrder;

    #[test]
    fn test_price_from_earlier_timestamp_from_later() {
        let bid = NewOrder::new(AgentId::from("buyer"), Side::Buy, 150, 1_000).sequenced(0);
        let ask = NewOrder::new(AgentId::from("seller"), Side::Sell, 140, 1_500).sequenced(1);

        let tx = Transaction::between(&bid, &ask);
        assert_eq!(tx.price, 150);
        assert_eq!(tx.timestamp, 1_500);
        assert_eq!(tx.buyer.as_str(), "buyer");
        assert_eq!(tx.seller.as_str(), "seller");
        assert_eq!(tx.counterpart_of(0), Some(1));
        assert_eq!(tx.side_of(&AgentId::from("seller")), Some(Side::Sell));
    }

    #[test]
    fn test_resting_ask_sets_price() {
        let ask = NewOrder::new(AgentId::from("s"), Side::Sell, 120, 10).sequenced(3);
        let bid = NewOrder::new(AgentId::from("b"), Side::Buy, 130, 20).sequenced(4);

        let tx = Transaction::between(&ask, &bid);
        assert_eq!(tx.price, 120);
        assert_eq!(tx.timestamp, 20);
        assert_eq!(tx.bid_seq, 4);
        assert_eq!(tx.ask_seq, 3);
    }
}
