use std::collections::{HashMap, HashSet};

use agora_core::{AgentId, Order, OrderSeq, Timestamp, Transaction, TransactionKey};

/// Per-consumer read position in a [`BidHistory`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryCursor(usize);

impl HistoryCursor {
    /// Number of orders already consumed
    pub fn position(&self) -> usize {
        self.0
    }
}

/// Append-only log of every order and transaction of one repetition
#[derive(Debug, Default)]
pub struct BidHistory {
    orders: Vec<Order>,
    transactions: Vec<Transaction>,
    keys: HashSet<TransactionKey>,
    matched: HashMap<OrderSeq, usize>,
}

impl BidHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, order: Order) {
        self.orders.push(order);
    }

    /// Append a transaction unless one with the same key is already known
    pub fn record_transaction(&mut self, tx: Transaction) -> bool {
        if !self.keys.insert(tx.key()) {
            return false;
        }
        let index = self.transactions.len();
        self.matched.insert(tx.bid_seq, index);
        self.matched.insert(tx.ask_seq, index);
        self.transactions.push(tx);
        true
    }

    /// Orders recorded after `cursor`, advancing it as they are read
    pub fn since<'a>(&'a self, cursor: &'a mut HistoryCursor) -> Since<'a> {
        Since {
            orders: &self.orders,
            cursor,
        }
    }

    pub fn is_transacted(&self, order: &Order) -> bool {
        self.matched.contains_key(&order.seq)
    }

    pub fn transaction_for(&self, order: &Order) -> Option<&Transaction> {
        self.matched
            .get(&order.seq)
            .and_then(|index| self.transactions.get(*index))
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Transactions in time order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Transactions with timestamp at or before `timestamp`
    pub fn transactions_until(&self, timestamp: Timestamp) -> &[Transaction] {
        let end = self
            .transactions
            .partition_point(|tx| tx.timestamp <= timestamp);
        &self.transactions[..end]
    }

    /// Transactions appended after `cursor`, advancing it to the end
    pub fn transactions_since(&self, cursor: &mut usize) -> &[Transaction] {
        let start = (*cursor).min(self.transactions.len());
        *cursor = self.transactions.len();
        &self.transactions[start..]
    }

    pub fn transactions_of<'a>(
        &'a self,
        agent_id: &'a AgentId,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions.iter().filter(move |tx| tx.involves(agent_id))
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Lazy scan over new history entries
pub struct Since<'a> {
    orders: &'a [Order],
    cursor: &'a mut HistoryCursor,
}

impl<'a> Iterator for Since<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let orders: &'a [Order] = self.orders;
        let order = orders.get(self.cursor.0)?;
        self.cursor.0 += 1;
        Some(order)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.orders.len().saturating_sub(self.cursor.0);
        (left, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{NewOrder, Price, Side};

    fn order(seq: u64, agent: &str, side: Side, price: Price, timestamp: i64) -> Order {
        NewOrder::new(AgentId::from(agent), side, price, timestamp).sequenced(seq)
    }

    #[test]
    fn test_cursors_are_independent() {
        let mut history = BidHistory::new();
        history.record(order(0, "a", Side::Buy, 100, 0));
        history.record(order(1, "b", Side::Sell, 200, 1));

        let mut first = HistoryCursor::default();
        let mut second = HistoryCursor::default();

        assert_eq!(history.since(&mut first).count(), 2);
        assert_eq!(history.since(&mut first).count(), 0);

        // Partial read leaves the cursor mid-way
        let seen: Vec<u64> = history.since(&mut second).take(1).map(|o| o.seq).collect();
        assert_eq!(seen, vec![0]);
        assert_eq!(second.position(), 1);

        history.record(order(2, "c", Side::Buy, 120, 2));
        let seqs: Vec<u64> = history.since(&mut second).map(|o| o.seq).collect();
        assert_eq!(seqs, vec![1, 2]);
        assert_eq!(history.since(&mut first).count(), 1);
    }

    #[test]
    fn test_transactions_dedup_and_lookup() {
        let mut history = BidHistory::new();
        let bid = order(0, "b", Side::Buy, 150, 10);
        let ask = order(1, "s", Side::Sell, 140, 20);
        history.record(bid.clone());
        history.record(ask.clone());

        let tx = Transaction::between(&bid, &ask);
        assert!(history.record_transaction(tx.clone()));
        assert!(!history.record_transaction(tx));
        assert_eq!(history.transactions().len(), 1);

        assert!(history.is_transacted(&bid));
        assert!(history.is_transacted(&ask));
        assert_eq!(history.transaction_for(&ask).map(|t| t.price), Some(150));
        assert_eq!(history.transactions_of(&AgentId::from("s")).count(), 1);
    }

    #[test]
    fn test_transactions_until_and_since() {
        let mut history = BidHistory::new();
        for (i, ts) in [10, 20, 30].into_iter().enumerate() {
            let bid = order(2 * i as u64, "b", Side::Buy, 150, ts);
            let ask = order(2 * i as u64 + 1, "s", Side::Sell, 140 + i as i32, ts);
            history.record_transaction(Transaction::between(&bid, &ask));
        }

        assert_eq!(history.transactions_until(5).len(), 0);
        assert_eq!(history.transactions_until(20).len(), 2);
        assert_eq!(history.transactions_until(100).len(), 3);

        let mut cursor = 1;
        assert_eq!(history.transactions_since(&mut cursor).len(), 2);
        assert_eq!(cursor, 3);
        assert!(history.transactions_since(&mut cursor).is_empty());
    }
}
