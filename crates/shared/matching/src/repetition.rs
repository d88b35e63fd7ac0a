use agora_core::{NewOrder, Order, OrderSeq, QuoteStatus, Transaction};

use crate::book::{BookOutcome, MarketBook};
use crate::history::BidHistory;

/// What the host reports back for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rested(OrderSeq),
    Matched(OrderSeq, Transaction),
    NotImproving(OrderSeq),
    /// The repetition is over; nothing was recorded
    Closed,
}

impl SubmitOutcome {
    pub fn seq(&self) -> Option<OrderSeq> {
        match self {
            SubmitOutcome::Rested(seq)
            | SubmitOutcome::Matched(seq, _)
            | SubmitOutcome::NotImproving(seq) => Some(*seq),
            SubmitOutcome::Closed => None,
        }
    }
}

/// One timed run of the auction: its book, its history and whether it is open
#[derive(Debug)]
pub struct Repetition {
    index: usize,
    book: MarketBook,
    history: BidHistory,
    closed: bool,
    next_seq: OrderSeq,
}

impl Repetition {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            book: MarketBook::new(),
            history: BidHistory::new(),
            closed: false,
            next_seq: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Sequence the order, run it through the book and record it
    pub fn submit(&mut self, order: NewOrder) -> SubmitOutcome {
        if self.closed {
            return SubmitOutcome::Closed;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let order: Order = order.sequenced(seq);

        let outcome = self.book.submit(order.clone());
        self.history.record(order);

        match outcome {
            BookOutcome::Rested => SubmitOutcome::Rested(seq),
            BookOutcome::NotImproving => SubmitOutcome::NotImproving(seq),
            BookOutcome::Matched(tx) => {
                self.history.record_transaction(tx.clone());
                SubmitOutcome::Matched(seq, tx)
            }
        }
    }

    pub fn current_quote(&self) -> QuoteStatus {
        if self.closed {
            QuoteStatus::Closed
        } else {
            QuoteStatus::Open(self.book.quote())
        }
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn book(&self) -> &MarketBook {
        &self.book
    }

    pub fn history(&self) -> &BidHistory {
        &self.history
    }
}
