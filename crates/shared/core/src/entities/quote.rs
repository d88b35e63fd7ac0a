use serde::{Deserialize, Serialize};

use crate::values::Price;

/// Best outstanding bid and ask of one repetition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: Option<Price>,
    pub ask: Option<Price>,
}

impl Quote {
    pub fn new(bid: Option<Price>, ask: Option<Price>) -> Self {
        Self { bid, ask }
    }

    pub fn bid_or(&self, default: Price) -> Price {
        self.bid.unwrap_or(default)
    }

    pub fn ask_or(&self, default: Price) -> Price {
        self.ask.unwrap_or(default)
    }

    pub fn spread(&self) -> Option<Price> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    pub fn is_crossed(&self) -> bool {
        matches!(self.spread(), Some(spread) if spread <= 0)
    }
}

/// What the host answers to a quote request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStatus {
    Open(Quote),
    Closed,
}
