//! Zero-intelligence traders.
//!
//! ZI draws a uniform price between the passive extreme and the private
//! value. ZIBTQ ("beat the quote") narrows the draw so the price is at
//! least one tick better than the standing quote on the agent's own side.

use agora_core::{Price, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::registry::StrategyKind;
use crate::strategy::{Strategy, StrategyContext};

/// Uniform draw in `[from, to]`; collapses to `from` on an empty range
fn draw(rng: &mut StdRng, from: Price, to: Price) -> Price {
    if from >= to {
        from
    } else {
        rng.gen_range(from..=to)
    }
}

pub struct Zi {
    rng: StdRng,
}

impl Zi {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for Zi {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Zi
    }

    fn submit_bids(&mut self, ctx: &StrategyContext<'_>) -> Option<Price> {
        let value = ctx.current_value()?;
        let price = match ctx.side {
            Side::Buy => draw(&mut self.rng, ctx.params.v_min, value),
            Side::Sell => draw(&mut self.rng, value, ctx.params.v_max),
        };
        Some(price)
    }
}

pub struct Zibtq {
    rng: StdRng,
}

impl Zibtq {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for Zibtq {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Zibtq
    }

    fn submit_bids(&mut self, ctx: &StrategyContext<'_>) -> Option<Price> {
        let value = ctx.current_value()?;
        let price = match ctx.side {
            Side::Buy => {
                let from = ctx.quote.bid.map_or(ctx.params.v_min, |bid| bid + 1);
                draw(&mut self.rng, from.min(value), value)
            }
            Side::Sell => {
                let to = ctx.quote.ask.map_or(ctx.params.v_max, |ask| ask - 1);
                draw(&mut self.rng, value, to.max(value))
            }
        };
        Some(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::Fixture;

    #[test]
    fn test_zi_stays_inside_value_bounds() {
        let buyer = Fixture::buyer(200);
        let seller = Fixture::seller(100);
        let mut zi = Zi::new(42);

        for _ in 0..500 {
            let bid = zi.submit_bids(&buyer.context()).unwrap();
            assert!((61..=200).contains(&bid));
            let ask = zi.submit_bids(&seller.context()).unwrap();
            assert!((100..=260).contains(&ask));
        }
    }

    #[test]
    fn test_zi_abstains_when_holdings_maxed() {
        let mut buyer = Fixture::buyer(200);
        buyer.holdings = 10;
        assert_eq!(Zi::new(1).submit_bids(&buyer.context()), None);
    }

    #[test]
    fn test_zibtq_beats_quote() {
        let buyer = Fixture::buyer(200);
        let seller = Fixture::seller(100);
        let mut zibtq = Zibtq::new(3);

        for _ in 0..200 {
            let bid = zibtq
                .submit_bids(&buyer.context_with_quote(Some(150), Some(180)))
                .unwrap();
            assert!((151..=200).contains(&bid));

            let ask = zibtq
                .submit_bids(&seller.context_with_quote(Some(90), Some(130)))
                .unwrap();
            assert!((100..=129).contains(&ask));
        }
    }

    #[test]
    fn test_zibtq_quote_beyond_value_bids_value() {
        let buyer = Fixture::buyer(120);
        let mut zibtq = Zibtq::new(9);
        let bid = zibtq
            .submit_bids(&buyer.context_with_quote(Some(150), None))
            .unwrap();
        assert_eq!(bid, 120);
    }
}
