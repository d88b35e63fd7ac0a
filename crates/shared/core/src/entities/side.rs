use serde::{Deserialize, Serialize};

use crate::values::Price;

/// Which side of the market an agent trades on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }

    /// Surplus earned trading one unit of `value` at `price`
    pub fn surplus(&self, value: Price, price: Price) -> Price {
        match self {
            Side::Buy => value - price,
            Side::Sell => price - value,
        }
    }

    /// True if trading at `price` would give negative utility against `value`
    pub fn loses_at(&self, price: Price, value: Price) -> bool {
        self.surplus(value, price) < 0
    }

    /// Pull `price` back to `value` when it would lose money
    pub fn clamp_to_value(&self, price: Price, value: Price) -> Price {
        match self {
            Side::Buy => price.min(value),
            Side::Sell => price.max(value),
        }
    }

    /// The least aggressive admissible price for this side
    pub fn passive_extreme(&self, v_min: Price, v_max: Price) -> Price {
        match self {
            Side::Buy => v_min,
            Side::Sell => v_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surplus_by_side() {
        assert_eq!(Side::Buy.surplus(200, 150), 50);
        assert_eq!(Side::Sell.surplus(100, 140), 40);
        assert!(Side::Buy.loses_at(201, 200));
        assert!(!Side::Sell.loses_at(100, 100));
    }

    #[test]
    fn test_clamp_to_value() {
        assert_eq!(Side::Buy.clamp_to_value(210, 200), 200);
        assert_eq!(Side::Buy.clamp_to_value(120, 200), 120);
        assert_eq!(Side::Sell.clamp_to_value(90, 100), 100);
        assert_eq!(Side::Sell.passive_extreme(61, 260), 260);
    }
}
