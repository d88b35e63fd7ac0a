use serde::{Deserialize, Serialize};

use super::Side;
use crate::values::Price;

/// Per-unit private values, most profitable unit first
///
/// Sellers hold costs in ascending order, buyers hold valuations in
/// descending order. The value in play is `values[holdings]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateValues(Vec<Price>);

impl PrivateValues {
    pub fn new(mut values: Vec<Price>, side: Side) -> Self {
        values.sort_unstable();
        if side.is_buy() {
            values.reverse();
        }
        Self(values)
    }

    /// Value of the unit traded after `holdings` units
    pub fn get(&self, holdings: usize) -> Option<Price> {
        self.0.get(holdings).copied()
    }

    pub fn as_slice(&self) -> &[Price] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buyer_values_descend() {
        let values = PrivateValues::new(vec![100, 250, 180], Side::Buy);
        assert_eq!(values.as_slice(), &[250, 180, 100]);
        assert_eq!(values.get(0), Some(250));
        assert_eq!(values.get(3), None);
    }

    #[test]
    fn test_seller_values_ascend() {
        let values = PrivateValues::new(vec![100, 250, 180], Side::Sell);
        assert_eq!(values.as_slice(), &[100, 180, 250]);
    }
}
