//! Payoff scoring
//!
//! An agent's payoff is its mean surplus per repetition. Within a
//! repetition the i-th transaction (in time order) trades unit i.

use std::collections::BTreeMap;

use agora_core::{PrivateValues, Side, Transaction};
use agora_strategy::StrategyKind;
use serde::Serialize;

use crate::agent::AgentReport;

/// Surplus of one repetition; units beyond `max_trades` earn nothing
pub fn repetition_surplus(
    side: Side,
    values: &PrivateValues,
    transactions: &[Transaction],
    max_trades: usize,
) -> i64 {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|tx| tx.timestamp);

    ordered
        .into_iter()
        .take(max_trades)
        .enumerate()
        .filter_map(|(unit, tx)| values.get(unit).map(|value| side.surplus(value, tx.price)))
        .map(i64::from)
        .sum()
}

/// Mean surplus per repetition; 0 with no repetitions
pub fn payoff(
    side: Side,
    values: &PrivateValues,
    per_repetition: &[Vec<Transaction>],
    max_trades: usize,
) -> f64 {
    if per_repetition.is_empty() {
        return 0.0;
    }
    let total: i64 = per_repetition
        .iter()
        .map(|txs| repetition_surplus(side, values, txs, max_trades))
        .sum();
    total as f64 / per_repetition.len() as f64
}

/// Mean payoff of one strategy on one side of the market
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyPayoff {
    pub side: Side,
    pub strategy: StrategyKind,
    pub agents: usize,
    pub mean_payoff: f64,
}

/// Group reports by (side, strategy) and average their payoffs
pub fn mean_payoffs(reports: &[AgentReport]) -> Vec<StrategyPayoff> {
    let mut groups: BTreeMap<(bool, StrategyKind), (usize, f64)> = BTreeMap::new();
    for report in reports {
        let entry = groups
            .entry((report.side.is_buy(), report.strategy))
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += report.payoff;
    }

    groups
        .into_iter()
        .map(|((is_buy, strategy), (agents, total))| StrategyPayoff {
            side: if is_buy { Side::Buy } else { Side::Sell },
            strategy,
            agents,
            mean_payoff: total / agents as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::AgentId;
    use approx::assert_relative_eq;

    fn tx(price: i32, timestamp: i64) -> Transaction {
        Transaction {
            price,
            timestamp,
            buyer: AgentId::from("b"),
            seller: AgentId::from("s"),
            bid_seq: 0,
            ask_seq: 1,
        }
    }

    #[test]
    fn test_units_are_scored_in_time_order() {
        let values = PrivateValues::new(vec![200, 180, 150], Side::Buy);
        // Out of order on purpose: the earlier trade uses the best unit
        let txs = vec![tx(120, 30), tx(100, 10)];
        assert_eq!(repetition_surplus(Side::Buy, &values, &txs, 3), (200 - 100) + (180 - 120));
    }

    #[test]
    fn test_extra_transactions_earn_nothing() {
        let values = PrivateValues::new(vec![80, 90], Side::Sell);
        let txs = vec![tx(100, 1), tx(110, 2), tx(200, 3)];
        assert_eq!(repetition_surplus(Side::Sell, &values, &txs, 2), 20 + 20);
    }

    #[test]
    fn test_payoff_is_mean_over_repetitions() {
        let values = PrivateValues::new(vec![200; 2], Side::Buy);
        let reps = vec![vec![tx(150, 1)], vec![], vec![tx(170, 1), tx(190, 2)]];
        assert_relative_eq!(payoff(Side::Buy, &values, &reps, 2), (50.0 + 0.0 + 40.0) / 3.0);
        assert_eq!(payoff(Side::Buy, &values, &[], 2), 0.0);
    }

    #[test]
    fn test_mean_payoffs_group_by_side_and_strategy() {
        let report = |id: &str, side: Side, strategy: StrategyKind, payoff: f64| AgentReport {
            agent_id: AgentId::from(id),
            strategy,
            side,
            values: PrivateValues::new(vec![100], side),
            holdings: vec![],
            submissions: vec![],
            transactions: vec![],
            payoff,
        };
        let reports = vec![
            report("zi1", Side::Buy, StrategyKind::Zi, 10.0),
            report("zi2", Side::Buy, StrategyKind::Zi, 20.0),
            report("zi3", Side::Sell, StrategyKind::Zi, 5.0),
            report("aa1", Side::Buy, StrategyKind::Aa, 7.0),
        ];

        let means = mean_payoffs(&reports);
        assert_eq!(means.len(), 3);
        let zi_buyers = means
            .iter()
            .find(|m| m.side == Side::Buy && m.strategy == StrategyKind::Zi)
            .unwrap();
        assert_eq!(zi_buyers.agents, 2);
        assert_relative_eq!(zi_buyers.mean_payoff, 15.0);
    }
}
