use std::sync::Arc;

use agora_core::{Order, Transaction};
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::error::{MarketError, Result};
use crate::repetition::Repetition;

/// A repetition behind its market lock
pub type SharedRepetition = Arc<Mutex<Repetition>>;

/// In-process auction host
///
/// Holds one [`Repetition`] per index, each behind its own
/// `tokio::sync::Mutex`. An agent takes the lock for its whole
/// read-decide-submit step, so every consumer sees one order of events.
pub struct Exchange {
    repetitions: DashMap<usize, SharedRepetition>,
    count: usize,
}

impl Exchange {
    pub fn new(count: usize) -> Self {
        let exchange = Self {
            repetitions: DashMap::new(),
            count,
        };
        exchange.open_all();
        exchange
    }

    fn open_all(&self) {
        for index in 0..self.count {
            self.repetitions
                .insert(index, Arc::new(Mutex::new(Repetition::new(index))));
        }
    }

    /// Discard every book and history and start over
    pub fn reset(&self) {
        self.repetitions.clear();
        self.open_all();
        log::info!("Exchange reset: {} fresh repetitions", self.count);
    }

    pub fn repetition_count(&self) -> usize {
        self.count
    }

    pub fn repetition(&self, index: usize) -> Result<SharedRepetition> {
        self.repetitions
            .get(&index)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(MarketError::RepetitionNotFound(index))
    }

    pub async fn close(&self, index: usize) -> Result<()> {
        let repetition = self.repetition(index)?;
        let mut repetition = repetition.lock().await;
        repetition.close();
        log::info!(
            "Repetition {} closed: {} orders, {} transactions",
            index,
            repetition.history().len(),
            repetition.history().transactions().len()
        );
        Ok(())
    }

    /// Snapshot of the transaction log
    pub async fn transactions(&self, index: usize) -> Result<Vec<Transaction>> {
        let repetition = self.repetition(index)?;
        let repetition = repetition.lock().await;
        Ok(repetition.history().transactions().to_vec())
    }

    /// Snapshot of the order log
    pub async fn orders(&self, index: usize) -> Result<Vec<Order>> {
        let repetition = self.repetition(index)?;
        let repetition = repetition.lock().await;
        Ok(repetition.history().orders().to_vec())
    }
}
