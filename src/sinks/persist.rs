use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;

use super::{Sink, SinkError};
use crate::data_models::{Message, PersistedRecord};

/// Append-only record storage.
#[async_trait]
pub trait Persister: Send + Sync {
    /// Returns `false` when a record with the same id was already stored.
    async fn persist(&self, record: &PersistedRecord) -> anyhow::Result<bool>;
}

pub struct PersistSink {
    persister: Arc<dyn Persister>,
}

impl PersistSink {
    pub fn new(persister: Arc<dyn Persister>) -> Self {
        Self { persister }
    }
}

#[async_trait]
impl Sink for PersistSink {
    fn name(&self) -> &'static str {
        "persist"
    }

    async fn emit(&self, batch: &[Message]) -> Result<(), SinkError> {
        let mut failed = 0usize;
        for message in batch {
            let record = PersistedRecord::from_message(message, &Local::now());
            match self.persister.persist(&record).await {
                Ok(true) => tracing::debug!(id = %record.id, "stored record"),
                Ok(false) => tracing::debug!(id = %record.id, "record already stored"),
                Err(e) => {
                    failed += 1;
                    tracing::error!(id = %record.id, "error storing record, error: {:#}", e);
                }
            }
        }

        if failed > 0 {
            return Err(SinkError::Partial {
                failed,
                total: batch.len(),
            });
        }
        Ok(())
    }
}
