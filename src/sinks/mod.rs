use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::data_models::Message;

pub mod counter;
pub mod log_file;
pub mod persist;

pub use counter::{CounterSink, KeywordCounter};
pub use log_file::LogSink;
pub use persist::{PersistSink, Persister};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{failed} of {total} records were not stored")]
    Partial { failed: usize, total: usize },
    #[error("sink task panicked: {0}")]
    Panicked(String),
}

/// A terminal consumer of fetched batches. Each sink gets the whole batch in
/// fetch order and runs on its own task, so an error here stays here.
#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn emit(&self, batch: &[Message]) -> Result<(), SinkError>;
}
