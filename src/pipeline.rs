use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::data_models::Message;
use crate::query::ParsedQuery;
use crate::sinks::{Sink, SinkError};
use crate::source::{FetchError, MessageSource};

/// Parses a raw query, fetches once, then hands the batch to every sink.
///
/// ```text
///                         ┌──▶ LogSink
///  raw ─▶ parse ─▶ fetch ─┼──▶ CounterSink
///                         └──▶ PersistSink
/// ```
///
/// Each sink runs a full pass over the batch on its own task. The caller gets
/// the messages back as soon as the fetch succeeds.
pub struct FanOutPipeline {
    source: Arc<dyn MessageSource>,
    sinks: Vec<Arc<dyn Sink>>,
}

/// Outcome of one request: what was fetched, plus the still-running sinks.
pub struct Dispatch {
    pub query: ParsedQuery,
    pub messages: Vec<Message>,
    pub sinks: SinkRun,
}

pub struct SinkRun {
    tasks: Vec<(&'static str, JoinHandle<Result<(), SinkError>>)>,
}

#[derive(Debug)]
pub struct SinkReport {
    pub sink: &'static str,
    pub outcome: Result<(), SinkError>,
}

impl FanOutPipeline {
    pub fn new(source: Arc<dyn MessageSource>) -> Self {
        Self {
            source,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// A fetch failure fails the request and no sink is started.
    pub async fn handle(&self, raw: &str) -> Result<Dispatch, FetchError> {
        let query = ParsedQuery::parse(raw);
        let messages: Vec<Message> = self
            .source
            .fetch(&query.keywords, query.limit)
            .await?
            .into_iter()
            .map(|m| m.with_keywords(&query.keywords))
            .collect();

        tracing::info!(
            keywords = %query.keywords,
            limit = query.limit,
            fetched = messages.len(),
            "dispatching batch"
        );

        let batch: Arc<[Message]> = messages.clone().into();
        let tasks = self
            .sinks
            .iter()
            .map(|sink| {
                let sink = sink.clone();
                let batch = batch.clone();
                (sink.name(), tokio::spawn(async move { sink.emit(&batch).await }))
            })
            .collect();

        Ok(Dispatch {
            query,
            messages,
            sinks: SinkRun { tasks },
        })
    }
}

impl SinkRun {
    /// Waits for every sink. A panicking sink shows up as
    /// [`SinkError::Panicked`] in its own report and nowhere else.
    pub async fn join(self) -> Vec<SinkReport> {
        let mut reports = Vec::with_capacity(self.tasks.len());
        for (sink, handle) in self.tasks {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(SinkError::Panicked(e.to_string())),
            };
            reports.push(SinkReport { sink, outcome });
        }
        reports
    }

    /// Lets the sinks finish in the background and logs how each one went.
    pub fn detach(self) {
        tokio::spawn(async move {
            for report in self.join().await {
                match report.outcome {
                    Ok(()) => tracing::debug!(sink = report.sink, "sink finished"),
                    Err(e) => tracing::error!(sink = report.sink, "sink failed, error: {:#}", e),
                }
            }
        });
    }
}
