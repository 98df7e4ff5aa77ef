use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

use super::{Sink, SinkError};
use crate::data_models::Message;

pub const PER_KEYWORD_MESSAGES: &str = "per-keyword-messages";
pub const KEYWORD_LABEL: &str = "keyword";

/// Process-wide tally of how many fetched messages each keyword produced.
/// Counts only go up.
#[derive(Debug)]
pub struct KeywordCounter {
    name: &'static str,
    label: &'static str,
    counts: DashMap<String, u64>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CounterSeries {
    pub keyword: String,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct CounterSnapshot {
    pub name: &'static str,
    pub label: &'static str,
    pub series: Vec<CounterSeries>,
}

impl KeywordCounter {
    pub fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            counts: DashMap::new(),
        }
    }

    /// The entry lock is held across the add, so concurrent increments of
    /// the same keyword are never lost.
    pub fn increment(&self, keyword: &str) {
        *self.counts.entry(keyword.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, keyword: &str) -> u64 {
        self.counts.get(keyword).map(|c| *c).unwrap_or(0)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        let mut series: Vec<CounterSeries> = self
            .counts
            .iter()
            .map(|e| CounterSeries {
                keyword: e.key().clone(),
                count: *e.value(),
            })
            .collect();
        series.sort_by(|a, b| a.keyword.cmp(&b.keyword));

        CounterSnapshot {
            name: self.name,
            label: self.label,
            series,
        }
    }
}

impl Default for KeywordCounter {
    fn default() -> Self {
        Self::new(PER_KEYWORD_MESSAGES, KEYWORD_LABEL)
    }
}

pub struct CounterSink {
    counter: Arc<KeywordCounter>,
}

impl CounterSink {
    pub fn new(counter: Arc<KeywordCounter>) -> Self {
        Self { counter }
    }
}

#[async_trait]
impl Sink for CounterSink {
    fn name(&self) -> &'static str {
        "counter"
    }

    async fn emit(&self, batch: &[Message]) -> Result<(), SinkError> {
        for message in batch {
            for keyword in message.keywords().split(' ').filter(|k| !k.is_empty()) {
                self.counter.increment(keyword);
            }
        }
        Ok(())
    }
}
