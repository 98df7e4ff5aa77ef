use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Timestamp layout shared by log file names and persisted records.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d/%H-%M-%S%.3f";

/// One item returned by the search provider.
///
/// Serializes as the provider payload, untouched. `keywords` is the cleaned
/// keyword string of the query that fetched it and never leaves the process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Message {
    #[serde(skip)]
    keywords: String,
    payload: Value,
}

impl Message {
    pub fn new(payload: Value) -> Message {
        Message {
            keywords: String::new(),
            payload,
        }
    }

    pub fn with_keywords(mut self, keywords: &str) -> Message {
        self.keywords = keywords.to_string();
        self
    }

    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Compact JSON of the payload with object keys sorted at every level,
    /// so equal payloads always produce the same string.
    pub fn canonical_json(&self) -> String {
        sorted_keys(&self.payload).to_string()
    }
}

fn sorted_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Value::Object(
                keys.into_iter()
                    .map(|k| (k.clone(), sorted_keys(&map[k])))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}

/// A row of the `tweetdata` collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PersistedRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "tweetbody")]
    pub tweet_body: String,
}

impl PersistedRecord {
    pub fn from_message<Tz>(message: &Message, at: &DateTime<Tz>) -> PersistedRecord
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let tweet_body = message.canonical_json();
        PersistedRecord {
            id: record_id(&tweet_body),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            tweet_body,
        }
    }
}

/// Storage has no id generator, so the id is the SHA-256 of the body.
/// Two distinct bodies hashing alike would collide; that is not handled.
pub fn record_id(body: &str) -> String {
    hex::encode(Sha256::digest(body.as_bytes()))
}
