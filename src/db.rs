use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database as MongoDatabase};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::config::CONFIG;
use crate::data_models::PersistedRecord;
use crate::sinks::Persister;

static DB: OnceCell<Database> = OnceCell::new();

const DUPLICATE_KEY: i32 = 11000;

pub mod collections {
    pub const TWEETDATA: &str = "tweetdata";
}

/// MongoDB handle holding the `tweetdata` collection.
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    db: MongoDatabase,
}

impl Database {
    /// Connects and pings before handing the database back, so a bad URI
    /// fails at startup rather than on the first search.
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        let client_options = ClientOptions::parse(uri)
            .await
            .context("Failed to parse MongoDB connection string")?;
        let client =
            Client::with_options(client_options).context("Failed to create MongoDB client")?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to connect to MongoDB")?;

        tracing::info!(db = db_name, "connected to MongoDB");
        let db = client.database(db_name);
        Ok(Self { client, db })
    }

    /// Connects with `MONGO_URI` / `MONGO_DB_NAME` and keeps the handle for
    /// the rest of the process. Fails if called twice.
    pub async fn init_global() -> Result<&'static Database> {
        let db = Self::new(&CONFIG.mongo_uri, &CONFIG.mongo_db_name).await?;
        DB.set(db)
            .map_err(|_| anyhow::anyhow!("Database already initialized"))?;
        DB.get()
            .ok_or_else(|| anyhow::anyhow!("Database not initialized"))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn tweetdata(&self) -> Collection<PersistedRecord> {
        self.db.collection(collections::TWEETDATA)
    }
}

// =============================================================================
// Insert-only repository
// =============================================================================

pub struct Repository<T>
where
    T: Send + Sync,
{
    collection: Collection<T>,
}

impl<T> Repository<T>
where
    T: Serialize + Send + Sync,
{
    pub fn new(collection: Collection<T>) -> Self {
        Self { collection }
    }

    /// `Ok(false)` when a document with the same `_id` is already stored.
    pub async fn insert(&self, doc: &T) -> Result<bool> {
        match self.collection.insert_one(doc).await {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e).context("Failed to insert document"),
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

pub struct TweetDataRepo {
    repo: Repository<PersistedRecord>,
}

impl TweetDataRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            repo: Repository::new(db.tweetdata()),
        }
    }
}

#[async_trait]
impl Persister for TweetDataRepo {
    async fn persist(&self, record: &PersistedRecord) -> Result<bool> {
        self.repo.insert(record).await
    }
}

// =============================================================================
// Test utilities
// =============================================================================
