use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use tweetsearch::api::{AppState, create_router};
use tweetsearch::config::CONFIG;
use tweetsearch::db::{Database, TweetDataRepo};
use tweetsearch::pipeline::FanOutPipeline;
use tweetsearch::sinks::{CounterSink, KeywordCounter, LogSink, PersistSink};
use tweetsearch::source::TwitterSource;

/// Search tweets and fan the results out to log files, keyword counters and MongoDB.
#[derive(Parser)]
#[command(name = "tweetsearch", version)]
struct Cli {
    /// Address to listen on (overrides BIND_ADDR).
    #[arg(long)]
    bind: Option<String>,

    /// Root directory for batch log files (overrides LOG_DIR).
    #[arg(long)]
    log_dir: Option<String>,

    /// Directory served at `/` (overrides STATIC_DIR).
    #[arg(long)]
    static_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (also picks up `log` records from dependencies)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let bind = cli.bind.unwrap_or_else(|| CONFIG.bind_addr.clone());
    let log_dir = cli.log_dir.unwrap_or_else(|| CONFIG.log_dir.clone());
    let static_dir = cli.static_dir.unwrap_or_else(|| CONFIG.static_dir.clone());

    let db = Database::init_global().await?;
    let counter = Arc::new(KeywordCounter::default());

    let pipeline = FanOutPipeline::new(Arc::new(TwitterSource::from_config()))
        .with_sink(Arc::new(LogSink::new(&log_dir)))
        .with_sink(Arc::new(CounterSink::new(counter.clone())))
        .with_sink(Arc::new(PersistSink::new(Arc::new(TweetDataRepo::new(db)))));
    tracing::info!(sinks = ?pipeline.sink_names(), "pipeline ready");

    let app = create_router(
        AppState {
            pipeline: Arc::new(pipeline),
            counter,
        },
        &static_dir,
    );

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!("listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}
