use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        mongo_uri: get_env("MONGO_URI"),
        mongo_db_name: get_env_or_default("MONGO_DB_NAME", "tweetsearch"),
        twitter_api_url: get_env_or_default("TWITTER_API_URL", "https://api.twitter.com"),
        twitter_bearer_token: get_env("TWITTER_BEARER_TOKEN"),
        bind_addr: get_env_or_default("BIND_ADDR", "0.0.0.0:8080"),
        log_dir: get_env_or_default("LOG_DIR", "log"),
        static_dir: get_env_or_default("STATIC_DIR", "static"),
    }
});

pub struct Config {
    pub mongo_uri: String,
    pub mongo_db_name: String,
    pub twitter_api_url: String,
    pub twitter_bearer_token: String,
    pub bind_addr: String,
    /// Root of the per-batch JSON log files.
    pub log_dir: String,
    pub static_dir: String,
}

fn get_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("Missing required environment variable: {key}"))
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
