pub mod api;
pub mod config;
pub mod data_models;
pub mod db;
pub mod pipeline;
pub mod query;
pub mod sinks;
pub mod source;
