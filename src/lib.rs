pub mod config;
pub mod db;
pub mod error;
pub mod keywords;
pub mod lexicon;
pub mod models;
pub mod pg_store;
pub mod pipeline;
pub mod queue;
pub mod sentiment;
pub mod store;
pub mod worker;
