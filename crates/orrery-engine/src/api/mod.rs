pub mod config;
pub mod definition;
pub mod engine;
pub mod types;
