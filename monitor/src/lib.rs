pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod scheduler;
