// src/lib.rs

pub mod cli;
pub mod config;
pub mod context;
pub mod core;
pub mod csv;
pub mod error;
pub mod log;
pub mod specs;

pub mod bloodline;
pub mod labels;
pub mod progress;
pub mod race_id;
pub mod schedule;
pub mod scrape;
pub mod store;

pub use error::{Error, Result};
