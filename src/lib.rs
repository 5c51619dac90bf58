//! Core library for the funding-ticker project.
//!
//! Tracks one perpetual futures pair: a live mark price from the exchange
//! stream, a REST poll as backup, and a countdown to the next funding
//! settlement, all rendered into caller-supplied display sinks.

pub mod backoff;
pub mod cli;
pub mod clock;
pub mod config;
pub mod console;
pub mod display;
pub mod errors;
pub mod feed;
pub mod format;
pub mod models;
pub mod ticker;
pub mod utils;
