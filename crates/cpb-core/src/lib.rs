//! Core domain + application logic for the crypto price bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the market data
//! HTTP APIs live behind ports (traits) implemented in adapter crates.

pub mod broadcast;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod market;
pub mod messaging;
pub mod security;
pub mod user_store;

pub use errors::{Error, Result};
