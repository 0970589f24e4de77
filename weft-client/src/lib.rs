//! High-level chat client driving the Weft streaming aggregator
//!
//! One [`ChatClient::stream_turn`] call issues a turn request and returns a
//! [`TurnStream`]: a snapshot after every applied mutation for progressive
//! rendering, then exactly one terminal update carrying the finalized
//! message (or, on transport failure, the error together with everything
//! aggregated up to that point).

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod turn;

pub use client::ChatClient;
pub use config::ClientConfig;
pub use turn::{TurnStream, TurnUpdate};
