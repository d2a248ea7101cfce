//! Watches an EVM chain for transactions sent from a configured set of
//! addresses and writes a human-readable record for each one.

pub mod amount;
pub mod classifier;
pub mod config;
pub mod emitter;
pub mod models;
pub mod monitor;
pub mod rpc;
pub mod scanner;
