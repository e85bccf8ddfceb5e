//! `tradeup-calc` library crate.
//!
//! The binary (`tradeup`) is a thin wrapper around this library so that:
//!
//! - the engine and session are testable without spawning processes
//! - the observation adapter and renderers can be swapped per host
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod observe;
pub mod report;
pub mod session;
pub mod tui;
