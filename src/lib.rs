//! Odds of finding a particular villager on mystery-island tours, served as a
//! small web form and a command-line tool.

pub mod cli;
pub mod config;
pub mod data;
pub mod estimator;
pub mod logging;
pub mod server;
