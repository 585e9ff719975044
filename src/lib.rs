//! rotest-board - live dashboard for rotest resources
//!
//! Keeps a normalized cache of resource records in sync with the rotest
//! push feed and renders it as cards on the terminal.

pub mod audit;
pub mod cache;
pub mod cli;
pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod feed;
pub mod session;
pub mod store;
pub mod ui;
pub mod view;

pub use error::{BoardError, BoardResult};
