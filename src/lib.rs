//! Top Stories library
//!
//! Fetches a news provider's top stories per section, caches them locally for
//! ten minutes, and renders them in a terminal UI. The modules are exposed for
//! use in integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod feed;
pub mod fetch;
pub mod storage;
pub mod theme;
pub mod ui;
