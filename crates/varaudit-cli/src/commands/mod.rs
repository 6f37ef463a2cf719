//! CLI command handlers

pub mod audit;
