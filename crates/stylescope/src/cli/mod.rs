//! Command handlers.

pub mod classify;
pub mod config;
pub mod fetch;
pub mod models;
pub mod trends;
