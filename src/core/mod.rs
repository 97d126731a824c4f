//! Core translation engine module

pub mod client;
pub mod config;
pub mod errors;
pub mod history;
pub mod models;
pub mod session;
pub mod store;
