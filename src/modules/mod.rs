// Declare all modules
pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod storage;
pub mod utils;

// No re-exports here as they're handled in lib.rs
