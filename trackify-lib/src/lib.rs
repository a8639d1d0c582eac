pub mod auth;
pub mod config;
pub mod error;
pub mod flash;
pub mod report;
pub mod tracing;
pub mod transaction;
