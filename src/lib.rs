pub mod apis;
pub mod cards;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod storage;
pub mod types;
