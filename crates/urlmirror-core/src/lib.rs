pub mod config;
pub mod logging;

pub mod batch;
pub mod control;
pub mod error;
pub mod error_log;
pub mod fetch;
pub mod line_source;
pub mod mirror;
pub mod retry;
pub mod storage;
pub mod url_model;
