pub mod app;
pub mod browser;
pub mod config;
pub mod dates;
pub mod digest;
pub mod fmt;
pub mod logging;
pub mod notify;
pub mod pipeline;
pub mod portal;
pub mod records;
pub mod utils;
