pub mod config;
pub mod dataset;
pub mod detail;
pub mod error;
pub mod format;
pub mod http_client;
pub mod list;
pub mod loader;
pub mod page;
pub mod report;
pub mod slug;
pub mod state;
