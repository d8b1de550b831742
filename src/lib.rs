pub mod advisor;
pub mod clock;
pub mod config;
pub mod demo_feed;
pub mod error;
pub mod format;
pub mod fpl_fetch;
pub mod http_client;
pub mod notify;
pub mod report;
pub mod scheduler;
