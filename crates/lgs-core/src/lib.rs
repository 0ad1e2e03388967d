pub mod api;
pub mod build_info;
pub mod config;
pub mod http;
pub mod jwt;
pub mod logging;
pub mod platform;
pub mod session;
pub mod update;
