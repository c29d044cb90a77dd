pub mod api;
pub mod common;
pub mod config;
pub mod network;
pub mod session;
pub mod storage;
pub mod ui;
