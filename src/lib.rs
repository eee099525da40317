pub mod app;
pub mod channel;
pub mod components;
pub mod config;
pub mod logging;
pub mod network;
pub mod queue;
pub mod scheduler;
pub mod storage;
pub mod theme;
pub mod utility;
