pub mod cancel;
pub mod client;
pub mod config;
pub mod logging;
pub mod retry;
pub mod transport;
