pub mod config;
pub mod error;
pub mod proxy;
pub mod server;
pub mod upstream;
