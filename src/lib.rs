//! Declarative Reverse-Proxy Gateway Library

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use http::Gateway;
pub use lifecycle::Shutdown;
