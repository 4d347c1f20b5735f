//! htmlnojs: an HTML-first gateway that turns handler files and markup
//! pages into routes, proxying handler calls to a backend process.

pub mod config;
pub mod discovery;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteRegistry;
