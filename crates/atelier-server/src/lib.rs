pub mod gateways;
pub mod handlers;
pub mod jar;
pub mod server;

pub use server::{build_router, start, AppState, ServerConfig, ServerHandle};
