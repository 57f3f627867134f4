pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod services;
pub mod store;
mod upstream;

pub use app::{app, build_state, AppState};

#[cfg(test)]
pub mod testing;
