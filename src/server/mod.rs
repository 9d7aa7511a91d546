//! REST API server.
//!
//! Routes live in [`http`], request handlers in [`handlers`].

mod handlers;
mod http;

pub use http::{AppState, ServerHandle, build_router, start_server};
