//! KindMind API
//!
//! HTTP/JSON surface, Prometheus metrics and the `kindmind` command-line
//! tool built on top of [`kindmind_core`].

pub mod cli;
pub mod handler;
pub mod telemetry;

pub use handler::{create_router, ApiError, HandlerState};
