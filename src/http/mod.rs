//! HTTP layer.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → server.rs (router, middleware, shared state)
//!     → handlers.rs (endpoint logic, subsystem dispatch)
//!     → error.rs (subsystem errors → status + JSON body)
//! ```

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
