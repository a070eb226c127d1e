//! Generative-AI document extraction subsystem.
//!
//! Treats the extraction model as an opaque external service: document
//! bytes in, structured billing fields out. Unparsable output is an
//! error, never a partially-filled claim.

pub mod client;
pub mod types;

pub use client::{ExtractionClient, API_KEY_ENV_VAR};
pub use types::{ExtractedFields, ExtractionError};
