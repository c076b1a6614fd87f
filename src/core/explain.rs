//! Explanation lookup
//!
//! Sends the selected text to the completion endpoint and pulls a
//! plain-language explanation out of the reply.

pub mod types;
pub mod transport;
pub mod client;

pub use client::{Explanation, ExplanationClient};
pub use transport::{CompletionTransport, HttpTransport};
