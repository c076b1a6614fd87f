//! Command modules for the webview host
//!
//! - `popover`: initialization and host page events

pub mod popover;
