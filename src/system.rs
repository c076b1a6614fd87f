//! Host integration
//!
//! Surfaces the popover renders into and, with the `tauri` feature, the
//! webview bridge.

pub mod overlay;

#[cfg(feature = "tauri")]
pub mod webview;
