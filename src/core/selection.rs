//! Selection watching
//!
//! Turns host page events into present/hide calls on the popover.

pub mod watcher;

pub use watcher::{qualifying_text, SelectionWatcher};
