//! Popover core
//!
//! - `cache`: recent explanations, persisted to one storage slot
//! - `explain`: completion endpoint client
//! - `selection`: host page events to present/hide
//! - `popover`: the overlay state machine

pub mod cache;
pub mod explain;
pub mod selection;
pub mod popover;

#[cfg(test)]
pub(crate) mod testing;
