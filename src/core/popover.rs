//! Popover controller module
//!
//! Owns the single overlay and drives it through its phases:
//! - `state`: the overlay's phase, position, content and generation
//! - `controller`: cache lookup, request dispatch, stale-result filtering

pub mod state;
pub mod controller;

pub use controller::{PendingExplanation, PopoverController, Presentation};
pub use state::PopoverState;
