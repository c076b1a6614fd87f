//! Popover configuration registry
//!
//! Centralized constants for the overlay, the explanation cache and the
//! completion endpoint, so no component hardcodes them.

use std::time::Duration;

use crate::shared::types::PopoverStyle;

/// DOM id of the singleton overlay element
pub const OVERLAY_ID: &str = "ai-popover";

/// Storage slot holding the serialized explanation cache
pub const STORAGE_SLOT: &str = "aiTextPopover";

/// Maximum number of cached explanations
pub const CACHE_CAPACITY: usize = 10;

/// Gap between the bottom of the selection and the top of the overlay (px)
pub const VERTICAL_OFFSET_PX: f64 = 8.0;

/// Selections shorter than this (in characters, after trimming) are ignored
pub const MIN_SELECTION_CHARS: usize = 2;

pub const COMPLETION_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const COMPLETION_MODEL: &str = "llama3-70b-8192";

/// Upper bound on a single explanation request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const LOADING_TEXT: &str = "Loading...";
pub const FALLBACK_TEXT: &str = "No response from AI.";
pub const ERROR_TEXT: &str = "Error fetching AI response.";

/// Build the user prompt sent to the completion endpoint
pub fn build_prompt(text: &str) -> String {
    format!("Explain this in simple terms:\n\n\"{}\"", text)
}

/// Style of the overlay element, sent to the surface on mount
pub fn popover_style() -> PopoverStyle {
    PopoverStyle {
        element_id: OVERLAY_ID.to_string(),
        max_width_px: 300,
        max_height_px: 450,
        padding_px: 10,
        border_radius_px: 8,
        z_index: 9999,
        scroll_on_overflow: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_wraps_text_in_quotes() {
        assert_eq!(
            build_prompt("borrow checker"),
            "Explain this in simple terms:\n\n\"borrow checker\""
        );
    }

    #[test]
    fn test_style_is_bounded() {
        let style = popover_style();
        assert_eq!(style.element_id, OVERLAY_ID);
        assert_eq!(style.max_width_px, 300);
        assert_eq!(style.max_height_px, 450);
        assert!(style.scroll_on_overflow);
    }
}
