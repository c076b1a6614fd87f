use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Bounding rectangle of a selection range, in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "popover.ts")]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Current document scroll offset of the host page
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "popover.ts")]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

/// Overlay position in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "popover.ts")]
pub struct Position {
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "popover.ts")]
pub enum PopoverPhase {
    #[default]
    Hidden,
    Loading,
    DisplayingCached,
    DisplayingFetched,
    DisplayingError,
}

/// Everything the surface needs to draw the overlay
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "popover.ts")]
pub struct PopoverSnapshot {
    pub phase: PopoverPhase,
    pub visible: bool,
    pub position: Position,
    pub content: String,
    /// Generation of the selection that produced this content
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "popover.ts")]
pub struct PopoverStyle {
    pub element_id: String,
    pub max_width_px: u32,
    pub max_height_px: u32,
    pub padding_px: u32,
    pub border_radius_px: u32,
    pub z_index: i32,
    pub scroll_on_overflow: bool,
}

/// One cached explanation. Field names are the persisted layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "popover.ts")]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
}

/// Selection as read from the host page on pointer release
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "popover.ts")]
pub struct RawSelection {
    pub text: String,
    #[serde(default)]
    pub ranges: Vec<Rect>,
}

/// Element that received focus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "popover.ts")]
pub struct FocusTarget {
    pub tag_name: String,
    #[serde(default)]
    pub content_editable: bool,
}

impl FocusTarget {
    /// Text inputs, text areas and content-editable regions
    pub fn is_editable(&self) -> bool {
        self.content_editable
            || self.tag_name.eq_ignore_ascii_case("input")
            || self.tag_name.eq_ignore_ascii_case("textarea")
    }
}

/// Host page events the watcher reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "popover.ts")]
pub enum HostEvent {
    PointerRelease {
        selection: Option<RawSelection>,
        #[serde(default)]
        scroll: ScrollOffset,
    },
    FocusIn {
        target: FocusTarget,
    },
}

/// Serializable summary of what `present` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[ts(export, export_to = "popover.ts")]
pub enum PresentOutcome {
    Hidden,
    Cached,
    Dispatched { generation: u64 },
    /// The request could not be started; the overlay shows the error text
    Failed,
}

/// Initialization options accepted from the host page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[ts(export, export_to = "popover.ts")]
pub struct InitOptions {
    pub api_key: String,
}
