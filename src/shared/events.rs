use serde::{Serialize, Deserialize};
use ts_rs::TS;
use super::types::{PopoverSnapshot, PopoverStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "payload")] // Tagged enum for easier frontend parsing
#[ts(export, export_to = "events.ts")]
pub enum PopoverEvent {
    #[serde(rename = "popover://mount")]
    Mounted(PopoverStyle),

    #[serde(rename = "popover://render")]
    Rendered(PopoverSnapshot),
}

impl PopoverEvent {
    /// Channel name the event is delivered on
    pub fn channel(&self) -> &'static str {
        match self {
            PopoverEvent::Mounted(_) => "popover://mount",
            PopoverEvent::Rendered(_) => "popover://render",
        }
    }
}
