use tracing::debug;

use crate::config::MIN_SELECTION_CHARS;
use crate::core::popover::{PopoverController, Presentation};
use crate::shared::types::{FocusTarget, HostEvent, RawSelection, ScrollOffset};

/// Trimmed selection text, if it is long enough to explain
pub fn qualifying_text(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_SELECTION_CHARS {
        return None;
    }
    Some(trimmed)
}

/// Reacts to pointer-release and focus-enter events on the host page
#[derive(Clone)]
pub struct SelectionWatcher {
    controller: PopoverController,
}

impl SelectionWatcher {
    pub fn new(controller: PopoverController) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &PopoverController {
        &self.controller
    }

    /// Dispatch a host event. Returns `None` for events that changed nothing.
    pub fn handle(&self, event: HostEvent) -> Option<Presentation> {
        match event {
            HostEvent::PointerRelease { selection, scroll } => {
                Some(self.on_pointer_release(selection.as_ref(), scroll))
            }
            HostEvent::FocusIn { target } => {
                self.on_focus_in(&target).then_some(Presentation::Hidden)
            }
        }
    }

    /// Present the overlay under the first selected range, or hide it when
    /// there is nothing worth explaining.
    pub fn on_pointer_release(
        &self,
        selection: Option<&RawSelection>,
        scroll: ScrollOffset,
    ) -> Presentation {
        let Some(selection) = selection else {
            debug!("pointer released without a selection");
            self.controller.hide();
            return Presentation::Hidden;
        };

        let (Some(text), Some(rect)) = (qualifying_text(&selection.text), selection.ranges.first())
        else {
            debug!(chars = selection.text.trim().chars().count(), "selection too short, hiding");
            self.controller.hide();
            return Presentation::Hidden;
        };

        self.controller.present(text, *rect, scroll)
    }

    /// Hide when focus moves into something the user types into. Returns
    /// whether the event was acted on.
    pub fn on_focus_in(&self, target: &FocusTarget) -> bool {
        if !target.is_editable() {
            return false;
        }
        debug!(tag = %target.tag_name, "focus entered editable surface, hiding");
        self.controller.hide();
        true
    }
}
