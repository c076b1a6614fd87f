use tracing::debug;

use super::events::PopoverEvent;
use crate::system::overlay::OverlaySurface;

/// Deliver a popover event to the overlay surface
pub fn emit_event(surface: &dyn OverlaySurface, event: PopoverEvent) {
    match &event {
        PopoverEvent::Mounted(style) => {
            debug!(element_id = %style.element_id, "mounting overlay");
        }
        PopoverEvent::Rendered(snapshot) => {
            debug!(
                phase = ?snapshot.phase,
                visible = snapshot.visible,
                generation = snapshot.generation,
                "rendering overlay"
            );
        }
    }

    surface.emit(event);
}
