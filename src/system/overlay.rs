//! Overlay surface
//!
//! The popover never touches the host page directly. It emits
//! [`PopoverEvent`]s to an [`OverlaySurface`], which owns the actual element.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::shared::events::PopoverEvent;
use crate::shared::types::PopoverSnapshot;

/// Host-side owner of the overlay element
pub trait OverlaySurface: Send + Sync {
    /// Whether the overlay element already exists on the page
    fn is_mounted(&self) -> bool;

    fn emit(&self, event: PopoverEvent);
}

#[derive(Default)]
struct SurfaceLog {
    mounted: bool,
    events: Vec<PopoverEvent>,
}

/// In-process surface that records everything it is sent
#[derive(Clone, Default)]
pub struct MemorySurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> std::sync::MutexGuard<'_, SurfaceLog> {
        match self.log.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Most recently rendered snapshot
    pub fn last_snapshot(&self) -> Option<PopoverSnapshot> {
        self.log().events.iter().rev().find_map(|event| match event {
            PopoverEvent::Rendered(snapshot) => Some(snapshot.clone()),
            PopoverEvent::Mounted(_) => None,
        })
    }

    pub fn events(&self) -> Vec<PopoverEvent> {
        self.log().events.clone()
    }

    pub fn render_count(&self) -> usize {
        self.log()
            .events
            .iter()
            .filter(|event| matches!(event, PopoverEvent::Rendered(_)))
            .count()
    }
}

impl OverlaySurface for MemorySurface {
    fn is_mounted(&self) -> bool {
        self.log().mounted
    }

    fn emit(&self, event: PopoverEvent) {
        let mut log = self.log();
        if matches!(event, PopoverEvent::Mounted(_)) {
            log.mounted = true;
        }
        log.events.push(event);
    }
}

/// Claim on mounting the overlay, shared by every init attempt of a host.
///
/// Exactly one caller wins until the claim is released.
#[derive(Debug, Default)]
pub struct MountClaim {
    claimed: AtomicBool,
}

impl MountClaim {
    pub fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Give the claim back after a mount that failed
    pub fn release(&self) {
        self.claimed.store(false, Ordering::SeqCst);
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}
