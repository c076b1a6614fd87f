pub mod shared;
pub mod core;
pub mod system;
pub mod config;

#[cfg(feature = "tauri")]
pub mod api;

use std::sync::Arc;

use tracing::info;

use crate::config::popover_style;
use crate::core::cache::{ExplanationCache, KeyValueStore};
use crate::core::explain::{CompletionTransport, ExplanationClient};
use crate::core::popover::PopoverController;
use crate::shared::emit::emit_event;
use crate::shared::error::{AppError, AppResult};
use crate::shared::events::PopoverEvent;
use crate::shared::types::InitOptions;
use crate::system::overlay::OverlaySurface;

pub use crate::core::selection::SelectionWatcher;

/// Host-provided collaborators
#[derive(Clone)]
pub struct HostBindings {
    pub surface: Arc<dyn OverlaySurface>,
    pub storage: Arc<dyn KeyValueStore>,
    pub transport: Arc<dyn CompletionTransport>,
}

/// Mount the popover and return its controller.
///
/// Returns `Ok(None)` when the surface already has the overlay mounted, so
/// calling this twice never produces a second overlay.
pub fn init_popover(options: InitOptions, host: HostBindings) -> AppResult<Option<PopoverController>> {
    if options.api_key.trim().is_empty() {
        return Err(AppError::Validation("apiKey must not be empty".to_string()));
    }

    if host.surface.is_mounted() {
        info!("overlay already mounted, skipping initialization");
        return Ok(None);
    }

    let cache = ExplanationCache::load(host.storage);
    let client = ExplanationClient::new(host.transport, options.api_key);

    emit_event(host.surface.as_ref(), PopoverEvent::Mounted(popover_style()));
    info!(cached = cache.len(), "popover initialized");

    Ok(Some(PopoverController::new(host.surface, cache, client)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::STORAGE_SLOT;
    use crate::core::cache::MemoryStore;
    use crate::core::testing::ScriptedTransport;
    use crate::shared::types::{PopoverPhase, PresentOutcome, Rect, ScrollOffset};
    use crate::system::overlay::MemorySurface;

    fn bindings(surface: &MemorySurface, storage: Arc<dyn KeyValueStore>) -> HostBindings {
        HostBindings {
            surface: Arc::new(surface.clone()),
            storage,
            transport: Arc::new(ScriptedTransport::new()),
        }
    }

    fn options() -> InitOptions {
        InitOptions { api_key: "gsk_test".to_string() }
    }

    #[test]
    fn test_init_mounts_once() {
        let surface = MemorySurface::new();
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let first = init_popover(options(), bindings(&surface, storage.clone())).unwrap();
        assert!(first.is_some());
        assert!(surface.is_mounted());

        let second = init_popover(options(), bindings(&surface, storage)).unwrap();
        assert!(second.is_none());

        let mounts = surface
            .events()
            .iter()
            .filter(|event| matches!(event, PopoverEvent::Mounted(_)))
            .count();
        assert_eq!(mounts, 1);
    }

    #[test]
    fn test_init_starts_hidden() {
        let surface = MemorySurface::new();
        let controller = init_popover(options(), bindings(&surface, Arc::new(MemoryStore::new())))
            .unwrap()
            .unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, PopoverPhase::Hidden);
        assert!(!snapshot.visible);
    }

    #[test]
    fn test_init_rejects_blank_key() {
        let surface = MemorySurface::new();
        let result = init_popover(
            InitOptions { api_key: "   ".to_string() },
            bindings(&surface, Arc::new(MemoryStore::new())),
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(!surface.is_mounted());
    }

    #[tokio::test]
    async fn test_init_with_corrupt_storage_starts_empty() {
        let surface = MemorySurface::new();
        let storage = Arc::new(MemoryStore::with_slot(STORAGE_SLOT, "\u{0}garbage"));

        let controller = init_popover(options(), bindings(&surface, storage)).unwrap().unwrap();
        assert!(controller.cache().is_empty());
    }

    #[tokio::test]
    async fn test_init_uses_persisted_cache() {
        let surface = MemorySurface::new();
        let storage = Arc::new(MemoryStore::with_slot(
            STORAGE_SLOT,
            r#"[{"key":"closure","value":"A function that remembers its surroundings."}]"#,
        ));

        let controller = init_popover(options(), bindings(&surface, storage)).unwrap().unwrap();
        let presentation = controller.present("closure", Rect::default(), ScrollOffset::default());
        assert_eq!(presentation.outcome(), PresentOutcome::Cached);
        assert_eq!(
            surface.last_snapshot().unwrap().content,
            "A function that remembers its surroundings."
        );
    }
}
