//! Webview bridge
//!
//! Renders the popover by emitting events to the page-side script and keeps
//! the cache in the plugin store file.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tauri::{AppHandle, Emitter, Manager, Runtime};
use tauri_plugin_store::{Store, StoreExt};
use tracing::{info, warn};

use super::overlay::{MountClaim, OverlaySurface};
use crate::core::cache::KeyValueStore;
use crate::core::explain::HttpTransport;
use crate::core::selection::SelectionWatcher;
use crate::shared::error::{AppError, AppResult};
use crate::shared::events::PopoverEvent;
use crate::shared::types::InitOptions;
use crate::{init_popover, HostBindings};

/// Plugin store file backing the explanation cache
const STORE_FILE: &str = "popover.json";

/// Surface that forwards popover events to the webview
pub struct WebviewSurface<R: Runtime> {
    app: AppHandle<R>,
    mounted: AtomicBool,
}

impl<R: Runtime> WebviewSurface<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self {
            app,
            mounted: AtomicBool::new(false),
        }
    }
}

impl<R: Runtime> OverlaySurface for WebviewSurface<R> {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    fn emit(&self, event: PopoverEvent) {
        let channel = event.channel();
        let result = match &event {
            PopoverEvent::Mounted(style) => {
                self.mounted.store(true, Ordering::SeqCst);
                self.app.emit(channel, style)
            }
            PopoverEvent::Rendered(snapshot) => self.app.emit(channel, snapshot),
        };

        if let Err(e) = result {
            warn!(channel, error = %e, "failed to emit popover event");
        }
    }
}

/// Storage slots kept in a plugin store file
pub struct WebviewStore<R: Runtime> {
    store: Arc<Store<R>>,
}

impl<R: Runtime> WebviewStore<R> {
    pub fn new(store: Arc<Store<R>>) -> Self {
        Self { store }
    }
}

impl<R: Runtime> KeyValueStore for WebviewStore<R> {
    fn get(&self, slot: &str) -> AppResult<Option<String>> {
        // Non-string values are handed over as JSON text; the cache decides
        // whether they parse
        Ok(self.store.get(slot).map(|value| match value {
            serde_json::Value::String(raw) => raw,
            other => other.to_string(),
        }))
    }

    fn set(&self, slot: &str, value: &str) -> AppResult<()> {
        self.store.set(slot, serde_json::Value::String(value.to_string()));
        self.store
            .save()
            .map_err(|e| AppError::Storage(format!("Failed to save store: {}", e)))
    }
}

/// Mount the popover in the webview and register the watcher as managed
/// state. Returns false if another call already mounted it.
pub fn init_webview<R: Runtime>(app: &AppHandle<R>, options: InitOptions) -> AppResult<bool> {
    // `manage` is a no-op when the claim is already registered
    app.manage(MountClaim::default());
    let claim = app.state::<MountClaim>();
    if !claim.try_claim() {
        info!("popover already initialized");
        return Ok(false);
    }

    let mounted = mount_webview(app, options);
    if mounted.is_err() {
        claim.release();
    }
    mounted
}

fn mount_webview<R: Runtime>(app: &AppHandle<R>, options: InitOptions) -> AppResult<bool> {
    let store = app
        .store(STORE_FILE)
        .map_err(|e| AppError::Storage(format!("Failed to open store: {}", e)))?;

    let bindings = HostBindings {
        surface: Arc::new(WebviewSurface::new(app.clone())),
        storage: Arc::new(WebviewStore::new(store)),
        transport: Arc::new(HttpTransport::new()),
    };

    match init_popover(options, bindings)? {
        Some(controller) => Ok(app.manage(SelectionWatcher::new(controller))),
        None => Ok(false),
    }
}
