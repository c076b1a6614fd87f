//! Popover command module
//!
//! Entry points the page-side script invokes: initialization, pointer
//! release, focus enter.

use tauri::{AppHandle, State};

use crate::core::selection::SelectionWatcher;
use crate::shared::error::AppResult;
use crate::shared::types::{FocusTarget, InitOptions, PresentOutcome, RawSelection, ScrollOffset};
use crate::system::webview::init_webview;

/// Mount the popover. Returns false if it was already mounted.
#[tauri::command]
pub async fn init_ai_popover(app: AppHandle, options: InitOptions) -> AppResult<bool> {
    init_webview(&app, options)
}

/// Pointer released on the page, with the selection at that moment
#[tauri::command]
pub async fn selection_released(
    watcher: State<'_, SelectionWatcher>,
    selection: Option<RawSelection>,
    scroll: Option<ScrollOffset>,
) -> AppResult<PresentOutcome> {
    let presentation = watcher.on_pointer_release(selection.as_ref(), scroll.unwrap_or_default());
    Ok(presentation.outcome())
}

/// Focus moved to a page element
#[tauri::command]
pub async fn focus_entered(
    watcher: State<'_, SelectionWatcher>,
    target: FocusTarget,
) -> AppResult<bool> {
    Ok(watcher.on_focus_in(&target))
}
