//! Webview command layer (`tauri` feature)

pub mod commands;

/// Register the store plugin and the popover commands on a host app builder
pub fn attach(builder: tauri::Builder<tauri::Wry>) -> tauri::Builder<tauri::Wry> {
    builder
        .manage(crate::system::overlay::MountClaim::default())
        .plugin(tauri_plugin_store::Builder::default().build())
        .invoke_handler(tauri::generate_handler![
            commands::popover::init_ai_popover,
            commands::popover::selection_released,
            commands::popover::focus_entered,
        ])
}
