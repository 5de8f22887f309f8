#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod cli;
mod gui;
#[cfg(not(target_os = "linux"))]
mod tray;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::Args;
use global_hotkey::GlobalHotKeyManager;
use gui::{EditorView, GuiFlags};
use obsidian_helper_core::config::{default_config_path, get_runtime_directory, load_config, APP_NAME};
use obsidian_helper_core::cursor_store::CursorStore;
use obsidian_helper_core::handlers::Vault;
use obsidian_helper_core::hotkeys::HotkeyBindings;
use obsidian_helper_core::instance::{InstanceIdentity, Role};
use obsidian_helper_core::ipc::{self, RemoteEndpoint};
use obsidian_helper_core::Session;
use tracing_subscriber::EnvFilter;

/// Renderer crates are chatty at info
const QUIET_CRATES: &str = "wgpu_core=warn,wgpu_hal=warn,iced_wgpu=warn,naga=warn";

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},{}", default_level, QUIET_CRATES)));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Register every bound hotkey. None when nothing is bound or the OS refuses.
fn register_hotkeys(bindings: &HotkeyBindings) -> Option<GlobalHotKeyManager> {
    if bindings.is_empty() {
        tracing::info!("No global hotkeys configured");
        return None;
    }

    let manager = match GlobalHotKeyManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            tracing::warn!("Global hotkeys unavailable: {}", e);
            return None;
        }
    };

    for (action, hotkey) in bindings.hotkeys() {
        match manager.register(*hotkey) {
            Ok(()) => tracing::info!("Registered hotkey {:?} for {}", hotkey, action),
            Err(e) => tracing::warn!("Failed to register hotkey for {}: {}", action, e),
        }
    }
    Some(manager)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Unknown names fail here, before any window or IPC
    let action = args.action()?;

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let runtime_dir = get_runtime_directory()?;
    let identity = InstanceIdentity::new(APP_NAME, &runtime_dir);

    let _guard = match identity.acquire()? {
        Role::Owner(guard) => guard,
        Role::Follower => {
            let Some(action) = action else {
                tracing::info!("Already running and no action given; nothing to do");
                return Ok(());
            };
            ipc::invoke(&identity.endpoint(), action.name())
                .with_context(|| format!("Failed to forward {} to the running instance", action))?;
            tracing::info!("Forwarded {} to the running instance", action);
            return Ok(());
        }
    };

    tracing::info!("Obsidian Helper starting as owner (vault {})", config.obsidian_path.display());

    let (calls_tx, calls_rx) = crossbeam_channel::unbounded();
    let _endpoint = RemoteEndpoint::bind(identity.endpoint(), calls_tx)?;

    let cursors = CursorStore::open(&config.cursor_db)
        .with_context(|| format!("Failed to open cursor store {}", config.cursor_db.display()))?;
    let mut session = Session::new(Vault::new(&config), cursors, EditorView::default());
    if let Some(action) = action {
        session
            .select(action)
            .with_context(|| format!("Failed to open {}", action))?;
    }

    let hotkeys = HotkeyBindings::from_shortcuts(config.shortcuts());
    let hotkey_manager = register_hotkeys(&hotkeys);

    #[cfg(not(target_os = "linux"))]
    let tray = match tray::TrayIconManager::new() {
        Ok(tray) => Some(tray),
        Err(e) => {
            tracing::warn!("Continuing without tray icon: {}", e);
            None
        }
    };

    gui::run(GuiFlags {
        session,
        calls: calls_rx,
        hotkeys,
        hotkey_manager,
        #[cfg(not(target_os = "linux"))]
        tray,
    })
    .map_err(|e| anyhow!("GUI error: {}", e))?;

    tracing::info!("Obsidian Helper exiting");
    Ok(())
}
