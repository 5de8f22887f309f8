/// System tray icon with one menu entry per action
///
/// Menu clicks are delivered by tray-icon on its own channel; the window's
/// poll tick drains it through [`TrayIconManager::poll`].
use anyhow::{anyhow, Result};
use obsidian_helper_core::Action;
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

const ICON_FILE: &str = "icon.png";
const ICON_SIZE: u32 = 32;

/// What a menu click asks the window to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayEvent {
    Select(Action),
    Quit,
}

/// Load icon.png from beside the executable or the working directory
fn load_app_icon() -> Result<Icon> {
    let paths_to_try = [
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.join(ICON_FILE))),
        Some(std::path::PathBuf::from(ICON_FILE)),
    ];

    for path in paths_to_try.into_iter().flatten() {
        if !path.exists() {
            continue;
        }
        let icon_data = std::fs::read(&path)
            .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;

        let img = image::load_from_memory(&icon_data)
            .map_err(|e| anyhow!("Failed to decode icon: {}", e))?;
        let img = img.resize_exact(ICON_SIZE, ICON_SIZE, image::imageops::FilterType::Lanczos3);

        tracing::debug!("Tray icon loaded from {}", path.display());
        return Icon::from_rgba(img.to_rgba8().into_raw(), ICON_SIZE, ICON_SIZE)
            .map_err(|e| anyhow!("Failed to create icon from image: {:?}", e));
    }

    // Fallback: purple square
    let icon_rgba: Vec<u8> = (0..ICON_SIZE * ICON_SIZE)
        .flat_map(|_| [0x7C, 0x3A, 0xED, 0xFF])
        .collect();
    Icon::from_rgba(icon_rgba, ICON_SIZE, ICON_SIZE)
        .map_err(|e| anyhow!("Failed to create fallback icon: {:?}", e))
}

pub struct TrayIconManager {
    _tray_icon: TrayIcon,
    action_items: Vec<(MenuId, Action)>,
    quit_item: MenuId,
}

impl TrayIconManager {
    pub fn new() -> Result<Self> {
        tracing::info!("Creating tray icon");
        let icon = load_app_icon()?;

        let menu = Menu::new();
        let mut action_items = Vec::with_capacity(Action::ALL.len());
        for action in Action::ALL {
            let item = MenuItem::new(action.label(), true, None);
            menu.append(&item)
                .map_err(|e| anyhow!("Failed to add {} item: {}", action, e))?;
            action_items.push((item.id().clone(), action));
        }

        let quit = MenuItem::new("Quit", true, None);
        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| anyhow!("Failed to add separator: {}", e))?;
        menu.append(&quit)
            .map_err(|e| anyhow!("Failed to add quit item: {}", e))?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip("Obsidian Helper")
            .with_icon(icon)
            .with_menu(Box::new(menu))
            .build()
            .map_err(|e| anyhow!("Failed to create tray icon: {}", e))?;

        tracing::info!("Tray icon created with {} actions", action_items.len());

        Ok(Self {
            _tray_icon: tray_icon,
            action_items,
            quit_item: quit.id().clone(),
        })
    }

    fn event_for(&self, id: &MenuId) -> Option<TrayEvent> {
        if *id == self.quit_item {
            return Some(TrayEvent::Quit);
        }
        self.action_items
            .iter()
            .find(|(item, _)| item == id)
            .map(|(_, action)| TrayEvent::Select(*action))
    }

    /// Next pending menu click, if any
    pub fn poll(&self) -> Option<TrayEvent> {
        while let Ok(event) = MenuEvent::receiver().try_recv() {
            tracing::debug!("Menu event: {:?}", event);
            if let Some(tray_event) = self.event_for(&event.id) {
                return Some(tray_event);
            }
        }
        None
    }
}
