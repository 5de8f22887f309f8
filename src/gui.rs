/// ICED note window
///
/// Architecture:
/// - The window is created once and hidden/shown, never closed, while the
///   owner runs; only tray Quit ends the process
/// - [`Session`] decides what is displayed; this module only renders it and
///   turns UI input into session operations
/// - Tray clicks, hotkeys and remote calls arrive on channels that a 50 ms
///   poll tick drains on the event loop
use crossbeam_channel::Receiver;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use iced::widget::text_editor::{Content, Edit, Motion};
use iced::widget::{button, column, container, row, text, text_editor, Space};
use iced::{
    event, executor, keyboard, window, Alignment, Application, Color, Command, Element, Event,
    Length, Settings, Size, Subscription, Theme,
};
use obsidian_helper_core::hotkeys::HotkeyBindings;
use obsidian_helper_core::ipc::IncomingCall;
use obsidian_helper_core::text_offset::LineFormat;
use obsidian_helper_core::{Action, NoteView, Session, Status};
use std::time::Duration;

#[cfg(not(target_os = "linux"))]
use crate::tray::{TrayEvent, TrayIconManager};

const APP_TITLE: &str = "Obsidian Helper";
const POLL_INTERVAL: Duration = Duration::from_millis(50);
const WINDOW_SIZE: Size = Size::new(1024.0, 768.0);

/// Text editor state behind the session's [`NoteView`]
#[derive(Default)]
pub struct EditorView {
    content: Content,
    format: LineFormat,
    /// Note exactly as loaded, returned while the editor still holds `loaded_lines`
    loaded: String,
    loaded_lines: Vec<String>,
    action: Option<Action>,
    status: Option<Status>,
    visible: bool,
}

impl EditorView {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn lines(&self) -> Vec<String> {
        self.content.lines().map(|line| line.to_string()).collect()
    }
}

impl NoteView for EditorView {
    fn text(&self) -> String {
        let lines = self.lines();
        if lines == self.loaded_lines {
            return self.loaded.clone();
        }
        self.format.join(&lines)
    }

    fn set_text(&mut self, text: &str) {
        self.content = Content::with_text(&LineFormat::editor_text(text));
        self.format = LineFormat::detect(text);
        self.loaded = text.to_string();
        self.loaded_lines = self.lines();
    }

    fn cursor(&self) -> usize {
        let (line, column) = self.content.cursor_position();
        self.format.offset_from_position(&self.lines(), line, column)
    }

    fn set_cursor(&mut self, offset: usize) {
        let lines = self.lines();
        let position = self.format.position_from_offset(&lines, offset);
        self.content
            .perform(text_editor::Action::Move(Motion::DocumentStart));
        for _ in 0..LineFormat::editor_steps(&lines, position) {
            self.content.perform(text_editor::Action::Move(Motion::Right));
        }
    }

    fn set_action(&mut self, action: Action) {
        self.action = Some(action);
    }

    fn set_status(&mut self, status: Option<Status>) {
        self.status = status;
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

/// Everything the owner hands to the window at startup
pub struct GuiFlags {
    pub session: Session<EditorView>,
    pub calls: Receiver<IncomingCall>,
    pub hotkeys: HotkeyBindings,
    /// Registrations last only as long as the manager
    pub hotkey_manager: Option<GlobalHotKeyManager>,
    #[cfg(not(target_os = "linux"))]
    pub tray: Option<TrayIconManager>,
}

#[derive(Debug, Clone)]
pub enum Message {
    Edit(text_editor::Action),
    Submit,
    Cancel,
    ModifiersChanged(keyboard::Modifiers),
    // Poll tray, hotkey and remote-call channels
    Tick,
}

pub struct NoteWindow {
    session: Session<EditorView>,
    calls: Receiver<IncomingCall>,
    hotkeys: HotkeyBindings,
    _hotkey_manager: Option<GlobalHotKeyManager>,
    #[cfg(not(target_os = "linux"))]
    tray: Option<TrayIconManager>,
    modifiers: keyboard::Modifiers,
    /// Whether the OS window is currently shown
    shown: bool,
    /// Bring the window forward on the next sync even if already shown
    raise: bool,
}

impl NoteWindow {
    fn select(&mut self, action: Action) {
        if self.session.select(action).is_ok() {
            self.raise = true;
        }
    }

    fn submit(&mut self) {
        match self.session.submit() {
            Ok(()) => {}
            // Already logged and shown in the status line
            Err(e) => tracing::debug!("Submit kept the window open: {}", e),
        }
    }

    /// Drain everything that arrived since the last tick.
    /// Returns true when tray Quit was clicked.
    fn poll_channels(&mut self) -> bool {
        while let Ok(call) = self.calls.try_recv() {
            self.session.serve_call(call);
            if self.session.view().is_visible() {
                self.raise = true;
            }
        }

        while let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
            if event.state != HotKeyState::Pressed {
                continue;
            }
            match self.hotkeys.action_for(event.id) {
                Some(action) => {
                    tracing::info!("Hotkey pressed for {}", action);
                    self.select(action);
                }
                None => tracing::debug!("Unbound hotkey id {}", event.id),
            }
        }

        #[cfg(not(target_os = "linux"))]
        while let Some(event) = self.tray.as_ref().and_then(TrayIconManager::poll) {
            match event {
                TrayEvent::Select(action) => {
                    tracing::info!("Tray selected {}", action);
                    self.select(action);
                }
                TrayEvent::Quit => return true,
            }
        }

        false
    }

    /// Match the OS window to the session's view
    fn sync_window(&mut self) -> Command<Message> {
        let wanted = self.session.view().is_visible();
        let raise = std::mem::take(&mut self.raise);
        if wanted == self.shown && !(wanted && raise) {
            return Command::none();
        }

        self.shown = wanted;
        if wanted {
            tracing::debug!("Showing window");
            Command::batch([
                window::change_mode(window::Id::MAIN, window::Mode::Windowed),
                window::gain_focus(window::Id::MAIN),
            ])
        } else {
            tracing::debug!("Hiding window");
            window::change_mode(window::Id::MAIN, window::Mode::Hidden)
        }
    }
}

fn handle_event(event: Event, status: event::Status) -> Option<Message> {
    match event {
        Event::Window(_, window::Event::CloseRequested) => Some(Message::Cancel),
        Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
            Some(Message::ModifiersChanged(modifiers))
        }
        Event::Keyboard(keyboard::Event::KeyPressed {
            key: keyboard::Key::Named(keyboard::key::Named::Escape),
            ..
        }) => Some(Message::Cancel),
        // The editor turns a focused Ctrl+Enter into an Edit; see update
        Event::Keyboard(keyboard::Event::KeyPressed {
            key: keyboard::Key::Named(keyboard::key::Named::Enter),
            modifiers,
            ..
        }) if modifiers.control() && status == event::Status::Ignored => Some(Message::Submit),
        _ => None,
    }
}

impl Application for NoteWindow {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = GuiFlags;

    fn new(flags: GuiFlags) -> (Self, Command<Message>) {
        let shown = flags.session.view().is_visible();
        let app = NoteWindow {
            session: flags.session,
            calls: flags.calls,
            hotkeys: flags.hotkeys,
            _hotkey_manager: flags.hotkey_manager,
            #[cfg(not(target_os = "linux"))]
            tray: flags.tray,
            modifiers: keyboard::Modifiers::default(),
            shown,
            raise: false,
        };
        tracing::info!("Note window initialized (visible: {})", shown);
        (app, Command::none())
    }

    fn title(&self) -> String {
        match self.session.view().action {
            Some(action) => format!("{} - {}", APP_TITLE, action.label()),
            None => APP_TITLE.to_string(),
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        struct ChannelPoller;

        let poll = iced::subscription::unfold(
            std::any::TypeId::of::<ChannelPoller>(),
            (),
            |_| async move {
                std::thread::sleep(POLL_INTERVAL);
                (Message::Tick, ())
            },
        );

        Subscription::batch([poll, event::listen_with(handle_event)])
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::Edit(action) => {
                if self.modifiers.control() && matches!(action, text_editor::Action::Edit(Edit::Enter)) {
                    self.submit();
                } else {
                    self.session.view_mut().content.perform(action);
                }
            }
            Message::Submit => self.submit(),
            Message::Cancel => {
                if self.shown {
                    self.session.cancel();
                }
            }
            Message::ModifiersChanged(modifiers) => self.modifiers = modifiers,
            Message::Tick => {
                if self.poll_channels() {
                    tracing::info!("Quit requested from tray");
                    return window::close(window::Id::MAIN);
                }
            }
        }

        self.sync_window()
    }

    fn view(&self) -> Element<'_, Message> {
        let view = self.session.view();
        let label = view.action.map_or("Note", Action::label);

        let editor = text_editor(&view.content)
            .on_action(Message::Edit)
            .height(Length::Fill);

        let status = match &view.status {
            Some(Status::Warning(message)) => {
                text(message).style(Color::from_rgb(0.85, 0.6, 0.1))
            }
            Some(Status::Error(message)) => text(message).style(Color::from_rgb(0.85, 0.2, 0.2)),
            None => text(""),
        };

        let controls = row![
            status,
            Space::with_width(Length::Fill),
            button(text("Cancel")).on_press(Message::Cancel),
            button(text(format!("Save {}", label))).on_press(Message::Submit),
        ]
        .spacing(10)
        .align_items(Alignment::Center);

        container(column![editor, controls].spacing(10))
            .padding(10)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

/// Run the note window until tray Quit
pub fn run(flags: GuiFlags) -> iced::Result {
    let visible = flags.session.view().is_visible();

    let mut settings = Settings::with_flags(flags);
    settings.window = window::Settings {
        size: WINDOW_SIZE,
        min_size: Some(WINDOW_SIZE),
        visible,
        exit_on_close_request: false,
        ..Default::default()
    };

    NoteWindow::run(settings)
}
