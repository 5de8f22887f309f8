#![cfg(unix)]

use chrono::NaiveDate;
use crossbeam_channel::{unbounded, Receiver};
use obsidian_helper_core::config::AppConfig;
use obsidian_helper_core::cursor_store::CursorStore;
use obsidian_helper_core::handlers::Vault;
use obsidian_helper_core::instance::{InstanceIdentity, Role};
use obsidian_helper_core::ipc::{self, IncomingCall, RemoteEndpoint};
use obsidian_helper_core::{Action, HelperError, NoteView, Session, SessionState, Status};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Records only what the remote path can change
#[derive(Debug, Default)]
struct HeadlessView {
    text: String,
    cursor: usize,
    visible: bool,
}

impl NoteView for HeadlessView {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset;
    }

    fn set_action(&mut self, _action: Action) {}

    fn set_status(&mut self, _status: Option<Status>) {}

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

fn owner_session(vault_root: &Path) -> Session<HeadlessView> {
    let config = AppConfig {
        obsidian_path: vault_root.to_path_buf(),
        journal_folder: "Journal".to_string(),
        journal_template: "template.md".to_string(),
        scratchpad_name: "Scratchpad.md".to_string(),
        distraction_list_name: "Distractions.md".to_string(),
        cursor_db: vault_root.join("cursors.db"),
        shortcuts: Default::default(),
    };
    let vault = Vault::new(&config)
        .with_date_source(|| NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    Session::new(
        vault,
        CursorStore::open_in_memory().unwrap(),
        HeadlessView::default(),
    )
}

/// Answer one call the way the owner's event loop does
fn serve_one(session: &mut Session<HeadlessView>, calls: &Receiver<IncomingCall>) {
    let call = calls
        .recv_timeout(Duration::from_secs(5))
        .expect("no remote call arrived");
    session.serve_call(call);
}

#[test]
fn follower_switches_owner_to_requested_action() {
    let runtime = TempDir::new().unwrap();
    let vault = TempDir::new().unwrap();
    std::fs::write(vault.path().join("Scratchpad.md"), "pad contents").unwrap();

    let identity = InstanceIdentity::new("helper-test", runtime.path());
    let _guard = match identity.acquire().unwrap() {
        Role::Owner(guard) => guard,
        Role::Follower => panic!("fresh runtime dir should make us the owner"),
    };

    let (calls_tx, calls_rx) = unbounded();
    let _endpoint = RemoteEndpoint::bind(identity.endpoint(), calls_tx).unwrap();
    let mut session = owner_session(vault.path());
    assert_eq!(session.state(), SessionState::Idle);

    // Second launch
    assert!(!identity.acquire().unwrap().is_owner());
    let target = identity.endpoint();
    let follower = std::thread::spawn(move || ipc::invoke(&target, "scratchpad"));

    serve_one(&mut session, &calls_rx);

    follower.join().unwrap().unwrap();
    assert_eq!(session.state(), SessionState::Editing(Action::Scratchpad));
    assert_eq!(session.view().text, "pad contents");
    assert_eq!(session.view().cursor, 12);
    assert!(session.view().visible);
}

#[test]
fn follower_gets_typed_error_for_unknown_action() {
    let runtime = TempDir::new().unwrap();
    let vault = TempDir::new().unwrap();
    let identity = InstanceIdentity::new("helper-test", runtime.path());

    let (calls_tx, calls_rx) = unbounded();
    let _endpoint = RemoteEndpoint::bind(identity.endpoint(), calls_tx).unwrap();
    let mut session = owner_session(vault.path());

    let target = identity.endpoint();
    let follower = std::thread::spawn(move || ipc::invoke(&target, "calendar"));
    serve_one(&mut session, &calls_rx);

    let err = follower.join().unwrap().unwrap_err();
    assert!(matches!(err, HelperError::InvalidRemoteAction(name) if name == "calendar"));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!session.view().visible);
}

#[test]
fn owner_serves_consecutive_followers() {
    let runtime = TempDir::new().unwrap();
    let vault = TempDir::new().unwrap();
    let identity = InstanceIdentity::new("helper-test", runtime.path());

    let (calls_tx, calls_rx) = unbounded();
    let _endpoint = RemoteEndpoint::bind(identity.endpoint(), calls_tx).unwrap();
    let mut session = owner_session(vault.path());

    for (name, expected) in [
        ("journal", Action::Journal),
        ("distraction-list", Action::DistractionList),
    ] {
        let target = identity.endpoint();
        let follower = std::thread::spawn(move || ipc::invoke(&target, name));
        serve_one(&mut session, &calls_rx);
        follower.join().unwrap().unwrap();
        assert_eq!(session.state(), SessionState::Editing(expected));
    }
}

#[test]
fn follower_reports_unreachable_owner() {
    let runtime = TempDir::new().unwrap();
    let identity = InstanceIdentity::new("nobody-home", runtime.path());

    let err = ipc::invoke(&identity.endpoint(), "journal").unwrap_err();
    assert!(matches!(err, HelperError::RemoteUnreachable(_)));
}

#[test]
fn call_fails_when_event_loop_is_gone() {
    let runtime = TempDir::new().unwrap();
    let identity = InstanceIdentity::new("helper-test", runtime.path());

    let (calls_tx, calls_rx) = unbounded::<IncomingCall>();
    let _endpoint = RemoteEndpoint::bind(identity.endpoint(), calls_tx).unwrap();
    drop(calls_rx);

    let err = ipc::invoke(&identity.endpoint(), "journal").unwrap_err();
    assert!(matches!(err, HelperError::RemoteFailed(_)));
}

#[test]
fn stale_socket_file_is_replaced() {
    let runtime = TempDir::new().unwrap();
    let identity = InstanceIdentity::new("helper-test", runtime.path());
    let endpoint = identity.endpoint();
    std::fs::write(endpoint.path(), b"left over from a crash").unwrap();

    let (calls_tx, calls_rx) = unbounded();
    let _endpoint = RemoteEndpoint::bind(endpoint.clone(), calls_tx).unwrap();
    let vault = TempDir::new().unwrap();
    let mut session = owner_session(vault.path());

    let follower = std::thread::spawn(move || ipc::invoke(&endpoint, "journal"));
    serve_one(&mut session, &calls_rx);
    follower.join().unwrap().unwrap();
}

#[test]
fn call_abandoned_by_follower_is_not_run() {
    let runtime = TempDir::new().unwrap();
    let vault = TempDir::new().unwrap();
    std::fs::write(vault.path().join("Scratchpad.md"), "pad contents").unwrap();
    let identity = InstanceIdentity::new("helper-test", runtime.path());

    let (calls_tx, calls_rx) = unbounded();
    let _endpoint = RemoteEndpoint::bind(identity.endpoint(), calls_tx).unwrap();
    let mut session = owner_session(vault.path());

    let target = identity.endpoint();
    let follower = std::thread::spawn(move || ipc::invoke(&target, "scratchpad"));

    // Event loop busy past the listener's reply deadline
    let err = follower.join().unwrap().unwrap_err();
    assert!(matches!(err, HelperError::RemoteFailed(_)));

    let call = calls_rx
        .recv_timeout(Duration::from_secs(1))
        .expect("call should still be queued");
    session.serve_call(call);

    assert_eq!(session.state(), SessionState::Idle);
    assert!(!session.view().visible);
}
