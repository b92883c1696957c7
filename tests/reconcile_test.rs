use headwatch::watcher::{
    DirectorySubscriber, FsEvent, WatchAction, WatchCoordinator, WatchError,
};
use headwatch::{HeaderEngine, Session, Settings, WatchEntry};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Records subscriptions without touching the filesystem.
#[derive(Default)]
struct FakeSubscriber {
    subscribed: Mutex<Vec<PathBuf>>,
}

impl DirectorySubscriber for FakeSubscriber {
    fn subscribe(&self, dir: &Path) -> Result<bool, WatchError> {
        let mut subscribed = self.subscribed.lock();
        if subscribed.iter().any(|d| d == dir) {
            return Ok(false);
        }
        subscribed.push(dir.to_path_buf());
        Ok(true)
    }

    fn unsubscribe_all(&self) {
        self.subscribed.lock().clear();
    }
}

fn coordinator_in(root: &Path) -> (Arc<FakeSubscriber>, WatchCoordinator) {
    let engine = Arc::new(
        HeaderEngine::builder(root)
            .rewrite_window(Duration::ZERO)
            .build(),
    );
    let subscriber = Arc::new(FakeSubscriber::default());
    let coordinator = WatchCoordinator::new(engine, subscriber.clone(), Duration::ZERO);
    (subscriber, coordinator)
}

#[test]
fn test_watchlist_append_subscribes_and_headers_new_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    fs::write(root.join("watchlist"), "top.md\n").unwrap();
    fs::write(root.join("top.md"), "# Title\n").unwrap();

    let (subscriber, coordinator) = coordinator_in(&root);
    coordinator.initialize();
    assert_eq!(*subscriber.subscribed.lock(), vec![root.clone()]);

    fs::create_dir_all(root.join("lib/util")).unwrap();
    fs::write(root.join("lib/util/helpers.js"), "export {};\n").unwrap();
    fs::write(root.join("watchlist"), "top.md\nlib/util/helpers.js\n").unwrap();

    let action = coordinator.handle_event(FsEvent::modified(root.join("watchlist")));
    assert_eq!(action, WatchAction::Reconcile);

    let subscribed = subscriber.subscribed.lock().clone();
    assert!(subscribed.contains(&root.join("lib")));
    assert!(subscribed.contains(&root.join("lib/util")));

    let content = fs::read_to_string(root.join("lib/util/helpers.js")).unwrap();
    assert_eq!(
        content,
        "// === WATCHER HEADER START ===\n\
         // File: lib/util/helpers.js\n\
         // Managed by file watcher\n\
         // === WATCHER HEADER END ===\n\
         \n\
         export {};\n"
    );
    assert_eq!(
        coordinator.tracked_entries(),
        vec![
            WatchEntry::from("top.md"),
            WatchEntry::from("lib/util/helpers.js")
        ]
    );
}

#[test]
fn test_entry_created_after_listing_is_headered_on_first_change() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    fs::write(root.join("watchlist"), "later/notes.txt\n").unwrap();

    let (subscriber, coordinator) = coordinator_in(&root);
    coordinator.initialize();
    assert!(subscriber.subscribed.lock().contains(&root.join("later")));

    fs::create_dir(root.join("later")).unwrap();
    fs::write(root.join("later/notes.txt"), "remember\n").unwrap();

    let action = coordinator.handle_event(FsEvent::created(root.join("later/notes.txt")));
    assert_eq!(
        action,
        WatchAction::UpdateHeader {
            entry: WatchEntry::from("later/notes.txt")
        }
    );
    let content = fs::read_to_string(root.join("later/notes.txt")).unwrap();
    assert!(content.starts_with("# === WATCHER HEADER START ===\n# File: later/notes.txt\n"));
    assert!(content.ends_with("\nremember\n"));
}

#[test]
fn test_removed_entry_keeps_header_and_subscription() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    fs::create_dir(root.join("docs")).unwrap();
    fs::write(root.join("docs/guide.md"), "Guide\n").unwrap();
    fs::write(root.join("watchlist"), "docs/guide.md\n").unwrap();

    let (_subscriber, coordinator) = coordinator_in(&root);
    coordinator.initialize();
    let headered = fs::read_to_string(root.join("docs/guide.md")).unwrap();

    fs::write(root.join("watchlist"), "# nothing tracked\n").unwrap();
    let report = coordinator.reconcile();

    assert!(report.added.is_empty());
    assert!(coordinator.watched_directories().contains("docs"));
    assert_eq!(
        fs::read_to_string(root.join("docs/guide.md")).unwrap(),
        headered
    );

    // No longer tracked, so further edits are left alone
    fs::write(root.join("docs/guide.md"), "Rewritten\n").unwrap();
    coordinator.handle_event(FsEvent::modified(root.join("docs/guide.md")));
    assert_eq!(
        fs::read_to_string(root.join("docs/guide.md")).unwrap(),
        "Rewritten\n"
    );
}

#[test]
fn test_live_session_picks_up_watchlist_addition() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    fs::write(root.join("watchlist"), "").unwrap();

    let settings = Settings {
        root: Some(root.clone()),
        ..Settings::default()
    };
    let session = Session::new(settings).unwrap();
    let running = session.start().unwrap();

    fs::create_dir(root.join("pkg")).unwrap();
    fs::write(root.join("pkg/mod.py"), "value = 1\n").unwrap();
    fs::write(root.join("watchlist"), "pkg/mod.py\n").unwrap();

    let expected = "# === WATCHER HEADER START ===\n# File: pkg/mod.py\n";
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut content = String::new();
    while Instant::now() < deadline {
        content = fs::read_to_string(root.join("pkg/mod.py")).unwrap();
        if content.starts_with(expected) {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    assert!(content.starts_with(expected), "header not written:\n{content}");
    assert!(content.ends_with("\nvalue = 1\n"));
    assert!(
        running
            .coordinator()
            .watched_directories()
            .contains("pkg")
    );

    running.stop();
}
