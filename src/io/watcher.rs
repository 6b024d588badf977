use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::workspace_io::CONFIG_FILE;

/// Events sent from the file watcher to the TUI event loop.
#[derive(Debug)]
pub enum FileEvent {
    /// workspace.toml was created, modified or removed.
    ConfigChanged(PathBuf),
}

/// Watches the `roster/` directory for edits to workspace.toml made outside
/// this process.
pub struct WorkspaceWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

/// Only the config file matters; the lock, log and temp files are ignored.
fn is_config_event(event: &Event) -> Option<PathBuf> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        _ => return None,
    }
    event
        .paths
        .iter()
        .find(|p| p.file_name().and_then(|n| n.to_str()) == Some(CONFIG_FILE))
        .cloned()
}

impl WorkspaceWatcher {
    pub fn start(roster_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };
                if let Some(path) = is_config_event(&event) {
                    let _ = tx.send(FileEvent::ConfigChanged(path));
                }
            },
            Config::default(),
        )?;

        watcher.watch(roster_dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(dir = %roster_dir.display(), "watching workspace");
        Ok(WorkspaceWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking drain of queued events.
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}
