use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crate::io::workspace_io::{WorkspaceError, read_config};
use crate::model::{Member, ScopeKey, WorkspaceConfig};
use crate::ops::member_store::MemberStore;
use crate::picker::DeferredLoader;

/// Error type for member fetches
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unknown workspace '{0}'")]
    UnknownWorkspace(String),
    #[error("unknown project '{0}'")]
    UnknownProject(String),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// The member directory service behind the pickers.
pub trait MemberSource: Send + Sync {
    fn fetch_project_members(&self, workspace: &str, project: &str) -> Result<Vec<Member>, FetchError>;
}

/// Serves project members by re-reading workspace.toml on every request.
#[derive(Debug, Clone)]
pub struct FileMemberSource {
    config_path: PathBuf,
    latency: Duration,
}

impl FileMemberSource {
    pub fn new(config_path: PathBuf) -> Self {
        FileMemberSource {
            config_path,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl MemberSource for FileMemberSource {
    fn fetch_project_members(&self, workspace: &str, project: &str) -> Result<Vec<Member>, FetchError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        let config = read_config(&self.config_path)?;
        project_members(&config, workspace, project)
    }
}

/// Resolve a project's members against a parsed config, in project order.
pub fn project_members(config: &WorkspaceConfig, workspace: &str, project: &str) -> Result<Vec<Member>, FetchError> {
    if config.workspace.slug != workspace {
        return Err(FetchError::UnknownWorkspace(workspace.to_string()));
    }
    let project = config
        .project(project)
        .ok_or_else(|| FetchError::UnknownProject(project.to_string()))?;
    // Ids without a directory entry still come back, bare
    Ok(project
        .members
        .iter()
        .map(|id| config.member(id).cloned().unwrap_or_else(|| Member::new(id)))
        .collect())
}

/// A finished fetch, tagged with the store generation it was issued under.
#[derive(Debug)]
pub struct FetchOutcome {
    pub scope: ScopeKey,
    pub generation: u64,
    pub result: Result<Vec<Member>, FetchError>,
}

/// Runs member fetches on worker threads and hands results back to the UI
/// thread through a channel.
pub struct Fetcher {
    source: Arc<dyn MemberSource>,
    tx: mpsc::Sender<FetchOutcome>,
    rx: mpsc::Receiver<FetchOutcome>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn MemberSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Fetcher { source, tx, rx }
    }

    /// Start fetching `scope` in the background.
    pub fn spawn(&self, scope: ScopeKey, generation: u64) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tracing::info!(scope = %scope, generation, "fetching project members");
        std::thread::spawn(move || {
            let result = source.fetch_project_members(&scope.workspace, &scope.project);
            // The receiver is gone once the UI has shut down
            let _ = tx.send(FetchOutcome {
                scope,
                generation,
                result,
            });
        });
    }

    /// Run a fetch on the calling thread.
    pub fn fetch_now(&self, scope: ScopeKey, generation: u64) -> FetchOutcome {
        let result = self.source.fetch_project_members(&scope.workspace, &scope.project);
        FetchOutcome {
            scope,
            generation,
            result,
        }
    }

    /// Non-blocking drain of finished fetches.
    pub fn poll(&self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Block until one fetch finishes or `timeout` passes.
    pub fn wait(&self, timeout: Duration) -> Option<FetchOutcome> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Pairs the store with a fetcher so a picker can trigger deferred loads.
pub struct StoreLoader<'a> {
    pub store: &'a mut MemberStore,
    pub fetcher: &'a Fetcher,
}

impl DeferredLoader<ScopeKey> for StoreLoader<'_> {
    fn is_loaded(&self, key: &ScopeKey) -> bool {
        self.store.is_loaded(key)
    }

    fn request(&mut self, key: &ScopeKey) -> bool {
        match self.store.begin_fetch(key) {
            Some(generation) => {
                self.fetcher.spawn(key.clone(), generation);
                true
            }
            None => false,
        }
    }
}
