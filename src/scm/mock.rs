use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{Result, StampError};
use crate::scm::SourceControl;
use crate::text::read_text;

/// One recorded call against [MockSourceControl]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScmCall {
    CreateWorkspace(String),
    DeleteWorkspace,
    Map(String, PathBuf),
    Unmap(String),
    GetAndCheckout(String),
    CheckIn(String),
}

/// A changeset accepted by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockChangeset {
    pub id: String,
    pub comment: String,
    /// Server path to submitted content
    pub files: BTreeMap<String, String>,
}

#[derive(Default)]
struct MockState {
    calls: Vec<ScmCall>,
    mappings: BTreeMap<String, PathBuf>,
    pending: BTreeSet<String>,
    changesets: Vec<MockChangeset>,
    failing_checkouts: HashSet<String>,
    workspace_open: bool,
}

/// Mock source control for testing without a server
///
/// Records every call. Check-in reads the mapped local files, so tests can
/// assert on exactly what would have been submitted.
#[derive(Default)]
pub struct MockSourceControl {
    state: Mutex<MockState>,
}

impl MockSourceControl {
    /// Create a new mock with no workspace
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `get_and_checkout` fail for `server_path`
    pub fn fail_checkout(&self, server_path: impl Into<String>) {
        self.state().failing_checkouts.insert(server_path.into());
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<ScmCall> {
        self.state().calls.clone()
    }

    /// Changesets submitted so far
    pub fn changesets(&self) -> Vec<MockChangeset> {
        self.state().changesets.clone()
    }

    /// True while a workspace exists
    pub fn workspace_open(&self) -> bool {
        self.state().workspace_open
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SourceControl for MockSourceControl {
    fn create_workspace(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(ScmCall::CreateWorkspace(name.to_string()));
        state.workspace_open = true;
        Ok(())
    }

    fn delete_workspace(&self) -> Result<()> {
        let mut state = self.state();
        state.calls.push(ScmCall::DeleteWorkspace);
        state.workspace_open = false;
        state.mappings.clear();
        state.pending.clear();
        Ok(())
    }

    fn map_folder(&self, server_path: &str, local_path: &Path) -> Result<()> {
        let mut state = self.state();
        state
            .calls
            .push(ScmCall::Map(server_path.to_string(), local_path.to_path_buf()));
        state
            .mappings
            .insert(server_path.to_string(), local_path.to_path_buf());
        Ok(())
    }

    fn unmap_folder(&self, server_path: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(ScmCall::Unmap(server_path.to_string()));
        state.mappings.remove(server_path);
        Ok(())
    }

    fn get_and_checkout(&self, server_path: &str) -> Result<()> {
        let mut state = self.state();
        state
            .calls
            .push(ScmCall::GetAndCheckout(server_path.to_string()));

        if state.failing_checkouts.contains(server_path) {
            return Err(StampError::source_control(format!(
                "Checkout of '{}' rejected",
                server_path
            )));
        }

        let local = state.mappings.get(server_path).cloned().ok_or_else(|| {
            StampError::source_control(format!("'{}' is not mapped", server_path))
        })?;
        // Stands in for the server copy written by get-latest.
        fs::write(&local, "")?;
        state.pending.insert(server_path.to_string());
        Ok(())
    }

    fn check_in(&self, comment: &str) -> Result<Option<String>> {
        let mut state = self.state();
        state.calls.push(ScmCall::CheckIn(comment.to_string()));

        if state.pending.is_empty() {
            return Ok(None);
        }

        let mut files = BTreeMap::new();
        for server_path in std::mem::take(&mut state.pending) {
            let Some(local) = state.mappings.get(&server_path) else {
                continue;
            };
            if let Some(text) = read_text(local)? {
                files.insert(server_path, text.content);
            }
        }

        let id = (state.changesets.len() + 1).to_string();
        state.changesets.push(MockChangeset {
            id: id.clone(),
            comment: comment.to_string(),
            files,
        });
        Ok(Some(id))
    }
}
