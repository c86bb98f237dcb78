use git2::build::RepoBuilder;
use git2::{FetchOptions, PushOptions, RemoteCallbacks, Repository, ResetType, Signature};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{Result, StampError};
use crate::scm::{repository_path, SourceControl};

const REMOTE_NAME: &str = "origin";

/// A temporary clone standing in for a server workspace.
struct GitWorkspace {
    root: PathBuf,
    repo: Repository,
    branch: String,
    mappings: BTreeMap<String, PathBuf>,
    pending: BTreeSet<String>,
}

/// Source control backed by a git remote.
///
/// The workspace is a clone of the remote under the temp directory. Server
/// paths are repository paths with a `$/` prefix. Check-in commits the
/// pending files and pushes the current branch.
pub struct GitSourceControl {
    remote_url: String,
    temp_dir: PathBuf,
    author_name: String,
    author_email: String,
    workspace: Mutex<Option<GitWorkspace>>,
}

impl GitSourceControl {
    pub fn new(remote_url: impl Into<String>, temp_dir: impl Into<PathBuf>) -> Self {
        GitSourceControl {
            remote_url: remote_url.into(),
            temp_dir: temp_dir.into(),
            author_name: "Build Server".to_string(),
            author_email: "build@localhost".to_string(),
            workspace: Mutex::new(None),
        }
    }

    /// Identity recorded on changesets
    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_name = name.into();
        self.author_email = email.into();
        self
    }

    fn lock(&self) -> MutexGuard<'_, Option<GitWorkspace>> {
        self.workspace
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_workspace<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut GitWorkspace) -> Result<T>,
    {
        let mut guard = self.lock();
        let workspace = guard.as_mut().ok_or_else(|| {
            StampError::source_control("No workspace exists; create one first")
        })?;
        f(workspace)
    }

    fn signature(&self) -> Result<Signature<'static>> {
        Ok(Signature::now(&self.author_name, &self.author_email)?)
    }
}

/// Credentials for fetch and push: SSH keys from `~/.ssh`, then the agent,
/// then the default credential helper.
fn remote_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });
    callbacks
}

fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut options = FetchOptions::new();
    options.remote_callbacks(remote_callbacks());
    options
}

impl GitWorkspace {
    /// Moves the working tree to the tip of the remote branch.
    fn update_to_latest(&self) -> Result<()> {
        let mut remote = self.repo.find_remote(REMOTE_NAME)?;
        let refspec = format!(
            "+refs/heads/{branch}:refs/remotes/{remote}/{branch}",
            branch = self.branch,
            remote = REMOTE_NAME
        );
        remote
            .fetch(&[refspec.as_str()], Some(&mut fetch_options()), None)
            .map_err(|e| StampError::source_control(format!("Fetch failed: {}", e)))?;

        let tracking = format!("refs/remotes/{}/{}", REMOTE_NAME, self.branch);
        let target = self.repo.find_reference(&tracking)?.peel_to_commit()?;
        self.repo
            .reset(target.as_object(), ResetType::Hard, None)?;
        Ok(())
    }

    fn mapped_local(&self, server_path: &str) -> Result<PathBuf> {
        self.mappings.get(server_path).cloned().ok_or_else(|| {
            StampError::source_control(format!("'{}' is not mapped in the workspace", server_path))
        })
    }

    fn push(&self) -> Result<()> {
        let mut remote = self.repo.find_remote(REMOTE_NAME)?;
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", self.branch);

        let mut callbacks = remote_callbacks();
        callbacks.push_update_reference(|reference, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "Server rejected {}: {}",
                reference, message
            ))),
            None => Ok(()),
        });
        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        remote
            .push(&[refspec.as_str()], Some(&mut options))
            .map_err(|e| StampError::source_control(format!("Push failed: {}", e)))
    }
}

impl SourceControl for GitSourceControl {
    fn create_workspace(&self, name: &str) -> Result<()> {
        let root = self.temp_dir.join(name);
        if root.exists() {
            fs::remove_dir_all(&root)?;
        }

        let repo = RepoBuilder::new()
            .fetch_options(fetch_options())
            .clone(&self.remote_url, &root)
            .map_err(|e| {
                StampError::source_control(format!("Cannot clone '{}': {}", self.remote_url, e))
            })?;

        let branch = repo
            .head()?
            .shorthand()
            .map(str::to_string)
            .ok_or_else(|| StampError::source_control("Remote HEAD is not a named branch"))?;

        debug!(root = %root.display(), %branch, "cloned workspace");
        *self.lock() = Some(GitWorkspace {
            root,
            repo,
            branch,
            mappings: BTreeMap::new(),
            pending: BTreeSet::new(),
        });
        Ok(())
    }

    fn delete_workspace(&self) -> Result<()> {
        let Some(workspace) = self.lock().take() else {
            return Ok(());
        };
        let root = workspace.root.clone();
        drop(workspace);

        if root.exists() {
            fs::remove_dir_all(&root)?;
        }
        Ok(())
    }

    fn map_folder(&self, server_path: &str, local_path: &Path) -> Result<()> {
        self.with_workspace(|workspace| {
            workspace
                .mappings
                .insert(server_path.to_string(), local_path.to_path_buf());
            Ok(())
        })
    }

    fn unmap_folder(&self, server_path: &str) -> Result<()> {
        self.with_workspace(|workspace| {
            workspace.mappings.remove(server_path);
            workspace.pending.remove(server_path);
            Ok(())
        })
    }

    fn get_and_checkout(&self, server_path: &str) -> Result<()> {
        self.with_workspace(|workspace| {
            let local = workspace.mapped_local(server_path)?;
            workspace.update_to_latest()?;

            let source = workspace.root.join(repository_path(server_path));
            if !source.is_file() {
                return Err(StampError::source_control(format!(
                    "'{}' does not exist on the server",
                    server_path
                )));
            }

            fs::copy(&source, &local)?;
            workspace.pending.insert(server_path.to_string());
            debug!(server_path, local = %local.display(), "checked out");
            Ok(())
        })
    }

    fn check_in(&self, comment: &str) -> Result<Option<String>> {
        let signature = self.signature()?;

        self.with_workspace(|workspace| {
            if workspace.pending.is_empty() {
                return Ok(None);
            }

            let mut index = workspace.repo.index()?;
            for server_path in &workspace.pending {
                let local = workspace.mapped_local(server_path)?;
                let relative = repository_path(server_path);
                fs::copy(&local, workspace.root.join(relative))?;
                index.add_path(Path::new(relative))?;
            }
            index.write()?;
            workspace.pending.clear();

            let tree_id = index.write_tree()?;
            let parent = workspace.repo.head()?.peel_to_commit()?;
            if parent.tree_id() == tree_id {
                info!("no changes to check in");
                return Ok(None);
            }

            let tree = workspace.repo.find_tree(tree_id)?;
            let oid = workspace.repo.commit(
                Some("HEAD"),
                &signature,
                &signature,
                comment,
                &tree,
                &[&parent],
            )?;
            workspace.push()?;

            info!(changeset = %oid, "checked in");
            Ok(Some(oid.to_string()))
        })
    }
}
