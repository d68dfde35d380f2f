//! In-memory Git host for tests
//!
//! Behaves like the GitHub Git Data API closely enough to exercise the
//! remote storage backend, including fast-forward checks on reference
//! updates, and can be told to fail at any publish step.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

use super::{GitHost, RemoteContent, TreeChange};
use crate::error::{GitHostError, PublishStep};

#[derive(Debug, Clone)]
struct CommitObject {
    tree: String,
    parent: Option<String>,
    message: String,
}

#[derive(Default)]
struct RepoState {
    refs: HashMap<String, String>,
    commits: HashMap<String, CommitObject>,
    trees: HashMap<String, BTreeMap<String, String>>,
    blobs: HashMap<String, Vec<u8>>,
    next_id: u64,
    fail_at: Option<PublishStep>,
    content_reads: usize,
}

impl RepoState {
    fn next_sha(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{}{:08x}", kind, self.next_id)
    }

    fn check(&self, step: PublishStep) -> Result<(), GitHostError> {
        if self.fail_at == Some(step) {
            return Err(GitHostError::Rejected(format!("injected failure at {}", step)));
        }
        Ok(())
    }

    fn head_tree(&self, branch: &str) -> Option<&BTreeMap<String, String>> {
        let head = self.refs.get(branch)?;
        let commit = self.commits.get(head)?;
        self.trees.get(&commit.tree)
    }

    fn insert_commit(
        &mut self,
        files: BTreeMap<String, String>,
        parent: Option<String>,
        message: &str,
    ) -> String {
        let tree = self.next_sha("tree");
        self.trees.insert(tree.clone(), files);
        let commit = self.next_sha("commit");
        self.commits.insert(
            commit.clone(),
            CommitObject {
                tree,
                parent,
                message: message.to_string(),
            },
        );
        commit
    }
}

/// Git host keeping every object in memory
pub struct InMemoryGitHost {
    state: Mutex<RepoState>,
}

impl InMemoryGitHost {
    /// Create a repository whose `branch` points at an empty root commit
    pub fn new(branch: &str) -> Self {
        let mut state = RepoState::default();
        let root = state.insert_commit(BTreeMap::new(), None, "Initial commit");
        state.refs.insert(branch.to_string(), root);
        Self {
            state: Mutex::new(state),
        }
    }

    /// Commit `files` on top of `branch` without going through the API
    pub async fn seed(&self, branch: &str, files: &[(&str, &[u8])]) {
        let mut state = self.state.lock().await;
        let mut tree = state.head_tree(branch).cloned().unwrap_or_default();
        for (path, content) in files {
            let blob = state.next_sha("blob");
            state.blobs.insert(blob.clone(), content.to_vec());
            tree.insert(path.to_string(), blob);
        }
        let parent = state.refs.get(branch).cloned();
        let commit = state.insert_commit(tree, parent, "Seed content");
        state.refs.insert(branch.to_string(), commit);
    }

    /// Make the given publish step fail until reset with `None`
    pub async fn fail_at(&self, step: Option<PublishStep>) {
        self.state.lock().await.fail_at = step;
    }

    /// Number of content downloads served by `get_content`
    pub async fn content_reads(&self) -> usize {
        self.state.lock().await.content_reads
    }

    /// Commit SHA the branch points to
    pub async fn head(&self, branch: &str) -> Option<String> {
        self.state.lock().await.refs.get(branch).cloned()
    }

    /// Number of commits reachable from the branch head
    pub async fn commit_count(&self, branch: &str) -> usize {
        let state = self.state.lock().await;
        let mut count = 0;
        let mut cursor = state.refs.get(branch).cloned();
        while let Some(sha) = cursor {
            count += 1;
            cursor = state.commits.get(&sha).and_then(|c| c.parent.clone());
        }
        count
    }

    /// Message of the commit the branch points to
    pub async fn head_message(&self, branch: &str) -> Option<String> {
        let state = self.state.lock().await;
        let head = state.refs.get(branch)?;
        state.commits.get(head).map(|c| c.message.clone())
    }

    /// Content of a file at the branch head
    pub async fn file(&self, branch: &str, path: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().await;
        let blob = state.head_tree(branch)?.get(path)?;
        state.blobs.get(blob).cloned()
    }

    /// Every file at the branch head
    pub async fn files(&self, branch: &str) -> BTreeMap<String, Vec<u8>> {
        let state = self.state.lock().await;
        let Some(tree) = state.head_tree(branch) else {
            return BTreeMap::new();
        };
        tree.iter()
            .filter_map(|(path, blob)| Some((path.clone(), state.blobs.get(blob)?.clone())))
            .collect()
    }
}

#[async_trait]
impl GitHost for InMemoryGitHost {
    async fn get_ref(&self, branch: &str) -> Result<String, GitHostError> {
        let state = self.state.lock().await;
        state.check(PublishStep::ReadHead)?;
        state
            .refs
            .get(branch)
            .cloned()
            .ok_or_else(|| GitHostError::Rejected(format!("no branch {}", branch)))
    }

    async fn get_commit_tree(&self, commit_sha: &str) -> Result<String, GitHostError> {
        let state = self.state.lock().await;
        state.check(PublishStep::ReadCommit)?;
        state
            .commits
            .get(commit_sha)
            .map(|c| c.tree.clone())
            .ok_or_else(|| GitHostError::Rejected(format!("no commit {}", commit_sha)))
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String, GitHostError> {
        let mut state = self.state.lock().await;
        state.check(PublishStep::CreateBlob)?;
        let sha = state.next_sha("blob");
        state.blobs.insert(sha.clone(), content.to_vec());
        Ok(sha)
    }

    async fn create_tree(
        &self,
        base_tree: &str,
        changes: &[TreeChange],
    ) -> Result<String, GitHostError> {
        let mut state = self.state.lock().await;
        state.check(PublishStep::CreateTree)?;
        let mut tree = state
            .trees
            .get(base_tree)
            .cloned()
            .ok_or_else(|| GitHostError::Rejected(format!("no tree {}", base_tree)))?;

        for change in changes {
            match &change.blob {
                Some(blob) => {
                    tree.insert(change.path.clone(), blob.clone());
                }
                None => {
                    if tree.remove(&change.path).is_none() {
                        return Err(GitHostError::Rejected(format!(
                            "cannot remove missing path {}",
                            change.path
                        )));
                    }
                }
            }
        }

        let sha = state.next_sha("tree");
        state.trees.insert(sha.clone(), tree);
        Ok(sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String, GitHostError> {
        let mut state = self.state.lock().await;
        state.check(PublishStep::CreateCommit)?;
        if !state.trees.contains_key(tree_sha) {
            return Err(GitHostError::Rejected(format!("no tree {}", tree_sha)));
        }
        let sha = state.next_sha("commit");
        state.commits.insert(
            sha.clone(),
            CommitObject {
                tree: tree_sha.to_string(),
                parent: Some(parent_sha.to_string()),
                message: message.to_string(),
            },
        );
        Ok(sha)
    }

    async fn update_ref(&self, branch: &str, commit_sha: &str) -> Result<(), GitHostError> {
        let mut state = self.state.lock().await;
        state.check(PublishStep::UpdateRef)?;
        let parent = state
            .commits
            .get(commit_sha)
            .and_then(|c| c.parent.clone())
            .ok_or_else(|| GitHostError::Rejected(format!("no commit {}", commit_sha)))?;

        if state.refs.get(branch) != Some(&parent) {
            return Err(GitHostError::Rejected(
                "Update is not a fast forward".to_string(),
            ));
        }

        state.refs.insert(branch.to_string(), commit_sha.to_string());
        Ok(())
    }

    async fn get_content(
        &self,
        path: &str,
        branch: &str,
    ) -> Result<Option<RemoteContent>, GitHostError> {
        let mut state = self.state.lock().await;
        state.content_reads += 1;
        let Some(tree) = state.head_tree(branch) else {
            return Ok(None);
        };

        if let Some(blob) = tree.get(path) {
            return Ok(state.blobs.get(blob).cloned().map(RemoteContent::File));
        }

        let prefix = format!("{}/", path);
        let names: Vec<String> = tree
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect();
        let is_dir = tree.keys().any(|key| key.starts_with(&prefix));

        Ok(is_dir.then_some(RemoteContent::Directory(names)))
    }

    async fn file_exists(&self, path: &str, branch: &str) -> Result<bool, GitHostError> {
        let state = self.state.lock().await;
        Ok(state
            .head_tree(branch)
            .is_some_and(|tree| tree.contains_key(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_ref_rejects_non_fast_forward() {
        let host = InMemoryGitHost::new("main");
        let head = host.head("main").await.unwrap();
        let tree = host.get_commit_tree(&head).await.unwrap();

        let first = host.create_commit("first", &tree, &head).await.unwrap();
        let second = host.create_commit("second", &tree, &head).await.unwrap();

        host.update_ref("main", &first).await.unwrap();
        let result = host.update_ref("main", &second).await;
        assert!(matches!(result, Err(GitHostError::Rejected(_))));
        assert_eq!(host.head("main").await, Some(first));
    }

    #[tokio::test]
    async fn test_get_content_lists_direct_children_only() {
        let host = InMemoryGitHost::new("main");
        host.seed(
            "main",
            &[
                ("content/a.md", b"a".as_slice()),
                ("content/nested/b.md", b"b".as_slice()),
            ],
        )
        .await;

        assert_eq!(
            host.get_content("content", "main").await.unwrap(),
            Some(RemoteContent::Directory(vec!["a.md".to_string()]))
        );
        assert_eq!(
            host.get_content("content/a.md", "main").await.unwrap(),
            Some(RemoteContent::File(b"a".to_vec()))
        );
        assert_eq!(host.get_content("missing", "main").await.unwrap(), None);
    }
}
