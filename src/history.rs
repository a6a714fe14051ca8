// src/history.rs

use crate::error::{MinerError, Result};
use crate::model::{CommitInfo, FileChange, FileHistory, ModifiedFile};
use git2::{Commit, Delta, Diff, DiffDelta, DiffFindOptions, DiffOptions, Oid, Patch, Repository, Sort};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

/// Repository traversal consumed by the metrics engine
pub trait CommitSource {
    /// Every commit reachable from HEAD, oldest first
    fn commits(&self) -> Result<Vec<CommitInfo>>;

    /// The modified-file entries of one commit, with post-change text and diff
    fn modified_files(&self, hash: &str) -> Result<Vec<ModifiedFile>>;
}

/// A git repository opened through libgit2. Owned by a single worker.
pub struct GitRepository {
    repo: Repository,
    name: String,
}

impl GitRepository {
    pub fn open(name: &str, path: &Path) -> Result<Self> {
        let repo = Repository::open(path).map_err(|source| MinerError::RepositoryAccess {
            repository: name.to_string(),
            source,
        })?;
        Ok(Self { repo, name: name.to_string() })
    }

    pub fn clone_from(name: &str, url: &str, path: &Path) -> Result<Self> {
        let repo = Repository::clone(url, path).map_err(|source| MinerError::RepositoryAccess {
            repository: name.to_string(),
            source,
        })?;
        Ok(Self { repo, name: name.to_string() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn access_error(&self, source: git2::Error) -> MinerError {
        MinerError::RepositoryAccess {
            repository: self.name.clone(),
            source,
        }
    }

    /// Diff of a commit against its only parent, or the empty tree for a root commit.
    /// Merge commits have no modified files.
    fn diff_to_parent(&self, commit: &Commit<'_>) -> std::result::Result<Option<Diff<'_>>, git2::Error> {
        if commit.parent_count() > 1 {
            return Ok(None);
        }

        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };
        let current_tree = commit.tree()?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.include_untracked(false);
        diff_opts.ignore_filemode(true);

        let mut diff = self.repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&current_tree), Some(&mut diff_opts))?;

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;

        Ok(Some(diff))
    }

    fn commit_info(&self, commit: &Commit<'_>) -> std::result::Result<CommitInfo, git2::Error> {
        let files = match self.diff_to_parent(commit)? {
            Some(diff) => file_changes(&diff)?,
            None => Vec::new(),
        };

        Ok(CommitInfo {
            hash: commit.id().to_string(),
            author: commit.author().name().unwrap_or("Unknown").to_string(),
            timestamp: commit.time().seconds(),
            message: commit.message().unwrap_or("").to_string(),
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
            files,
        })
    }

    fn post_change_source(&self, delta: &DiffDelta<'_>) -> Option<String> {
        if delta.status() == Delta::Deleted {
            return None;
        }
        let blob = self.repo.find_blob(delta.new_file().id()).ok()?;
        if blob.is_binary() {
            return None;
        }
        let text = String::from_utf8_lossy(blob.content());
        if let Cow::Owned(_) = text {
            tracing::debug!(repository = %self.name, file = %delta_path(delta), "source is not valid UTF-8, decoded lossily");
        }
        Some(text.into_owned())
    }
}

impl CommitSource for GitRepository {
    fn commits(&self) -> Result<Vec<CommitInfo>> {
        // 1. Collect all commit ids, newest first
        let mut revwalk = self.repo.revwalk().map_err(|e| self.access_error(e))?;
        revwalk.push_head().map_err(|e| self.access_error(e))?;
        revwalk.set_sorting(Sort::TIME).map_err(|e| self.access_error(e))?;

        let mut oids = Vec::new();
        for oid in revwalk {
            oids.push(oid.map_err(|e| self.access_error(e))?);
        }
        oids.reverse(); // Walk from the first commit to the last

        // 2. Attribute line deltas per file
        let mut commits = Vec::with_capacity(oids.len());
        for oid in oids {
            let commit = self.repo.find_commit(oid).map_err(|e| self.access_error(e))?;
            commits.push(self.commit_info(&commit).map_err(|e| self.access_error(e))?);
        }

        tracing::debug!(repository = %self.name, commits = commits.len(), "traversed history");
        Ok(commits)
    }

    fn modified_files(&self, hash: &str) -> Result<Vec<ModifiedFile>> {
        let oid = Oid::from_str(hash).map_err(|e| MinerError::history(hash, e))?;
        let commit = self.repo.find_commit(oid).map_err(|e| MinerError::history(hash, e))?;
        let Some(diff) = self.diff_to_parent(&commit).map_err(|e| MinerError::history(hash, e))? else {
            return Ok(Vec::new());
        };

        let mut files = Vec::with_capacity(diff.deltas().len());
        for (idx, delta) in diff.deltas().enumerate() {
            let (added_lines, deleted_lines, diff_text) = match Patch::from_diff(&diff, idx).map_err(|e| MinerError::history(hash, e))? {
                Some(mut patch) => {
                    let (_, added, deleted) = patch.line_stats().map_err(|e| MinerError::history(hash, e))?;
                    let buf = patch.to_buf().map_err(|e| MinerError::history(hash, e))?;
                    (added as u64, deleted as u64, String::from_utf8_lossy(&buf).into_owned())
                }
                None => (0, 0, String::new()),
            };

            files.push(ModifiedFile {
                path: delta_path(&delta),
                added_lines,
                deleted_lines,
                source: self.post_change_source(&delta),
                diff: diff_text,
            });
        }

        Ok(files)
    }
}

fn delta_path(delta: &DiffDelta<'_>) -> String {
    delta
        .new_file()
        .path()
        .or_else(|| delta.old_file().path())
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_changes(diff: &Diff<'_>) -> std::result::Result<Vec<FileChange>, git2::Error> {
    let mut files = Vec::with_capacity(diff.deltas().len());
    for (idx, delta) in diff.deltas().enumerate() {
        let (added_lines, deleted_lines) = match Patch::from_diff(diff, idx)? {
            Some(patch) => {
                let (_, added, deleted) = patch.line_stats()?;
                (added as u64, deleted as u64)
            }
            None => (0, 0),
        };
        files.push(FileChange {
            path: delta_path(&delta),
            added_lines,
            deleted_lines,
        });
    }
    Ok(files)
}

/// Read-only index over a repository's full history, built once per repository.
/// File histories are slices of commit indices keyed by path.
#[derive(Debug, Default)]
pub struct RepositoryHistory {
    commits: Vec<CommitInfo>,
    by_hash: HashMap<String, usize>,
    by_file: HashMap<String, Vec<usize>>,
    total_additions: u64,
}

impl RepositoryHistory {
    pub fn load(source: &impl CommitSource) -> Result<Self> {
        Ok(Self::from_commits(source.commits()?))
    }

    /// `commits` must be ordered oldest first
    pub fn from_commits(commits: Vec<CommitInfo>) -> Self {
        let mut by_hash = HashMap::with_capacity(commits.len());
        let mut by_file: HashMap<String, Vec<usize>> = HashMap::new();
        let mut total_additions = 0;

        for (idx, commit) in commits.iter().enumerate() {
            by_hash.insert(commit.hash.clone(), idx);
            for file in &commit.files {
                total_additions += file.added_lines;
                let entries = by_file.entry(file.path.clone()).or_default();
                if entries.last() != Some(&idx) {
                    entries.push(idx);
                }
            }
        }

        Self {
            commits,
            by_hash,
            by_file,
            total_additions,
        }
    }

    pub fn commit(&self, hash: &str) -> Option<&CommitInfo> {
        self.by_hash.get(hash).map(|&idx| &self.commits[idx])
    }

    /// Commits that touched `path`, oldest first; empty for unknown paths
    pub fn file_history(&self, path: &str) -> FileHistory<'_> {
        self.by_file
            .get(path)
            .map(|indices| indices.iter().map(|&idx| &self.commits[idx]).collect())
            .unwrap_or_default()
    }

    pub fn commits(&self) -> &[CommitInfo] {
        &self.commits
    }

    /// Added lines summed over every file of every commit
    pub fn total_additions(&self) -> u64 {
        self.total_additions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, files: &[(&str, u64)]) -> CommitInfo {
        CommitInfo {
            hash: hash.to_string(),
            author: "dev".to_string(),
            timestamp: 0,
            message: String::new(),
            parents: Vec::new(),
            files: files
                .iter()
                .map(|&(path, added_lines)| FileChange {
                    path: path.to_string(),
                    added_lines,
                    deleted_lines: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn indexes_file_histories_in_commit_order() {
        let history = RepositoryHistory::from_commits(vec![
            commit("a", &[("src/A.java", 10), ("README.md", 3)]),
            commit("b", &[("src/B.java", 4)]),
            commit("c", &[("src/A.java", 2)]),
        ]);

        let hashes: Vec<&str> = history.file_history("src/A.java").iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, ["a", "c"]);
        assert!(history.file_history("missing.java").is_empty());
        assert_eq!(history.total_additions(), 19);
        assert_eq!(history.commit("b").map(|c| c.files.len()), Some(1));
        assert!(history.commit("zzz").is_none());
    }
}
