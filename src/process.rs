// src/process.rs

//! Change-history metrics for one (commit, file) pair.
//!
//! Every quantity is taken relative to the target commit over the file's
//! full recorded history, later commits included. OEXP and EXP also look at
//! the repository as a whole.

use crate::cli::RexpAnchor;
use crate::history::RepositoryHistory;
use crate::model::{CommitInfo, ProcessMetrics};
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions {
    pub rexp_window_days: i64,
    pub rexp_anchor: RexpAnchor,
    /// Wall-clock instant used by [`RexpAnchor::WallClock`], captured once per batch
    pub now: i64,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            rexp_window_days: 30,
            rexp_anchor: RexpAnchor::Commit,
            now: chrono::Utc::now().timestamp(),
        }
    }
}

pub fn process_metrics(
    target: &CommitInfo,
    path: &str,
    file_history: &[&CommitInfo],
    repository: &RepositoryHistory,
    options: &ProcessOptions,
) -> ProcessMetrics {
    let authors: HashSet<&str> = file_history.iter().map(|c| c.author.as_str()).collect();
    let (nd, ns) = dispersion(target);

    ProcessMetrics {
        nd,
        ns,
        age: mean_age_days(target, file_history),
        fix: references_issue(&target.message),
        nuc: file_history.iter().filter(|c| c.touches(path)).count(),
        cexp: file_history.iter().filter(|c| c.author == target.author).count(),
        rexp: recent_experience(target, file_history, options),
        oexp: ownership(path, file_history, repository.total_additions()),
        exp: legacy_experience_index(repository.commits(), path, authors.len()),
        ndev: authors.len(),
    }
}

/// Distinct parent directories (ND) and distinct top-level directories (NS)
/// among every file the commit touched. Root-level files count as the empty directory.
pub fn dispersion(target: &CommitInfo) -> (usize, usize) {
    let directories: BTreeSet<String> = target
        .files
        .iter()
        .map(|f| {
            Path::new(&f.path)
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect();
    let subsystems: BTreeSet<&str> = directories
        .iter()
        .map(|dir| dir.split('/').next().unwrap_or_default())
        .collect();
    (directories.len(), subsystems.len())
}

/// Mean whole-day distance from the other commits of the file to the target.
/// Later commits give negative deltas.
pub fn mean_age_days(target: &CommitInfo, file_history: &[&CommitInfo]) -> f64 {
    let deltas: Vec<i64> = file_history
        .iter()
        .filter(|c| c.hash != target.hash)
        .map(|c| (target.timestamp - c.timestamp).div_euclid(SECONDS_PER_DAY))
        .collect();
    if deltas.is_empty() {
        return 0.0;
    }
    deltas.iter().sum::<i64>() as f64 / deltas.len() as f64
}

static ISSUE_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]+-[0-9]+").expect("invalid regex"));

/// True when the message carries a ticket key such as `JIRA-123`
pub fn references_issue(message: &str) -> bool {
    ISSUE_KEY_REGEX.is_match(message)
}

/// Commits to the file by the target's author inside the REXP window
pub fn recent_experience(target: &CommitInfo, file_history: &[&CommitInfo], options: &ProcessOptions) -> usize {
    let window = options.rexp_window_days * SECONDS_PER_DAY;
    file_history
        .iter()
        .filter(|c| c.author == target.author)
        .filter(|c| match options.rexp_anchor {
            RexpAnchor::Commit => c.timestamp > target.timestamp - window && c.timestamp <= target.timestamp,
            RexpAnchor::WallClock => c.timestamp > options.now - window,
        })
        .count()
}

/// Lines the file's top contributor added to it, as a percentage of all lines
/// added anywhere in the repository
pub fn ownership(path: &str, file_history: &[&CommitInfo], total_additions: u64) -> f64 {
    if total_additions == 0 {
        return 0.0;
    }

    let mut contributions: HashMap<&str, u64> = HashMap::new();
    for commit in file_history {
        let added: u64 = commit
            .files
            .iter()
            .filter(|f| f.path == path)
            .map(|f| f.added_lines)
            .sum();
        *contributions.entry(commit.author.as_str()).or_default() += added;
    }

    let highest = contributions.values().copied().max().unwrap_or(0);
    highest as f64 / total_additions as f64 * 100.0
}

/// The historical EXP formula, kept as-is for comparability with earlier datasets.
///
/// For every commit of the repository, once per author of the file, the number
/// of entries of that commit naming the file is taken as a factor; EXP is the
/// geometric mean of all factors. Any commit that leaves the file alone makes
/// the product, and so the result, zero.
pub fn legacy_experience_index(commits: &[CommitInfo], path: &str, author_count: usize) -> f64 {
    let factors = commits.len() * author_count;
    if factors == 0 {
        return 0.0;
    }

    let mut log_sum = 0.0;
    for commit in commits {
        let touches = commit.files.iter().filter(|f| f.path == path).count();
        if touches == 0 {
            return 0.0;
        }
        log_sum += author_count as f64 * (touches as f64).ln();
    }
    (log_sum / factors as f64).exp()
}
