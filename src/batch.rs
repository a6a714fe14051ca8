// src/batch.rs

use crate::assembler::{assemble, commit_documents, MetricsOptions};
use crate::dataset::{read_refactoring_events, write_json};
use crate::error::{MinerError, Result};
use crate::history::{GitRepository, RepositoryHistory};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, Dispatch};

/// A repository to mine: a clone URL or a local checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTarget {
    pub name: String,
    pub location: String,
}

impl RepositoryTarget {
    pub fn new(location: &str) -> Self {
        let location = location.trim();
        Self {
            name: repository_name(location),
            location: location.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub clone_dir: PathBuf,
    pub output_dir: PathBuf,
    /// 0 lets rayon pick
    pub jobs: usize,
    pub clone_missing: bool,
    pub metrics: MetricsOptions,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub repositories: usize,
    pub failed: usize,
    pub records: usize,
}

/// `https://github.com/org/project.git` -> `project`
pub fn repository_name(location: &str) -> String {
    let trimmed = location.trim().trim_end_matches(['/', '\\']);
    let last = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

/// One target per non-blank line
pub fn read_repository_list(path: &Path) -> Result<Vec<RepositoryTarget>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(RepositoryTarget::new)
        .collect())
}

/// The per-repository input and output files under `<output_dir>/<name>/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub refactorings: PathBuf,
    pub metrics: PathBuf,
    pub commit_messages: PathBuf,
    pub commit_diffs: PathBuf,
}

pub fn dataset_paths(output_dir: &Path, name: &str) -> DatasetPaths {
    let repo_output_dir = output_dir.join(name);
    let file = |suffix: &str| repo_output_dir.join(format!("{name}_{suffix}.json"));
    DatasetPaths {
        refactorings: file("refactorings"),
        metrics: file("metrics"),
        commit_messages: file("commit_messages"),
        commit_diffs: file("commit_diffs"),
    }
}

/// Processes repositories on a bounded pool, one repository per worker at a time.
/// Failures are logged per repository and never stop the batch.
pub fn run_batch(targets: &[RepositoryTarget], config: &BatchConfig, dispatch: &Dispatch) -> Result<BatchSummary> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(config.jobs).build()?;

    let bar = ProgressBar::new(targets.len() as u64);
    bar.set_message("Mining repositories");

    let outcomes: Vec<Option<usize>> = pool.install(|| {
        targets
            .par_iter()
            .progress_with(bar.clone())
            .map(|target| {
                tracing::dispatcher::with_default(dispatch, || match process_repository(target, config) {
                    Ok(records) => Some(records),
                    Err(e) => {
                        error!(repository = %target.name, error = %e, "error processing repository");
                        None
                    }
                })
            })
            .collect()
    });
    bar.finish_with_message("Mining complete");

    Ok(BatchSummary {
        repositories: outcomes.len(),
        failed: outcomes.iter().filter(|o| o.is_none()).count(),
        records: outcomes.iter().flatten().sum(),
    })
}

/// Mines one repository end to end and writes its metrics, commit message
/// and commit diff files. Returns the number of metrics records written.
pub fn process_repository(target: &RepositoryTarget, config: &BatchConfig) -> Result<usize> {
    let paths = dataset_paths(&config.output_dir, &target.name);
    let events = read_refactoring_events(&paths.refactorings)?;

    let repo = open_or_clone(target, config)?;
    let history = RepositoryHistory::load(&repo)?;
    info!(
        repository = %target.name,
        commits = history.commits().len(),
        events = events.len(),
        "loaded history"
    );

    let records = assemble(repo.name(), &repo, &history, &events, &config.metrics)?;
    write_json(&paths.metrics, &records)?;

    let documents = commit_documents(repo.name(), &repo, &history, &events)?;
    write_json(&paths.commit_messages, &documents.messages)?;
    write_json(&paths.commit_diffs, &documents.diffs)?;

    info!(
        repository = %target.name,
        records = records.len(),
        diffs = documents.diffs.len(),
        path = %paths.metrics.display(),
        "metrics written"
    );
    Ok(records.len())
}

fn open_or_clone(target: &RepositoryTarget, config: &BatchConfig) -> Result<GitRepository> {
    let local = Path::new(&target.location);
    if local.is_dir() {
        return GitRepository::open(&target.name, local);
    }

    let clone_path = config.clone_dir.join(&target.name);
    if clone_path.exists() {
        return GitRepository::open(&target.name, &clone_path);
    }

    if !config.clone_missing {
        return Err(MinerError::RepositoryAccess {
            repository: target.name.clone(),
            source: git2::Error::from_str("repository is not cloned and cloning is disabled"),
        });
    }

    fs::create_dir_all(&config.clone_dir)?;
    info!(repository = %target.name, url = %target.location, "cloning");
    GitRepository::clone_from(&target.name, &target.location, &clone_path)
}
