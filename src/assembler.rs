// src/assembler.rs

use crate::error::Result;
use crate::history::{CommitSource, RepositoryHistory};
use crate::model::{
    CommitDiffEntry, CommitDocuments, CommitInfo, CommitMessageEntry, DiffStats, MetricsRecord, ModifiedFile, RefactoringEvent,
};
use crate::process::{process_metrics, ProcessOptions};
use crate::structural::structural_metrics;
use crate::syntax::JavaExtractor;
use std::collections::HashSet;
use tracing::{debug, error};

const UNKNOWN_MESSAGE: &str = "Unknown commit message";

#[derive(Debug, Clone)]
pub struct MetricsOptions {
    /// Recognized source extensions, without the dot
    pub extensions: Vec<String>,
    pub process: ProcessOptions,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["java".to_string()],
            process: ProcessOptions::default(),
        }
    }
}

/// Builds the metrics records of one repository, in event order and then
/// modified-file order. Commits that cannot be found and files that fail to
/// parse are logged and skipped; only repository-level failures are returned.
pub fn assemble(
    repository: &str,
    source: &impl CommitSource,
    history: &RepositoryHistory,
    events: &[RefactoringEvent],
    options: &MetricsOptions,
) -> Result<Vec<MetricsRecord>> {
    let mut extractor = JavaExtractor::new()?;
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for event in events {
        if !seen.insert(event.hash.as_str()) {
            debug!(repository, commit = %event.hash, "duplicate refactoring event ignored");
            continue;
        }

        let Some(commit) = history.commit(&event.hash) else {
            error!(repository, commit = %event.hash, "commit not found");
            continue;
        };

        let modified_files = match source.modified_files(&event.hash) {
            Ok(files) => files,
            Err(e) if e.is_record_level() => {
                error!(repository, commit = %event.hash, error = %e, "failed to load modified files");
                continue;
            }
            Err(e) => return Err(e),
        };

        for file in &modified_files {
            let Some(text) = measurable_source(file, &options.extensions) else {
                continue;
            };

            match measure_file(&mut extractor, commit, file, text, history, &options.process) {
                Ok(record) => records.push(record),
                Err(e) if e.is_record_level() => {
                    error!(repository, commit = %commit.hash, file = %file.path, error = %e, "error calculating metrics");
                }
                Err(e) => return Err(e),
            }
        }
    }

    debug!(repository, records = records.len(), "assembled metrics");
    Ok(records)
}

/// Message and per-file diff documents of the flagged commits, in event order.
/// An unknown commit keeps a placeholder message and has no diffs.
pub fn commit_documents(
    repository: &str,
    source: &impl CommitSource,
    history: &RepositoryHistory,
    events: &[RefactoringEvent],
) -> Result<CommitDocuments> {
    let mut documents = CommitDocuments::default();
    let mut seen = HashSet::new();

    for event in events.iter().filter(|event| seen.insert(event.hash.as_str())) {
        let commit = history.commit(&event.hash);
        documents.messages.push(CommitMessageEntry {
            commit_hash: event.hash.clone(),
            message: commit.map_or(UNKNOWN_MESSAGE, |c| c.message.trim()).to_string(),
            refactoring_types: event.refactoring_types.clone(),
            refactored_files: event.files.iter().cloned().collect(),
        });

        let Some(commit) = commit else {
            continue;
        };
        let modified_files = match source.modified_files(&commit.hash) {
            Ok(files) => files,
            Err(e) if e.is_record_level() => {
                error!(repository, commit = %commit.hash, error = %e, "failed to load commit diff");
                continue;
            }
            Err(e) => return Err(e),
        };

        let previous_commit_hash = commit.parents.first().cloned();
        documents.diffs.extend(modified_files.into_iter().map(|file| CommitDiffEntry {
            commit_hash: commit.hash.clone(),
            previous_commit_hash: previous_commit_hash.clone(),
            stats: DiffStats {
                file_path: file.path,
                additions: file.added_lines,
                deletions: file.deleted_lines,
            },
            diff: file.diff,
        }));
    }

    Ok(documents)
}

fn measurable_source<'f>(file: &'f ModifiedFile, extensions: &[String]) -> Option<&'f str> {
    if !file.has_extension(extensions) {
        return None;
    }
    file.source.as_deref().filter(|text| !text.is_empty())
}

fn measure_file(
    extractor: &mut JavaExtractor,
    commit: &CommitInfo,
    file: &ModifiedFile,
    text: &str,
    history: &RepositoryHistory,
    options: &ProcessOptions,
) -> Result<MetricsRecord> {
    let summary = extractor.extract(&file.path, text)?;
    let file_history = history.file_history(&file.path);

    Ok(MetricsRecord {
        commit_hash: commit.hash.clone(),
        file: file.path.clone(),
        structural: structural_metrics(&summary, text),
        process: process_metrics(commit, &file.path, &file_history, history, options),
    })
}
