// src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MinerError>;

#[derive(Debug, Error)]
pub enum MinerError {
    /// The source text of one file revision did not parse
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// A commit or its file history could not be resolved
    #[error("failed to resolve history for commit {commit}: {message}")]
    HistoryResolution { commit: String, message: String },

    /// The repository as a whole could not be cloned, opened or traversed
    #[error("repository {repository} is not accessible: {source}")]
    RepositoryAccess {
        repository: String,
        #[source]
        source: git2::Error,
    },

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl MinerError {
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn history(commit: impl Into<String>, message: impl ToString) -> Self {
        Self::HistoryResolution {
            commit: commit.into(),
            message: message.to_string(),
        }
    }

    /// Errors that only cost the current (commit, file) record
    pub fn is_record_level(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::HistoryResolution { .. })
    }
}
