// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mine refactoring commits into per-file code and process metrics", long_about = None)]
pub struct Args {
    /// File listing one repository URL or local path per line
    #[arg(long, env = "RM_REPO_LIST", default_value = "project_links.txt")]
    pub repo_list: PathBuf,

    /// Directory holding the repository clones
    #[arg(long, env = "RM_CLONE_DIR", default_value = "cloned_repos")]
    pub clone_dir: PathBuf,

    /// Directory with per-repository refactoring inputs; metrics are written next to them
    #[arg(short, long, env = "RM_OUTPUT_DIR", default_value = "rminer-outputs")]
    pub output_dir: PathBuf,

    /// Append-only log file
    #[arg(long, env = "RM_LOG_FILE", default_value = "logs/output.log")]
    pub log_file: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Number of repositories processed in parallel (0 picks one per core)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Source file extensions that get measured
    #[arg(long, value_delimiter = ',', default_value = "java")]
    pub extensions: Vec<String>,

    /// The size of the recent-experience window, in days
    #[arg(long, default_value_t = 30)]
    pub rexp_window_days: i64,

    /// What the recent-experience window is measured back from
    #[arg(long, value_enum, default_value_t = RexpAnchor::Commit)]
    pub rexp_anchor: RexpAnchor,

    /// Never clone; repositories missing from the clone directory are skipped
    #[arg(long)]
    pub no_clone: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum RexpAnchor {
    /// The target commit's timestamp (reproducible)
    Commit,
    /// The wall clock at run time (legacy datasets)
    WallClock,
}
