// src/model.rs

use serde::Serialize;
use std::collections::BTreeSet;

/// Line-delta attribution for one file touched by a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub added_lines: u64,
    pub deleted_lines: u64,
}

/// A commit as recorded in the repository's history index.
/// Immutable once read; carries no file contents.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub hash: String,
    pub author: String,
    /// Committer timestamp, seconds since the epoch
    pub timestamp: i64,
    pub message: String,
    pub parents: Vec<String>,
    pub files: Vec<FileChange>,
}

impl CommitInfo {
    pub fn touches(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}

/// A modified-file entry of a target commit, loaded on demand with its post-change text
#[derive(Debug, Clone)]
pub struct ModifiedFile {
    pub path: String,
    pub added_lines: u64,
    pub deleted_lines: u64,
    /// `None` for deletions and binary blobs; invalid UTF-8 is decoded lossily
    pub source: Option<String>,
    /// Unified diff against the first parent
    pub diff: String,
}

impl ModifiedFile {
    pub fn has_extension(&self, extensions: &[String]) -> bool {
        std::path::Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
    }
}

/// The ordered commits (oldest first) that touched one filename
pub type FileHistory<'a> = Vec<&'a CommitInfo>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
    Package,
}

/// Direct statements of a method body; nested blocks are not descended into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodBody {
    pub statements: usize,
    pub decision_points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSummary {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    /// `None` for abstract and native methods
    pub body: Option<MethodBody>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSummary {
    pub visibility: Visibility,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassSummary {
    pub name: String,
    pub methods: Vec<MethodSummary>,
    pub fields: Vec<FieldSummary>,
}

/// Structural summary of one file revision
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyntaxSummary {
    /// Top-level class declarations in source order
    pub classes: Vec<ClassSummary>,
}

impl SyntaxSummary {
    /// The class whose shape is reported for the file
    pub fn primary_class(&self) -> Option<&ClassSummary> {
        self.classes.first()
    }
}

/// A commit flagged by refactoring detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactoringEvent {
    pub hash: String,
    pub refactoring_types: Vec<String>,
    pub files: BTreeSet<String>,
}

/// One output row per (commit, file) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRecord {
    #[serde(rename = "commit hash")]
    pub commit_hash: String,
    pub file: String,
    #[serde(flatten)]
    pub structural: StructuralMetrics,
    #[serde(flatten)]
    pub process: ProcessMetrics,
}

/// Class-shape metrics. The coupling and cohesion fields are not computed
/// and keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct StructuralMetrics {
    pub sexp: u32,
    pub cbo: u32,
    pub wmc: u32,
    pub rfc: u32,
    pub eloc: usize,
    pub nom: usize,
    pub nopm: usize,
    pub dit: u32,
    pub noc: u32,
    pub nof: usize,
    pub nosf: usize,
    pub nopf: usize,
    pub nosm: usize,
    pub nosi: u32,
    #[serde(rename = "HsLCOM")]
    pub hs_lcom: u32,
    #[serde(rename = "C3")]
    pub c3: u32,
    #[serde(rename = "ComRead")]
    pub com_read: u32,
}

impl Default for StructuralMetrics {
    fn default() -> Self {
        Self {
            sexp: 0,
            cbo: 0,
            wmc: 0,
            rfc: 0,
            eloc: 0,
            nom: 0,
            nopm: 0,
            dit: 1,
            noc: 0,
            nof: 0,
            nosf: 0,
            nopf: 0,
            nosm: 0,
            nosi: 0,
            hs_lcom: 0,
            c3: 0,
            com_read: 0,
        }
    }
}

/// Change-history metrics
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct ProcessMetrics {
    pub nd: usize,
    pub ns: usize,
    pub age: f64,
    pub fix: bool,
    pub nuc: usize,
    pub cexp: usize,
    pub rexp: usize,
    pub oexp: f64,
    pub exp: f64,
    pub ndev: usize,
}

/// Message of one flagged commit, as exported next to the metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitMessageEntry {
    #[serde(rename = "commit hash")]
    pub commit_hash: String,
    #[serde(rename = "commit message")]
    pub message: String,
    #[serde(rename = "refactoring types")]
    pub refactoring_types: Vec<String>,
    #[serde(rename = "refactored files")]
    pub refactored_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub file_path: String,
    pub additions: u64,
    pub deletions: u64,
}

/// One modified file of a flagged commit with its unified diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitDiffEntry {
    #[serde(rename = "commit hash")]
    pub commit_hash: String,
    /// First parent; `None` for a root commit
    #[serde(rename = "previous commit hash")]
    pub previous_commit_hash: Option<String>,
    #[serde(rename = "diff stats")]
    pub stats: DiffStats,
    #[serde(rename = "diff content")]
    pub diff: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitDocuments {
    pub messages: Vec<CommitMessageEntry>,
    pub diffs: Vec<CommitDiffEntry>,
}
