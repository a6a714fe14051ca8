// src/dataset.rs

use crate::error::Result;
use crate::model::RefactoringEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Top level of a RefactoringMiner `-json` report
#[derive(Debug, Deserialize)]
struct RefactoringReport {
    #[serde(default)]
    commits: Vec<ReportCommit>,
}

#[derive(Debug, Deserialize)]
struct ReportCommit {
    sha1: Option<String>,
    #[serde(default)]
    refactorings: Vec<ReportRefactoring>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRefactoring {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    left_side_locations: Vec<ReportLocation>,
    #[serde(default)]
    right_side_locations: Vec<ReportLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportLocation {
    file_path: String,
}

/// Parses a refactoring report into events, in report order.
/// Commits without a hash are dropped.
pub fn parse_refactoring_events(json: &str) -> Result<Vec<RefactoringEvent>> {
    let report: RefactoringReport = serde_json::from_str(json)?;
    Ok(report.commits.into_iter().filter_map(into_event).collect())
}

pub fn read_refactoring_events(path: &Path) -> Result<Vec<RefactoringEvent>> {
    parse_refactoring_events(&fs::read_to_string(path)?)
}

fn into_event(commit: ReportCommit) -> Option<RefactoringEvent> {
    let hash = commit.sha1.filter(|h| !h.is_empty())?;
    let mut refactoring_types = Vec::with_capacity(commit.refactorings.len());
    let mut files = BTreeSet::new();

    for refactoring in commit.refactorings {
        refactoring_types.push(refactoring.kind);
        files.extend(
            refactoring
                .left_side_locations
                .into_iter()
                .chain(refactoring.right_side_locations)
                .map(|location| location.file_path),
        );
    }

    Some(RefactoringEvent {
        hash,
        refactoring_types,
        files,
    })
}

/// Writes one pretty-printed JSON document, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommitDiffEntry, DiffStats, MetricsRecord, ProcessMetrics, StructuralMetrics};
    use indoc::indoc;

    #[test]
    fn reads_refactoring_miner_reports() {
        let events = parse_refactoring_events(indoc! {r#"
            {
              "commits": [
                {
                  "repository": "https://github.com/example/demo.git",
                  "sha1": "abc123",
                  "url": "https://github.com/example/demo/commit/abc123",
                  "refactorings": [
                    {
                      "type": "Extract Method",
                      "description": "Extract Method run() from A",
                      "leftSideLocations": [{ "filePath": "src/A.java", "startLine": 3 }],
                      "rightSideLocations": [{ "filePath": "src/A.java" }, { "filePath": "src/B.java" }]
                    }
                  ]
                },
                { "repository": "demo", "url": "no hash", "refactorings": [] },
                { "sha1": "def456", "refactorings": [] }
              ]
            }
        "#})
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].hash, "abc123");
        assert_eq!(events[0].refactoring_types, ["Extract Method"]);
        assert_eq!(events[0].files.iter().collect::<Vec<_>>(), ["src/A.java", "src/B.java"]);
        assert_eq!(events[1].hash, "def456");
        assert!(events[1].files.is_empty());
    }

    #[test]
    fn empty_report_has_no_events() {
        assert!(parse_refactoring_events("{}").unwrap().is_empty());
        assert!(parse_refactoring_events("not json").is_err());
    }

    #[test]
    fn records_serialize_with_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo").join("demo_metrics.json");
        let record = MetricsRecord {
            commit_hash: "abc123".to_string(),
            file: "src/A.java".to_string(),
            structural: StructuralMetrics {
                wmc: 4,
                eloc: 12,
                ..StructuralMetrics::default()
            },
            process: ProcessMetrics {
                fix: true,
                age: 2.5,
                ..ProcessMetrics::default()
            },
        };

        write_json(&path, &[record]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let row = &value[0];
        assert_eq!(row["commit hash"], "abc123");
        assert_eq!(row["file"], "src/A.java");
        assert_eq!(row["WMC"], 4);
        assert_eq!(row["ELOC"], 12);
        assert_eq!(row["DIT"], 1);
        assert_eq!(row["HsLCOM"], 0);
        assert_eq!(row["ComRead"], 0);
        assert_eq!(row["FIX"], true);
        assert_eq!(row["AGE"], 2.5);
        assert_eq!(row["NDEV"], 0);
        assert_eq!(row.as_object().map(|o| o.len()), Some(29));
    }

    #[test]
    fn diff_entries_use_exported_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo_commit_diffs.json");
        let root = CommitDiffEntry {
            commit_hash: "abc123".to_string(),
            previous_commit_hash: None,
            stats: DiffStats {
                file_path: "src/A.java".to_string(),
                additions: 3,
                deletions: 1,
            },
            diff: "@@ -1 +1,3 @@".to_string(),
        };

        write_json(&path, &[root]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let row = &value[0];
        assert_eq!(row["commit hash"], "abc123");
        assert!(row["previous commit hash"].is_null());
        assert_eq!(row["diff stats"]["file_path"], "src/A.java");
        assert_eq!(row["diff stats"]["additions"], 3);
        assert_eq!(row["diff stats"]["deletions"], 1);
        assert_eq!(row["diff content"], "@@ -1 +1,3 @@");
    }
}
