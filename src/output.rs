use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::parser::entry::EntryRecord;
use crate::parser::locate::MatchKind;
use crate::parser::sections::SectionLabel;
use crate::parser::Outcome;

pub const MANIFEST_FILE: &str = "index.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Written,
    NotFound,
    Empty,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    pub name: String,
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MatchKind>,
    pub sections: Vec<SectionLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ManifestEntry {
    pub fn new(name: &str, outcome: &Outcome, file: Option<&Path>) -> Self {
        let (status, matched, sections) = match outcome {
            Outcome::Resolved(r) => (EntryStatus::Written, Some(&r.matched), r.labels()),
            Outcome::Empty(m) => (EntryStatus::Empty, Some(m), Vec::new()),
            Outcome::NotFound => (EntryStatus::NotFound, None, Vec::new()),
        };
        ManifestEntry {
            name: name.to_string(),
            status,
            label: matched.map(|m| m.label.clone()),
            kind: matched.map(|m| m.kind),
            sections,
            file: file
                .and_then(|p| p.file_name())
                .map(|f| f.to_string_lossy().into_owned()),
        }
    }
}

/// Index of one run, written next to the entry files.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub generated_at: DateTime<Utc>,
    pub document: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(document: &Path) -> Self {
        Manifest {
            generated_at: Utc::now(),
            document: document.to_path_buf(),
            entries: Vec::new(),
        }
    }
}

/// Entry files are addressed by canonical roster name, never by matched label.
pub fn artifact_path(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join(format!("{}.md", name))
}

pub fn write_entry(out_dir: &Path, record: &EntryRecord) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    let path = artifact_path(out_dir, &record.name);
    fs::write(&path, record.render())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

pub fn write_manifest(out_dir: &Path, manifest: &Manifest) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    let path = out_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
