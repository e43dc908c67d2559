use std::path::Path;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::output::{self, EntryStatus, Manifest, ManifestEntry};
use crate::parser::locate::HeadingIndex;
use crate::parser::{self, Outcome};
use crate::roster::Roster;

pub struct RunOptions {
    pub dry_run: bool,
    pub jobs: usize,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub attempted: usize,
    pub resolved: usize,
    pub duplicates: usize,
    pub not_found: Vec<String>,
    pub empty: Vec<String>,
    pub failed: Vec<String>,
}

impl RunReport {
    pub fn unresolved(&self) -> usize {
        self.not_found.len() + self.empty.len()
    }

    pub fn print(&self) {
        println!(
            "Resolved {} of {} names, {} unresolved ({} not found, {} empty), {} write errors, {} duplicates skipped.",
            self.resolved,
            self.attempted,
            self.unresolved(),
            self.not_found.len(),
            self.empty.len(),
            self.failed.len(),
            self.duplicates,
        );
        if !self.not_found.is_empty() {
            println!("Not found: {}", self.not_found.join(", "));
        }
        if !self.empty.is_empty() {
            println!("No sections: {}", self.empty.join(", "));
        }
    }
}

/// Resolve every roster name and write one file per resolved entry. Status
/// lines and files follow roster order even when resolution runs in parallel.
pub fn run(
    doc: &Document,
    source: &Path,
    roster: &Roster,
    out_dir: &Path,
    opts: &RunOptions,
) -> Result<RunReport> {
    let index = HeadingIndex::build(doc);
    info!("Indexed {} labelled headings", index.len());

    let (names, duplicates) = roster.dedup();
    if duplicates > 0 {
        debug!("Skipping {} repeated roster names", duplicates);
    }

    let outcomes = resolve_all(doc, &index, &names, opts.jobs)?;

    let mut report = RunReport {
        attempted: names.len(),
        duplicates,
        ..Default::default()
    };
    let mut manifest = Manifest::new(source);

    for (name, outcome) in names.iter().zip(&outcomes) {
        let mut status = None;
        let file = match outcome {
            Outcome::Resolved(record) => {
                let written = if opts.dry_run {
                    Ok(output::artifact_path(out_dir, name))
                } else {
                    output::write_entry(out_dir, record)
                };
                match written {
                    Ok(path) => {
                        let verb = if opts.dry_run { "Would write" } else { "Wrote" };
                        match record.alias() {
                            Some(label) => println!(
                                "{} documentation for {} (from {}) to {}.",
                                verb,
                                name,
                                label,
                                path.display()
                            ),
                            None => println!("{} documentation for {} to {}.", verb, name, path.display()),
                        }
                        report.resolved += 1;
                        Some(path)
                    }
                    Err(e) => {
                        warn!("{:#}", e);
                        println!("Failed to write documentation for {}.", name);
                        report.failed.push(name.to_string());
                        status = Some(EntryStatus::Failed);
                        None
                    }
                }
            }
            Outcome::NotFound => {
                println!("No documentation located for {}.", name);
                report.not_found.push(name.to_string());
                None
            }
            Outcome::Empty(m) => {
                println!("No sections recovered for {} (matched {}).", name, m.label);
                report.empty.push(name.to_string());
                None
            }
        };

        let mut entry = ManifestEntry::new(name, outcome, file.as_deref());
        if let Some(s) = status {
            entry.status = s;
        }
        manifest.entries.push(entry);
    }

    if !opts.dry_run && report.resolved > 0 {
        let path = output::write_manifest(out_dir, &manifest)?;
        debug!("Wrote manifest {}", path.display());
    }

    Ok(report)
}

fn resolve_all(
    doc: &Document,
    index: &HeadingIndex,
    names: &[&str],
    jobs: usize,
) -> Result<Vec<Outcome>> {
    let pb = ProgressBar::new(names.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let resolve = || {
        names
            .par_iter()
            .map(|name| {
                let outcome = parser::process_entry(doc, index, name);
                pb.inc(1);
                outcome
            })
            .collect::<Vec<_>>()
    };

    let outcomes = if jobs > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()?
            .install(resolve)
    } else {
        resolve()
    };

    pb.finish_and_clear();
    Ok(outcomes)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Document {
        let html = std::fs::read_to_string("tests/fixtures/ptx_sample.html").unwrap();
        Document::parse(&html)
    }

    fn opts() -> RunOptions {
        RunOptions {
            dry_run: false,
            jobs: 2,
        }
    }

    #[test]
    fn writes_one_file_per_resolved_name() {
        let doc = fixture();
        let dir = tempfile::tempdir().unwrap();
        let roster = Roster::from_names(["abs", "add", "elect", "exit", "wmma", "trap"]).unwrap();
        let report = run(&doc, Path::new("doc.html"), &roster, dir.path(), &opts()).unwrap();

        assert_eq!(report.resolved, 4);
        assert_eq!(report.not_found, ["wmma"]);
        assert_eq!(report.empty, ["exit"]);
        assert_eq!(report.unresolved(), 2);
        for name in ["abs", "add", "elect", "trap"] {
            assert!(dir.path().join(format!("{}.md", name)).exists(), "{} missing", name);
        }
        assert!(!dir.path().join("exit.md").exists());
        assert!(!dir.path().join("wmma.md").exists());
        assert!(!dir.path().join("elect.sync.md").exists());
        assert!(dir.path().join(output::MANIFEST_FILE).exists());
    }

    #[test]
    fn repeated_names_processed_once() {
        let doc = fixture();
        let dir = tempfile::tempdir().unwrap();
        let roster = Roster::from_names(["add", "add", "abs", "add"]).unwrap();
        let report = run(&doc, Path::new("doc.html"), &roster, dir.path(), &opts()).unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.resolved, 2);
        assert_eq!(report.duplicates, 2);
    }

    #[test]
    fn exact_entry_is_not_shadowed_by_variant() {
        let doc = fixture();
        let dir = tempfile::tempdir().unwrap();
        let roster = Roster::from_names(["add"]).unwrap();
        run(&doc, Path::new("doc.html"), &roster, dir.path(), &opts()).unwrap();
        let text = std::fs::read_to_string(dir.path().join("add.md")).unwrap();
        assert!(text.contains("add{.sat}.s32"));
        assert!(!text.contains("add.cc"));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let doc = fixture();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let roster = Roster::from_names(["abs", "mov"]).unwrap();
        let report = run(
            &doc,
            Path::new("doc.html"),
            &roster,
            &out,
            &RunOptions {
                dry_run: true,
                jobs: 0,
            },
        )
        .unwrap();
        assert_eq!(report.resolved, 2);
        assert!(!out.exists());
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let doc = fixture();
        let index = HeadingIndex::build(&doc);
        let roster = Roster::builtin();
        let (names, _) = roster.dedup();
        let seq: Vec<_> = names
            .iter()
            .map(|n| matches!(parser::process_entry(&doc, &index, n), Outcome::Resolved(_)))
            .collect();
        let par: Vec<_> = resolve_all(&doc, &index, &names, 4)
            .unwrap()
            .iter()
            .map(|o| matches!(o, Outcome::Resolved(_)))
            .collect();
        assert_eq!(seq, par);
    }
}
