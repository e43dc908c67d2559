mod document;
mod output;
mod parser;
mod roster;
mod run;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use document::Document;
use parser::locate::HeadingIndex;
use parser::Outcome;
use roster::Roster;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "ptxdoc",
    about = "Extract per-instruction reference sections from the PTX ISA manual"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one section file per roster name
    Extract {
        /// Reference document (HTML)
        #[arg(short, long)]
        doc: Option<PathBuf>,
        /// Output directory for entry files
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Roster file, one name per line (default: built-in instruction list)
        #[arg(short, long)]
        roster: Option<PathBuf>,
        /// Start at the N-th roster name (1-based)
        #[arg(long, default_value = "1")]
        start: usize,
        /// Stop at the N-th roster name; 0 runs to the end
        #[arg(long, default_value = "0")]
        end: usize,
        /// Resolve and report without writing files
        #[arg(long)]
        dry_run: bool,
        /// Worker threads (default: one per core)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Show which heading a name resolves to
    Locate {
        name: String,
        /// Reference document (HTML)
        #[arg(short, long)]
        doc: Option<PathBuf>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one entry's sections without writing anything
    Show {
        name: String,
        /// Reference document (HTML)
        #[arg(short, long)]
        doc: Option<PathBuf>,
    },
    /// List the effective roster
    Roster {
        /// Roster file, one name per line
        #[arg(short, long)]
        roster: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;

    let result = match cli.command {
        Commands::Extract {
            doc,
            out,
            roster,
            start,
            end,
            dry_run,
            jobs,
        } => {
            let doc_path = doc.unwrap_or_else(|| settings.document.clone());
            let out_dir = out.unwrap_or_else(|| settings.output_dir.clone());
            let roster = load_roster(roster.as_deref().or(settings.roster_file.as_deref()))?
                .range(start, end)?;

            let document = Document::load(&doc_path)?;
            info!("Loaded {}", doc_path.display());

            println!("Extracting {} roster names from {}...", roster.len(), doc_path.display());
            let opts = run::RunOptions {
                dry_run,
                jobs: jobs.unwrap_or(settings.jobs),
            };
            let report = run::run(&document, &doc_path, &roster, &out_dir, &opts)?;
            report.print();

            if report.resolved == 0 {
                bail!(
                    "no documentation resolved for any of {} roster names",
                    report.attempted
                );
            }
            Ok(())
        }
        Commands::Locate { name, doc, json } => {
            check_name(&name)?;
            let doc_path = doc.unwrap_or_else(|| settings.document.clone());
            let document = Document::load(&doc_path)?;
            locate(&document, &name, json)
        }
        Commands::Show { name, doc } => {
            check_name(&name)?;
            let doc_path = doc.unwrap_or_else(|| settings.document.clone());
            let document = Document::load(&doc_path)?;
            let index = HeadingIndex::build(&document);
            match parser::process_entry(&document, &index, &name) {
                Outcome::Resolved(record) => {
                    print!("{}", record.render());
                    Ok(())
                }
                Outcome::Empty(m) => bail!("no sections recovered for {} (matched {})", name, m.label),
                Outcome::NotFound => bail!("no documentation located for {}", name),
            }
        }
        Commands::Roster { roster } => {
            let roster = load_roster(roster.as_deref().or(settings.roster_file.as_deref()))?;
            for (i, name) in roster.names().iter().enumerate() {
                if roster.is_repeat(i) {
                    println!("{:>4}. {} (repeat, skipped)", i + 1, name);
                } else {
                    println!("{:>4}. {}", i + 1, name);
                }
            }
            let (unique, skipped) = roster.dedup();
            println!("\n{} names ({} unique, {} repeats)", roster.len(), unique.len(), skipped);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn load_roster(path: Option<&Path>) -> Result<Roster> {
    let roster = match path {
        Some(p) => Roster::from_file(p)?,
        None => Roster::builtin(),
    };
    if roster.is_empty() {
        bail!("roster is empty");
    }
    Ok(roster)
}

fn check_name(name: &str) -> Result<()> {
    Roster::from_names([name])?;
    Ok(())
}

fn locate(doc: &Document, name: &str, json: bool) -> Result<()> {
    let index = HeadingIndex::build(doc);
    let candidates = index.candidates(name);
    let Some(m) = index.locate(name).into_match() else {
        bail!("no documentation located for {}", name);
    };

    let sections = match parser::process_entry(doc, &index, name) {
        Outcome::Resolved(record) => record.labels(),
        _ => Vec::new(),
    };

    if json {
        let value = serde_json::json!({
            "name": name,
            "label": m.label,
            "kind": m.kind,
            "sections": sections,
            "candidates": candidates
                .iter()
                .map(|c| serde_json::json!({ "label": c.label, "kind": c.kind }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} -> {} ({:?})", name, m.label, m.kind);
    let labels: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
    println!("Candidates: {}", labels.join(", "));
    if sections.is_empty() {
        println!("Sections:   (none)");
    } else {
        let names: Vec<&str> = sections.iter().map(|s| s.as_str()).collect();
        println!("Sections:   {}", names.join(", "));
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
