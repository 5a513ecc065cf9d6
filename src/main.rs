use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use research_report::config::Settings;
use research_report::{db, ContentRecord, Report};

#[derive(Parser)]
#[command(name = "research_report", about = "Turn research analysis text into structured reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse analysis text (file or "-" for stdin) into a report
    Parse {
        input: PathBuf,
        /// Research query the text answers
        #[arg(short, long, default_value = "")]
        query: String,
        /// Print the raw section parse instead of the report
        #[arg(long)]
        raw: bool,
        /// Also store the report in the archive
        #[arg(long)]
        save: bool,
    },
    /// Build a basic report from a JSON array of search hits
    Fallback {
        input: PathBuf,
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(long)]
        save: bool,
    },
    /// Normalize a report-like JSON document (any schema version)
    Normalize { input: PathBuf },
    /// Parse every *.txt file in a directory; file stem is the query
    Batch {
        dir: PathBuf,
        #[arg(long)]
        save: bool,
    },
    /// List archived reports
    List {
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Re-normalize every archived report in place
    Migrate,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("loading settings")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();

    let result = match cli.command {
        Commands::Parse { input, query, raw, save } => {
            let text = read_input(&input)?;
            if raw {
                let partial = research_report::parser::parse_sections(&text);
                println!("{}", serde_json::to_string_pretty(&partial)?);
                return Ok(());
            }
            let report = research_report::parse_analysis(&query, &text);
            warn_if_sparse(&report);
            emit(&settings, report, save)
        }
        Commands::Fallback { input, query, save } => {
            let text = read_input(&input)?;
            let records: Vec<ContentRecord> =
                serde_json::from_str(&text).with_context(|| format!("decoding search hits from {}", input.display()))?;
            let report = research_report::synthesize_fallback(&query, &records);
            emit(&settings, report, save)
        }
        Commands::Normalize { input } => {
            let text = read_input(&input)?;
            let value: serde_json::Value =
                serde_json::from_str(&text).with_context(|| format!("decoding {}", input.display()))?;
            let sections = research_report::normalize_value(&value);
            println!("{}", serde_json::to_string_pretty(&sections)?);
            Ok(())
        }
        Commands::Batch { dir, save } => {
            let files = text_files(&dir)?;
            if files.is_empty() {
                println!("No .txt files in {}", dir.display());
                return Ok(());
            }
            println!("Parsing {} files...", files.len());
            let counts = batch(&settings, &files, save)?;
            counts.print();
            Ok(())
        }
        Commands::List { limit } => {
            let conn = open_archive(&settings)?;
            let rows = db::fetch_summaries(&conn, limit)?;
            if rows.is_empty() {
                println!("No reports archived.");
                return Ok(());
            }
            println!("{:>5} | {:<40} | {:<8} | {:<19}", "id", "Query", "Origin", "Created");
            println!("{}", "-".repeat(80));
            for r in &rows {
                println!("{:>5} | {:<40} | {:<8} | {:<19}", r.id, truncate(&r.query, 40), r.origin, r.created_at);
            }
            println!("\n{} reports", rows.len());
            Ok(())
        }
        Commands::Migrate => {
            let conn = open_archive(&settings)?;
            let stored = db::fetch_bodies(&conn)?;
            let mut migrated = 0;
            for row in &stored {
                let value: serde_json::Value = match serde_json::from_str(&row.body) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(id = row.id, error = %e, "skipping unreadable report body");
                        continue;
                    }
                };
                let report = research_report::import_report(&value);
                db::replace_body(&conn, row.id, &report)?;
                migrated += 1;
            }
            println!("Migrated {} of {} reports.", migrated, stored.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn open_archive(settings: &Settings) -> anyhow::Result<rusqlite::Connection> {
    let conn = db::connect(&settings.db_path).with_context(|| format!("opening {}", settings.db_path.display()))?;
    db::init_schema(&conn)?;
    Ok(conn)
}

fn emit(settings: &Settings, report: Report, save: bool) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&report)?);
    if save {
        let conn = open_archive(settings)?;
        db::save_reports(&conn, std::slice::from_ref(&report))?;
        info!(query = report.query(), "report archived");
    }
    Ok(())
}

fn warn_if_sparse(report: &Report) {
    let empty = report.empty_sections();
    if !empty.is_empty() {
        warn!(sections = ?empty, "analysis text left sections empty");
    }
}

fn text_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();
    Ok(files)
}

struct BatchCounts {
    reports: usize,
    sparse: usize,
    sources: usize,
    saved: usize,
}

impl BatchCounts {
    fn print(&self) {
        println!(
            "Parsed {} reports ({} with empty sections), {} sources, {} saved.",
            self.reports, self.sparse, self.sources, self.saved,
        );
    }
}

fn batch(settings: &Settings, files: &[PathBuf], save: bool) -> anyhow::Result<BatchCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let conn = if save { Some(open_archive(settings)?) } else { None };

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = BatchCounts {
        reports: 0,
        sparse: 0,
        sources: 0,
        saved: 0,
    };

    for chunk in files.chunks(settings.batch_chunk) {
        let results: Vec<_> = chunk.par_iter().map(|path| parse_file(path)).collect();

        let mut reports = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => warn!(error = %e, "skipping file"),
            }
        }

        for report in &reports {
            counts.reports += 1;
            counts.sources += report.source_analysis().len();
            if !report.empty_sections().is_empty() {
                counts.sparse += 1;
            }
        }
        if let Some(conn) = &conn {
            counts.saved += db::save_reports(conn, &reports)?;
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn parse_file(path: &Path) -> anyhow::Result<Report> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let query = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    Ok(research_report::parse_analysis(&query, &text))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_flags() {
        let cli = Cli::try_parse_from(["research_report", "parse", "-", "--query", "q", "--raw"]).unwrap();
        match cli.command {
            Commands::Parse { input, query, raw, save } => {
                assert_eq!(input, PathBuf::from("-"));
                assert_eq!(query, "q");
                assert!(raw);
                assert!(!save);
            }
            _ => panic!("expected parse"),
        }
    }

    #[test]
    fn help_is_answered_by_the_parser() {
        let err = Cli::try_parse_from(["research_report", "--help"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("ééé", 2), "éé...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
