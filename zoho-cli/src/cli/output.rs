//! Result presentation: table, JSON, summary and failures export

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::api::{ChunkObserver, ChunkProgress, UpdateResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Success/failure counts of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_results(results: &[UpdateResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    pub fn print(&self) {
        eprintln!();
        eprintln!(
            "{} {}  {} {}  {} {}",
            "Total:".bold(),
            self.total,
            "Succeeded:".green().bold(),
            self.succeeded.to_string().green(),
            "Failed:".red().bold(),
            if self.failed > 0 {
                self.failed.to_string().red()
            } else {
                self.failed.to_string().normal()
            }
        );
    }
}

/// Prints one line per finished chunk
#[derive(Debug, Default)]
pub struct ProgressPrinter;

impl ChunkObserver for ProgressPrinter {
    fn on_chunk_done(&mut self, progress: &ChunkProgress) -> Result<()> {
        let pct = progress.index * 100 / progress.total.max(1);
        eprintln!(
            "  [{}/{}] {:>3}%  {} ok, {} failed",
            progress.index,
            progress.total,
            pct,
            progress.succeeded.to_string().green(),
            if progress.failed > 0 {
                progress.failed.to_string().red()
            } else {
                progress.failed.to_string().dimmed()
            }
        );
        Ok(())
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Render results as an aligned table, in input order
pub fn format_results_table(results: &[UpdateResult]) -> String {
    let id_width = results
        .iter()
        .map(|r| r.id.len())
        .max()
        .unwrap_or(0)
        .max("ID".len());
    let code_width = results
        .iter()
        .map(|r| r.code.as_deref().unwrap_or("").len())
        .max()
        .unwrap_or(0)
        .max("CODE".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:<id_width$}  {:<7}  {:<code_width$}  {}\n",
        "ID", "STATUS", "CODE", "MESSAGE"
    ));

    for result in results {
        let status = format!("{:<7}", result.status.to_string());
        let status = if result.is_success() {
            status.green()
        } else {
            status.red()
        };
        out.push_str(&format!(
            "{:<id_width$}  {}  {:<code_width$}  {}\n",
            result.id,
            status,
            result.code.as_deref().unwrap_or(""),
            truncate(&result.message, 80)
        ));
    }
    out
}

pub fn format_results_json(results: &[UpdateResult]) -> Result<String> {
    serde_json::to_string_pretty(results).context("Failed to serialize results")
}

/// `failed_zoho_updates_{status}_{YYYYmmdd_HHMMSS}_UTC.csv`, spaces in the
/// status replaced by underscores
pub fn failures_file_name(status: &str, now: DateTime<Utc>) -> String {
    format!(
        "failed_zoho_updates_{}_{}_UTC.csv",
        status.trim().replace(' ', "_"),
        now.format("%Y%m%d_%H%M%S")
    )
}

#[derive(Serialize)]
struct FailureRow<'a> {
    id: &'a str,
    status: String,
    code: &'a str,
    message: &'a str,
}

/// Write only the failed results to `path` as `id,status,code,message`.
///
/// Returns the number of rows written; no file is created when nothing failed.
pub fn write_failures_csv(path: &Path, results: &[UpdateResult]) -> Result<usize> {
    let failures: Vec<&UpdateResult> = results.iter().filter(|r| r.is_error()).collect();
    if failures.is_empty() {
        return Ok(0);
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create failures file: {}", path.display()))?;
    for result in &failures {
        writer
            .serialize(FailureRow {
                id: &result.id,
                status: result.status.to_string(),
                code: result.code.as_deref().unwrap_or(""),
                message: &result.message,
            })
            .with_context(|| format!("Failed to write failures file: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write failures file: {}", path.display()))?;

    Ok(failures.len())
}

/// Print results to stdout in the chosen format; the summary and the failures
/// export notice go to stderr so JSON output stays parseable
pub fn report(
    results: &[UpdateResult],
    format: OutputFormat,
    failures_out: Option<PathBuf>,
    status_label: &str,
) -> Result<Summary> {
    match format {
        OutputFormat::Table => print!("{}", format_results_table(results)),
        OutputFormat::Json => println!("{}", format_results_json(results)?),
    }

    let summary = Summary::from_results(results);
    summary.print();

    if summary.failed > 0 {
        let path = failures_out
            .unwrap_or_else(|| PathBuf::from(failures_file_name(status_label, Utc::now())));
        let written = write_failures_csv(&path, results)?;
        eprintln!(
            "{} {} failed record(s) written to {}",
            "!".yellow().bold(),
            written,
            path.display().to_string().cyan()
        );
    } else if summary.succeeded > 0 {
        eprintln!("{}", "All records updated successfully!".green().bold());
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Vec<UpdateResult> {
        vec![
            UpdateResult::success("101", "record updated", None),
            UpdateResult::error("102", "INVALID_DATA", "the id given seems to be invalid", None),
            UpdateResult::error("103", "FAILED_RETRIES", "gave up, \"quoted\"", None),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let summary = Summary::from_results(&sample());
        assert_eq!(
            summary,
            Summary {
                total: 3,
                succeeded: 1,
                failed: 2
            }
        );
    }

    #[test]
    fn test_failures_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            failures_file_name("Junk Lead", now),
            "failed_zoho_updates_Junk_Lead_20240309_140507_UTC.csv"
        );
    }

    #[test]
    fn test_write_failures_csv_only_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.csv");

        let written = write_failures_csv(&path, &sample()).unwrap();
        assert_eq!(written, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["id", "status", "code", "message"]);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "102");
        assert_eq!(&rows[0][1], "error");
        assert_eq!(&rows[1][2], "FAILED_RETRIES");
        assert_eq!(&rows[1][3], "gave up, \"quoted\"");
    }

    #[test]
    fn test_no_failures_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.csv");
        let ok = vec![UpdateResult::success("1", "record updated", None)];

        assert_eq!(write_failures_csv(&path, &ok).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_table_keeps_input_order() {
        colored::control::set_override(false);
        let table = format_results_table(&sample());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].starts_with("101"));
        assert!(lines[3].starts_with("103"));
        assert!(lines[2].contains("INVALID_DATA"));
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&format_results_json(&sample()).unwrap()).unwrap();
        assert_eq!(json[0]["status"], "success");
        assert_eq!(json[1]["code"], "INVALID_DATA");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
