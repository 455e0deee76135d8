//! Update input parsing
//!
//! Two formats are accepted:
//! - newline-delimited record ids (non-numeric lines are ignored)
//! - a CSV table with `id` and `status` columns (header match is
//!   case-insensitive) for batches where each record gets its own status

use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::api::UpdateRow;

/// Parsed contents of an input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateInput {
    /// Ids that all receive the same status
    Ids(Vec<String>),
    /// Rows carrying their own status
    Rows(Vec<UpdateRow>),
}

impl UpdateInput {
    pub fn len(&self) -> usize {
        match self {
            UpdateInput::Ids(ids) => ids.len(),
            UpdateInput::Rows(rows) => rows.len(),
        }
    }
}

fn is_record_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Extract unique numeric ids, one per line, sorted.
///
/// Blank lines are skipped; any other non-numeric line (headers, notes) is
/// ignored with a warning.
pub fn parse_ids(text: &str) -> Vec<String> {
    let mut ids = BTreeSet::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if is_record_id(trimmed) {
            ids.insert(trimmed.to_string());
        } else if !trimmed.is_empty() {
            log::warn!("Ignoring non-numeric line: {:?}", trimmed);
        }
    }
    ids.into_iter().collect()
}

/// Column positions of `id` and `status` in a header row
fn find_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> Option<(usize, usize)> {
    let mut id = None;
    let mut status = None;
    for (i, header) in headers.into_iter().enumerate() {
        let header = header.trim().trim_start_matches('\u{feff}');
        if header.eq_ignore_ascii_case("id") && id.is_none() {
            id = Some(i);
        } else if header.eq_ignore_ascii_case("status") && status.is_none() {
            status = Some(i);
        }
    }
    Some((id?, status?))
}

/// Whether the first non-blank line is an `id,status` table header
pub fn is_status_table(text: &str) -> bool {
    let Some(first) = text.lines().find(|l| !l.trim().is_empty()) else {
        return false;
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(first.as_bytes());
    match reader.records().next() {
        Some(Ok(record)) => find_columns(record.iter()).is_some(),
        _ => false,
    }
}

/// Parse an `id,status` CSV table into rows, preserving order.
///
/// Blank ids or statuses are kept (they are reported per record later);
/// non-numeric ids fail the whole table.
pub fn parse_status_table(text: &str) -> Result<Vec<UpdateRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let Some((id_col, status_col)) = find_columns(headers.iter()) else {
        bail!("CSV header must contain 'id' and 'status' columns");
    };

    let mut rows = Vec::new();
    let mut bad_lines = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", i + 2))?;
        let id = record.get(id_col).unwrap_or("").trim();
        let status = record.get(status_col).unwrap_or("").trim();

        if id.is_empty() && status.is_empty() {
            continue;
        }
        if !id.is_empty() && !is_record_id(id) {
            bad_lines.push(format!("line {}: {:?}", i + 2, id));
            continue;
        }
        rows.push(UpdateRow::new(id, status));
    }

    if !bad_lines.is_empty() {
        bail!("Invalid record id(s): {}", bad_lines.join(", "));
    }
    Ok(rows)
}

/// Parse input text, detecting the format from its first line
pub fn parse_input(text: &str) -> Result<UpdateInput> {
    if is_status_table(text) {
        parse_status_table(text).map(UpdateInput::Rows)
    } else {
        Ok(UpdateInput::Ids(parse_ids(text)))
    }
}

/// Read and parse an input file
pub fn read_input_file(path: &Path) -> Result<UpdateInput> {
    if !path.exists() {
        bail!("Input file does not exist: {}", path.display());
    }
    let bytes = fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("Input file is not valid UTF-8: {}", path.display()))?;

    let input = parse_input(&text)
        .with_context(|| format!("Failed to parse input file: {}", path.display()))?;
    log::info!("Loaded {} entries from {}", input.len(), path.display());
    Ok(input)
}
