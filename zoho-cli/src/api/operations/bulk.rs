//! Chunked bulk updates
//!
//! Rows are validated against the status catalog, split into ordered chunks
//! and written one chunk at a time. Every submitted row yields exactly one
//! `UpdateResult`, in input order, whatever the API answers.

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::Value;

use super::operation::{UpdateResult, UpdateRow, UpdateTarget};
use crate::api::client::{ZohoClient, read_json};
use crate::api::constants::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::api::error::ApiError;
use crate::api::models::{AuthSession, CredentialSet};
use crate::api::resilience::ApiLogger;
use crate::config::StatusCatalog;

/// Progress notification sent after each chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkProgress {
    /// 1-based index of the chunk just completed
    pub index: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Receives a notification after every chunk, inline on the updating task.
///
/// Errors are logged and otherwise ignored.
pub trait ChunkObserver {
    fn on_chunk_done(&mut self, progress: &ChunkProgress) -> anyhow::Result<()>;
}

impl<F> ChunkObserver for F
where
    F: FnMut(&ChunkProgress) -> anyhow::Result<()>,
{
    fn on_chunk_done(&mut self, progress: &ChunkProgress) -> anyhow::Result<()> {
        self(progress)
    }
}

/// Number of chunks `len` rows split into
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    len.div_ceil(chunk_size.max(1))
}

/// Ordered, non-overlapping chunks of at most `chunk_size` rows
pub fn partition<T>(rows: &[T], chunk_size: usize) -> std::slice::Chunks<'_, T> {
    rows.chunks(chunk_size.max(1))
}

/// Match response entries to the submitted rows.
///
/// Output has one result per submitted row, in submission order. Ids are
/// matched as a multiset so duplicated input ids keep one result each.
/// Entries for ids that were never submitted are dropped with a warning.
///
/// An entry without an id is attributed to the row submitted at the same
/// position, unless that row is already reported by an entry that names it.
/// Entries that cannot be attributed still lend their error code to the
/// rows synthesized as missing.
pub fn reconcile(submitted: &[&UpdateRow], entries: &[Value], logger: &ApiLogger) -> Vec<UpdateResult> {
    let mut parsed = Vec::with_capacity(entries.len());
    let mut anonymous = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        match UpdateResult::from_response_entry(entry, None) {
            Some(result) => parsed.push(result),
            None => anonymous.push(i),
        }
    }

    let mut claimed: HashSet<String> = parsed.iter().map(|r| r.id.clone()).collect();
    let mut orphan_code = None;
    for i in anonymous {
        let entry = &entries[i];
        let positional = submitted
            .get(i)
            .map(|row| row.id.trim())
            .filter(|id| !claimed.contains(*id));
        match positional.and_then(|id| UpdateResult::from_response_entry(entry, Some(id))) {
            Some(result) => {
                claimed.insert(result.id.clone());
                parsed.push(result);
            }
            None => {
                let code = entry.get("code").and_then(Value::as_str);
                logger.warn(&format!(
                    "Result entry #{} names no record and cannot be matched by position (code {})",
                    i + 1,
                    code.unwrap_or("none")
                ));
                if orphan_code.is_none() && !is_success_entry(entry) {
                    orphan_code = code.map(str::to_string);
                }
            }
        }
    }

    let chunk_error_code = parsed
        .iter()
        .find(|r| r.is_error())
        .and_then(|r| r.code.clone())
        .or(orphan_code);

    let mut by_id: HashMap<String, VecDeque<UpdateResult>> = HashMap::new();
    for result in parsed {
        by_id.entry(result.id.clone()).or_default().push_back(result);
    }

    let mut results = Vec::with_capacity(submitted.len());
    let mut missing = 0usize;
    for row in submitted {
        let id = row.id.trim();
        match by_id.get_mut(id).and_then(VecDeque::pop_front) {
            Some(result) => results.push(result),
            None => {
                missing += 1;
                results.push(UpdateResult::missing(id, chunk_error_code.as_deref()));
            }
        }
    }

    if missing > 0 {
        logger.warn(&format!("{} submitted record(s) missing from the response", missing));
    }
    let unexpected: usize = by_id.values().map(VecDeque::len).sum();
    if unexpected > 0 {
        logger.warn(&format!(
            "Discarding {} result(s) for ids that were not submitted",
            unexpected
        ));
    }

    results
}

/// Runs a bulk update for one target field
pub struct BulkUpdater<'a> {
    client: &'a ZohoClient,
    target: UpdateTarget,
    catalog: &'a StatusCatalog,
    chunk_size: usize,
}

impl<'a> BulkUpdater<'a> {
    pub fn new(client: &'a ZohoClient, target: UpdateTarget, catalog: &'a StatusCatalog) -> Self {
        Self {
            client,
            target,
            catalog,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Rows per write request, clamped to 1..=100
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        let clamped = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        if clamped != chunk_size {
            log::warn!("Chunk size {} out of range, using {}", chunk_size, clamped);
        }
        self.chunk_size = clamped;
        self
    }

    /// Validate, authenticate once, then write every chunk in order.
    ///
    /// Fails before any request if a value is outside the status catalog.
    /// Once the token is obtained, per-chunk failures are reported as error
    /// results and never abort the run.
    pub async fn run(
        &self,
        credentials: &CredentialSet,
        rows: &[UpdateRow],
        observer: Option<&mut dyn ChunkObserver>,
    ) -> Result<Vec<UpdateResult>, ApiError> {
        self.catalog.validate(rows.iter().map(|r| r.value.as_str()))?;

        let logger = ApiLogger::new(credentials.secrets());
        let session = self.client.authenticate(credentials, &logger).await?;
        let logger = logger.with_secrets(session.secrets().clone());

        Ok(self.update_all(&session, &logger, rows, observer).await)
    }

    /// Like [`BulkUpdater::run`], reusing a session obtained earlier in the
    /// same command instead of exchanging the refresh token again
    pub async fn run_with_session(
        &self,
        session: &AuthSession,
        rows: &[UpdateRow],
        observer: Option<&mut dyn ChunkObserver>,
    ) -> Result<Vec<UpdateResult>, ApiError> {
        self.catalog.validate(rows.iter().map(|r| r.value.as_str()))?;
        let logger = ApiLogger::new(session.secrets().clone());
        Ok(self.update_all(session, &logger, rows, observer).await)
    }

    async fn update_all(
        &self,
        session: &AuthSession,
        logger: &ApiLogger,
        rows: &[UpdateRow],
        mut observer: Option<&mut dyn ChunkObserver>,
    ) -> Vec<UpdateResult> {
        let total = chunk_count(rows.len(), self.chunk_size);
        logger.info(&format!(
            "Processing {} row(s) in {} chunk(s) of {} for {}.{}",
            rows.len(),
            total,
            self.chunk_size,
            self.target.module,
            self.target.field
        ));

        let mut results = Vec::with_capacity(rows.len());
        for (i, chunk) in partition(rows, self.chunk_size).enumerate() {
            let index = i + 1;
            logger.info(&format!("Updating chunk {}/{} ({} row(s))", index, total, chunk.len()));

            let chunk_results = self.run_chunk(session, logger, chunk).await;
            let failed = chunk_results.iter().filter(|r| r.is_error()).count();
            let progress = ChunkProgress {
                index,
                total,
                succeeded: chunk_results.len() - failed,
                failed,
            };
            results.extend(chunk_results);

            if let Some(observer) = observer.as_deref_mut() {
                if let Err(e) = observer.on_chunk_done(&progress) {
                    logger.warn(&format!("Progress observer failed after chunk {}: {}", index, e));
                }
            }
        }

        let failed = results.iter().filter(|r| r.is_error()).count();
        logger.info(&format!(
            "Bulk update complete: {} succeeded, {} failed",
            results.len() - failed,
            failed
        ));
        results
    }

    /// Results for one chunk, in row order. Malformed rows never reach the API.
    async fn run_chunk(
        &self,
        session: &AuthSession,
        logger: &ApiLogger,
        chunk: &[UpdateRow],
    ) -> Vec<UpdateResult> {
        let sendable: Vec<&UpdateRow> = chunk.iter().filter(|r| r.is_well_formed()).collect();
        if sendable.len() < chunk.len() {
            logger.warn(&format!(
                "{} row(s) missing id or status, not sent",
                chunk.len() - sendable.len()
            ));
        }

        let sent = if sendable.is_empty() {
            Vec::new()
        } else {
            self.update_chunk(session, logger, &sendable).await
        };

        let mut sent = sent.into_iter();
        chunk
            .iter()
            .map(|row| {
                if !row.is_well_formed() {
                    return UpdateResult::invalid_row(row);
                }
                sent.next()
                    .unwrap_or_else(|| UpdateResult::missing(row.id.trim(), None))
            })
            .collect()
    }

    /// One write request. Whole-chunk failures become one error per row.
    async fn update_chunk(
        &self,
        session: &AuthSession,
        logger: &ApiLogger,
        rows: &[&UpdateRow],
    ) -> Vec<UpdateResult> {
        let body = self.target.request_body(rows);
        let label = format!("update of {} {} record(s)", rows.len(), self.target.module);

        let response = self
            .client
            .put_json(session, logger, &label, &self.target.module, &body)
            .await;

        let error = match response {
            Ok(response) => match read_json(response, logger).await {
                Ok(payload) => return reconcile(rows, data_entries(&payload), logger),
                Err(e) => e,
            },
            Err(e) => e,
        };

        // Zoho rejects a request whose records all fail validation with a
        // 4xx that still lists per-record outcomes
        if let ApiError::Remote { body, .. } = &error {
            if let Ok(payload) = serde_json::from_str::<Value>(body) {
                let entries = data_entries(&payload);
                if !entries.is_empty() {
                    return reconcile(rows, entries, logger);
                }
            }
        }

        logger.error(&format!("Chunk failed: {}", error));
        rows.iter()
            .map(|row| UpdateResult::from_chunk_error(row.id.trim(), &error))
            .collect()
    }
}

fn is_success_entry(entry: &Value) -> bool {
    entry
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("success"))
}

fn data_entries(payload: &Value) -> &[Value] {
    payload
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
