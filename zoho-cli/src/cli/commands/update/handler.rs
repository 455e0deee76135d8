//! Update command handler

use anyhow::{Context, Result, bail};
use colored::*;
use dialoguer::Confirm;
use is_terminal::IsTerminal;
use std::collections::BTreeSet;
use std::time::Instant;

use super::UpdateArgs;
use crate::api::{
    AuthSession, BulkUpdater, ChunkObserver, UpdateRow, UpdateTarget, ViewFetchOptions,
    record_ids,
};
use crate::cli::AppContext;
use crate::cli::output::{self, ProgressPrinter};
use crate::input::{self, UpdateInput};

/// Label used in the failures file name for tables with several statuses
const MIXED_LABEL: &str = "mixed";

pub async fn handle_update_command(args: UpdateArgs, ctx: &AppContext) -> Result<()> {
    let settings = &ctx.settings;
    let target = UpdateTarget::new(
        args.module.clone().unwrap_or_else(|| settings.module.clone()),
        args.field.clone().unwrap_or_else(|| settings.field.clone()),
    );
    let catalog = settings.status_catalog();

    // Reject a bad --status before touching the network
    if let Some(status) = args.status.as_deref() {
        catalog.validate(std::iter::once(status))?;
    }

    // A view listing authenticates first; the update reuses that session
    let mut session = None;
    let input = if !args.ids.is_empty() {
        UpdateInput::Ids(input::parse_ids(&args.ids.join("\n")))
    } else if let Some(path) = &args.file {
        input::read_input_file(path)?
    } else if let Some(view_id) = &args.view {
        let view_session = authenticate(ctx).await?;
        let ids = fetch_view_ids(ctx, &view_session, &target.module, view_id).await?;
        session = Some(view_session);
        UpdateInput::Ids(ids)
    } else {
        bail!("Provide record ids with --ids, --file or --view");
    };

    let (rows, label) = rows_from_input(input, args.status.as_deref())?;
    if rows.is_empty() {
        eprintln!("{}", "No records to update.".yellow());
        return Ok(());
    }
    catalog.validate(rows.iter().map(|r| r.value.as_str()))?;

    eprintln!(
        "Updating {} record(s) in {} ({} -> {})",
        rows.len().to_string().bold(),
        target.module.cyan(),
        target.field.cyan(),
        label.bright_green().bold()
    );

    if !args.yes && std::io::stdin().is_terminal() {
        let proceed = Confirm::new()
            .with_prompt("Proceed?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !proceed {
            eprintln!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    let updater = BulkUpdater::new(&ctx.client, target, &catalog)
        .chunk_size(args.chunk_size.unwrap_or(settings.chunk_size));

    let start = Instant::now();
    let mut progress = ProgressPrinter;
    let observer = Some(&mut progress as &mut dyn ChunkObserver);
    let results = match &session {
        Some(session) => updater.run_with_session(session, &rows, observer).await,
        None => updater.run(&ctx.credentials, &rows, observer).await,
    }
    .context("Bulk update failed")?;
    eprintln!("Finished in {:.1}s", start.elapsed().as_secs_f64());

    output::report(&results, args.format, args.failures_out, &label)?;
    Ok(())
}

async fn authenticate(ctx: &AppContext) -> Result<AuthSession> {
    ctx.client
        .get_access_token(&ctx.credentials)
        .await
        .context("Failed to authenticate")
}

/// All unique record ids of a custom view
async fn fetch_view_ids(
    ctx: &AppContext,
    session: &AuthSession,
    module: &str,
    view_id: &str,
) -> Result<Vec<String>> {
    let options = ViewFetchOptions::all()
        .with_page_size(ctx.settings.page_size)
        .with_fields(vec!["id".to_string()]);
    let records = ctx
        .client
        .fetch_by_view(session, module, view_id, &options)
        .await
        .with_context(|| format!("Failed to fetch records of view {}", view_id))?;

    let ids: BTreeSet<String> = record_ids(&records).into_iter().collect();
    eprintln!(
        "Found {} record(s) in view {}",
        ids.len().to_string().bold(),
        view_id.cyan()
    );
    Ok(ids.into_iter().collect())
}

/// Turn parsed input into update rows, plus the status label for reporting
fn rows_from_input(input: UpdateInput, status: Option<&str>) -> Result<(Vec<UpdateRow>, String)> {
    match input {
        UpdateInput::Ids(ids) => {
            let Some(status) = status else {
                bail!("--status is required when updating a list of ids");
            };
            let status = status.trim();
            Ok((UpdateRow::many(ids, status), status.to_string()))
        }
        UpdateInput::Rows(rows) => {
            if status.is_some() {
                bail!("--status cannot be combined with an id/status table");
            }
            let values: BTreeSet<&str> = rows
                .iter()
                .map(|r| r.value.trim())
                .filter(|v| !v.is_empty())
                .collect();
            let label = match values.len() {
                1 => values.iter().next().map(|v| v.to_string()),
                _ => None,
            }
            .unwrap_or_else(|| MIXED_LABEL.to_string());
            Ok((rows, label))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_need_status() {
        let input = UpdateInput::Ids(vec!["1".to_string()]);
        assert!(rows_from_input(input.clone(), None).is_err());

        let (rows, label) = rows_from_input(input, Some(" Junk Lead ")).unwrap();
        assert_eq!(rows, vec![UpdateRow::new("1", "Junk Lead")]);
        assert_eq!(label, "Junk Lead");
    }

    #[test]
    fn test_table_rejects_status_flag() {
        let input = UpdateInput::Rows(vec![UpdateRow::new("1", "On Hold")]);
        assert!(rows_from_input(input, Some("Junk Lead")).is_err());
    }

    #[test]
    fn test_table_label() {
        let single = UpdateInput::Rows(vec![
            UpdateRow::new("1", "On Hold"),
            UpdateRow::new("2", "On Hold"),
            UpdateRow::new("3", ""),
        ]);
        assert_eq!(rows_from_input(single, None).unwrap().1, "On Hold");

        let mixed = UpdateInput::Rows(vec![
            UpdateRow::new("1", "On Hold"),
            UpdateRow::new("2", "Junk Lead"),
        ]);
        let (rows, label) = rows_from_input(mixed, None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(label, "mixed");
    }
}
