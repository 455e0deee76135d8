//! View command handler

use anyhow::{Context, Result};
use colored::*;
use serde_json::Value;
use std::fs;

use super::ViewArgs;
use crate::api::{ViewFetchOptions, record_ids};
use crate::cli::AppContext;

pub async fn handle_view_command(args: ViewArgs, ctx: &AppContext) -> Result<()> {
    let module = args.module.clone().unwrap_or_else(|| ctx.settings.module.clone());

    let session = ctx
        .client
        .get_access_token(&ctx.credentials)
        .await
        .context("Failed to authenticate")?;

    let options = ViewFetchOptions {
        fetch_all: args.all,
        page_size: args.page_size.unwrap_or(ctx.settings.page_size),
        fields: args.fields.clone(),
    };
    let records = ctx
        .client
        .fetch_by_view(&session, &module, &args.view_id, &options)
        .await
        .with_context(|| format!("Failed to fetch records of view {}", args.view_id))?;

    let formatted = format_records(&records, args.ids_only)?;

    if let Some(path) = &args.output {
        fs::write(path, &formatted)
            .with_context(|| format!("Failed to write output to: {}", path.display()))?;
        eprintln!(
            "{} {} record(s) written to {}",
            "✓".green(),
            records.len(),
            path.display().to_string().cyan()
        );
    } else {
        println!("{}", formatted);
        eprintln!("{} record(s)", records.len().to_string().bold());
    }

    Ok(())
}

fn format_records(records: &[Value], ids_only: bool) -> Result<String> {
    if ids_only {
        Ok(record_ids(records).join("\n"))
    } else {
        serde_json::to_string_pretty(records).context("Failed to serialize records")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_ids_only() {
        let records = vec![json!({"id": "1"}), json!({"id": 2}), json!({"Last_Name": "x"})];
        assert_eq!(format_records(&records, true).unwrap(), "1\n2");
    }

    #[test]
    fn test_format_json() {
        let records = vec![json!({"id": "1", "Lead_Status": "On Hold"})];
        let out: Value = serde_json::from_str(&format_records(&records, false).unwrap()).unwrap();
        assert_eq!(out[0]["Lead_Status"], "On Hold");
    }
}
