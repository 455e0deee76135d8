//! Statuses command handler

use anyhow::{Context, Result, bail};
use colored::*;

use super::StatusesArgs;
use crate::api::find_field;
use crate::cli::AppContext;
use crate::config::StatusCatalog;

pub async fn handle_statuses_command(args: StatusesArgs, ctx: &AppContext) -> Result<()> {
    let catalog = ctx.settings.status_catalog();

    if !args.remote {
        for value in catalog.values() {
            println!("{}", value);
        }
        return Ok(());
    }

    let module = args.module.clone().unwrap_or_else(|| ctx.settings.module.clone());
    let field = args.field.clone().unwrap_or_else(|| ctx.settings.field.clone());

    let session = ctx
        .client
        .get_access_token(&ctx.credentials)
        .await
        .context("Failed to authenticate")?;
    let fields = ctx
        .client
        .fetch_fields(&session, &module)
        .await
        .with_context(|| format!("Failed to fetch fields of {}", module))?;

    let Some(meta) = find_field(&fields, &field) else {
        bail!("Field {} not found (or read-only) in {}", field, module);
    };
    if meta.pick_list_values.is_empty() {
        bail!("Field {} in {} has no picklist values", meta.api_name, module);
    }

    let remote: Vec<String> = meta
        .pick_list_values
        .iter()
        .map(|v| v.value().to_string())
        .collect();
    let comparison = compare(&catalog, &remote);

    println!("{}.{}", module.bright_green().bold(), meta.api_name.cyan());
    for value in &remote {
        if catalog.contains(value) {
            println!("  {} {}", "✓".green(), value);
        } else {
            println!("  {} {} {}", "+".yellow(), value, "(not in catalog)".dimmed());
        }
    }
    for value in &comparison.local_only {
        println!("  {} {} {}", "✗".red(), value, "(catalog only)".dimmed());
    }

    if !comparison.remote_only.is_empty() {
        eprintln!(
            "{} picklist value(s) are not in the catalog and cannot be used as targets",
            comparison.remote_only.len()
        );
    }
    if !comparison.local_only.is_empty() {
        eprintln!(
            "{} {} catalog value(s) are not valid picklist options; updates to them will fail",
            "!".yellow().bold(),
            comparison.local_only.len()
        );
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct Comparison {
    remote_only: Vec<String>,
    local_only: Vec<String>,
}

fn compare(catalog: &StatusCatalog, remote: &[String]) -> Comparison {
    let remote_only = remote
        .iter()
        .filter(|v| !catalog.contains(v))
        .cloned()
        .collect();
    let local_only = catalog
        .values()
        .iter()
        .filter(|v| !remote.iter().any(|r| r.trim() == v.as_str()))
        .cloned()
        .collect();
    Comparison {
        remote_only,
        local_only,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_catalog_with_picklist() {
        let catalog = StatusCatalog::new(["On Hold".to_string(), "Junk Lead".to_string()]);
        let remote = vec!["On Hold".to_string(), "Contacted".to_string()];

        let comparison = compare(&catalog, &remote);
        assert_eq!(comparison.remote_only, vec!["Contacted"]);
        assert_eq!(comparison.local_only, vec!["Junk Lead"]);
    }
}
