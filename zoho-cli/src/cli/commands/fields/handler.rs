//! Fields command handler

use anyhow::{Context, Result};
use colored::*;

use super::FieldsArgs;
use crate::api::{FieldMetadata, FieldType};
use crate::cli::AppContext;

pub async fn handle_fields_command(args: FieldsArgs, ctx: &AppContext) -> Result<()> {
    let module = args.module.clone().unwrap_or_else(|| ctx.settings.module.clone());

    let session = ctx
        .client
        .get_access_token(&ctx.credentials)
        .await
        .context("Failed to authenticate")?;
    let mut fields = ctx
        .client
        .fetch_fields(&session, &module)
        .await
        .with_context(|| format!("Failed to fetch fields of {}", module))?;

    if args.picklists {
        fields.retain(|f| f.data_type == FieldType::Picklist);
    }
    fields.sort_by(|a, b| a.api_name.cmp(&b.api_name));

    if args.json {
        let json = serde_json::to_string_pretty(&fields).context("Failed to serialize fields")?;
        println!("{}", json);
    } else {
        println!("{}", module.bright_green().bold());
        print!("{}", format_fields(&fields));
        eprintln!("{} field(s)", fields.len().to_string().bold());
    }

    Ok(())
}

fn format_fields(fields: &[FieldMetadata]) -> String {
    let name_width = fields
        .iter()
        .map(|f| f.api_name.len())
        .max()
        .unwrap_or(0)
        .max("API NAME".len());
    let label_width = fields
        .iter()
        .map(|f| f.label.chars().count())
        .max()
        .unwrap_or(0)
        .max("LABEL".len());

    let mut out = format!(
        "{:<name_width$}  {:<label_width$}  {}\n",
        "API NAME", "LABEL", "TYPE"
    );
    for field in fields {
        let kind = match field.pick_list_values.len() {
            0 => field.data_type.to_string(),
            n => format!("{} ({} values)", field.data_type, n),
        };
        out.push_str(&format!(
            "{:<name_width$}  {:<label_width$}  {}\n",
            field.api_name, field.label, kind
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::metadata::PickListValue;

    #[test]
    fn test_format_fields() {
        let fields = vec![
            FieldMetadata {
                api_name: "Lead_Status".to_string(),
                label: "Lead Status".to_string(),
                data_type: FieldType::Picklist,
                read_only: false,
                pick_list_values: vec![PickListValue {
                    display_value: "On Hold".to_string(),
                    actual_value: None,
                }],
            },
            FieldMetadata {
                api_name: "Email".to_string(),
                label: "Email".to_string(),
                data_type: FieldType::Email,
                read_only: false,
                pick_list_values: Vec::new(),
            },
        ];

        let out = format_fields(&fields);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("API NAME"));
        assert!(lines[1].contains("picklist (1 values)"));
        assert!(lines[2].ends_with("email"));
    }
}
