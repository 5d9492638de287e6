//! Model catalog commands.
//!
//! Provides commands for listing a source's models and viewing details of
//! one record.

use std::io::IsTerminal;

use anyhow::{Result, bail};
use chrono::DateTime;
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use orrery_catalog::{
    CatalogController, CatalogQuery, Category, CredentialPrompt, Icon, ModelFlags, ModelRecord,
    SortKey,
};

use super::auth::KeyringPrompt;
use crate::catalog::{build_controller, credential_store, load_source};
use crate::config::{ConfigLoader, OrreryConfig};

/// Models arguments.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommands,
}

/// Models subcommands.
#[derive(Subcommand, Debug)]
pub enum ModelsCommands {
    /// List models from a source
    List {
        /// Source to load (mock, openai, anthropic, gemini)
        #[arg(long)]
        source: Option<String>,

        /// Keep models whose id, description or capabilities contain TEXT
        #[arg(long, short, value_name = "TEXT")]
        query: Option<String>,

        /// Only show one category
        #[arg(long)]
        category: Option<Category>,

        /// Sort order (name, name-desc, newest, oldest)
        #[arg(long)]
        sort: Option<SortKey>,

        /// Group by category
        #[arg(long)]
        grouped: bool,

        /// Print records as JSON
        #[arg(long, conflicts_with = "grouped")]
        json: bool,
    },
    /// Show detailed model information
    Info {
        /// Model id (e.g., gemini-2.5-pro, gpt-4o)
        model: String,

        /// Source to load
        #[arg(long)]
        source: Option<String>,
    },
}

/// Run models command.
pub async fn run(args: ModelsArgs) -> Result<()> {
    let config = ConfigLoader::load()?;

    match args.command {
        ModelsCommands::List {
            source,
            query,
            category,
            sort,
            grouped,
            json,
        } => {
            let controller = load(&config, source.as_deref()).await?;
            let query = CatalogQuery {
                text: query.unwrap_or_default(),
                category,
                sort: sort.unwrap_or(config.catalog.sort),
            };
            list_models(&controller, &query, grouped, json)
        }
        ModelsCommands::Info { model, source } => {
            let controller = load(&config, source.as_deref()).await?;
            show_model_info(&controller, &model)
        }
    }
}

/// Build a controller and load the requested (or configured default) source.
async fn load(config: &OrreryConfig, source: Option<&str>) -> Result<CatalogController> {
    let store = credential_store();
    let controller = build_controller(config, store.clone());
    let source_id = source.unwrap_or(&config.catalog.default_source);

    let prompt = KeyringPrompt::new(store);
    let prompt = std::io::stdin()
        .is_terminal()
        .then_some(&prompt as &dyn CredentialPrompt);

    load_source(&controller, source_id, prompt).await?;
    Ok(controller)
}

fn list_models(
    controller: &CatalogController,
    query: &CatalogQuery,
    grouped: bool,
    json: bool,
) -> Result<()> {
    let records = controller.records();

    if json {
        println!("{}", serde_json::to_string_pretty(&query.apply(&records))?);
        return Ok(());
    }

    if grouped {
        let groups = query.grouped(&records);
        if groups.is_empty() {
            print_empty(&records);
        }
        for (category, members) in groups {
            println!("{} ({})", category.label(), members.len());
            println!("{}", model_table(&members));
            println!();
        }
        return Ok(());
    }

    let models = query.apply(&records);
    if models.is_empty() {
        print_empty(&records);
    } else {
        println!("{}", model_table(&models));
    }
    Ok(())
}

fn print_empty(all: &[ModelRecord]) {
    if all.is_empty() {
        println!("The source returned no models.");
    } else {
        println!("No models match the specified filters.");
    }
}

fn model_table(models: &[ModelRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("").fg(Color::Cyan),
        Cell::new("Model").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Created").fg(Color::Cyan),
        Cell::new("Capabilities").fg(Color::Cyan),
    ]);

    for model in models {
        let mut id = model.id.clone();
        let flags = format_flags(&model.flags());
        if !flags.is_empty() {
            id = format!("{id} [{flags}]");
        }
        table.add_row(vec![
            Cell::new(icon_glyph(model.icon())),
            Cell::new(id),
            Cell::new(&model.display_name),
            Cell::new(model.category()),
            Cell::new(format_created(model.created_at)),
            Cell::new(model.capability_summary()),
        ]);
    }
    table
}

/// Show detailed information about a specific model.
fn show_model_info(controller: &CatalogController, model_id: &str) -> Result<()> {
    let records = controller.records();
    let model = records
        .iter()
        .find(|m| m.id == model_id)
        .or_else(|| records.iter().find(|m| m.id.eq_ignore_ascii_case(model_id)));

    let Some(model) = model else {
        bail!(
            "Model '{}' not found in source '{}'",
            model_id,
            controller.active_source_id()
        );
    };

    println!("{} {}", icon_glyph(model.icon()), model.display_name);
    println!("ID: {}", model.id);
    println!("Provider: {}", model.provider_id);
    println!("Owned by: {}", model.owned_by);
    println!("Category: {}", model.category());
    println!("Created: {}", format_created(model.created_at));
    let flags = format_flags(&model.flags());
    if !flags.is_empty() {
        println!("Status: {flags}");
    }
    println!();
    println!("{}", model.short_description);
    println!("{}", model.description);
    println!();
    println!("Input: {}", model.input_modalities.join(", "));
    println!("Output: {}", model.output_modalities.join(", "));
    println!("Capabilities: {}", model.capability_summary());

    Ok(())
}

fn icon_glyph(icon: Icon) -> &'static str {
    match icon {
        Icon::Star => "★",
        Icon::Sparkles => "✦",
        Icon::Eye => "◉",
        Icon::Vector => "⇶",
        Icon::Flask => "⚗",
        Icon::Radio => "◎",
        Icon::Cube => "▣",
    }
}

/// Format status flags as a comma-separated string.
fn format_flags(flags: &ModelFlags) -> String {
    let mut parts = Vec::new();

    if flags.is_preview {
        parts.push("preview");
    }
    if flags.is_experimental {
        parts.push("experimental");
    }
    if flags.is_live {
        parts.push("live");
    }

    parts.join(", ")
}

/// Format a unix timestamp as a calendar date.
fn format_created(unix_seconds: i64) -> String {
    DateTime::from_timestamp(unix_seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flags_multiple() {
        let flags = ModelFlags {
            is_preview: true,
            is_experimental: false,
            is_live: true,
        };
        assert_eq!(format_flags(&flags), "preview, live");
    }

    #[test]
    fn format_flags_empty() {
        assert_eq!(format_flags(&ModelFlags::default()), "");
    }

    #[test]
    fn format_created_as_date() {
        assert_eq!(format_created(1_742_860_800), "2025-03-25");
        assert_eq!(format_created(0), "1970-01-01");
        assert_eq!(format_created(i64::MAX), "-");
    }

    #[test]
    fn table_lists_every_model() {
        let rules = orrery_catalog::rules::CategoryRules::GENERIC;
        let models = vec![
            ModelRecord::builder("mock", "model-a").build(&rules),
            ModelRecord::builder("mock", "model-b-preview").build(&rules),
        ];

        let rendered = model_table(&models).to_string();
        assert!(rendered.contains("model-a"));
        assert!(rendered.contains("model-b-preview [preview]"));
    }
}
