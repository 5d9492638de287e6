//! List selectable catalog sources.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use orrery_catalog::{CatalogController, CatalogSource, ProviderRegistry};

use crate::catalog::{build_controller, credential_store};
use crate::config::ConfigLoader;

pub async fn run() -> Result<()> {
    let config = ConfigLoader::load()?;
    let controller = build_controller(&config, credential_store());
    let registry = ProviderRegistry::builtin();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Source").fg(Color::Cyan),
        Cell::new("Provider").fg(Color::Cyan),
        Cell::new("Credential").fg(Color::Cyan),
    ]);

    for row in source_rows(&controller, &registry) {
        let status = match row.credential {
            "missing" => Cell::new(row.credential).fg(Color::Yellow),
            _ => Cell::new(row.credential),
        };
        let id = if row.id == config.catalog.default_source {
            format!("{} (default)", row.id)
        } else {
            row.id
        };
        table.add_row(vec![Cell::new(id), Cell::new(row.provider), status]);
    }

    println!("{table}");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct SourceRow {
    id: String,
    provider: &'static str,
    credential: &'static str,
}

fn source_rows(controller: &CatalogController, registry: &ProviderRegistry) -> Vec<SourceRow> {
    controller
        .source_ids()
        .into_iter()
        .filter_map(|id| controller.source(id))
        .map(|source| SourceRow {
            id: source.id().to_string(),
            provider: registry
                .get(source.provider_id())
                .map(|p| p.name)
                .unwrap_or("Unknown"),
            credential: if !source.requires_credential() {
                "not required"
            } else if source.credential_ready() {
                "ready"
            } else {
                "missing"
            },
        })
        .collect()
}
