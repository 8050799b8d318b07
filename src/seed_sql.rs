//! SQL seed script generation from an enriched raion layer.

use tracing::{debug, info};

use crate::config::{EnrichConfig, SeedConfig};
use crate::models::BoundaryCollection;
use crate::resolve::{raion_name, string_property};

/// Generated script plus how many raions went in and how many were left out.
#[derive(Debug, Clone)]
pub struct SeedScript {
    pub sql: String,
    pub inserted: usize,
    pub skipped: usize,
}

/// Quote a value as an SQL string literal.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Build an `INSERT ... ON CONFLICT DO NOTHING` script linking each raion to
/// its parent row by name.
///
/// Raions without a name, without a parent, or whose parent is the unknown
/// label are skipped.
pub fn seed_script(raions: &BoundaryCollection, config: &EnrichConfig) -> SeedScript {
    let SeedConfig {
        raion_name_key,
        table,
        parent_table,
    } = &config.seed;

    let mut values = Vec::new();
    let mut skipped = 0;

    for (index, feature) in raions.features.iter().enumerate() {
        let Some(feature) = feature.as_object() else {
            debug!("Skipping feature {} that is not an object", index);
            skipped += 1;
            continue;
        };
        let parent = string_property(feature, &config.parent_key)
            .filter(|p| *p != config.unknown_label);

        match (raion_name(feature, raion_name_key), parent) {
            (Some(name), Some(parent)) => values.push(format!(
                "({}, (SELECT id FROM {} WHERE name = {}))",
                quote(&name),
                parent_table,
                quote(parent)
            )),
            _ => {
                debug!("Skipping raion {} without name or parent", index);
                skipped += 1;
            }
        }
    }

    let mut sql = String::from("-- Seed Raions\n");
    if !values.is_empty() {
        sql.push_str(&format!(
            "INSERT INTO {} (name, parent_region_id) VALUES\n",
            table
        ));
        sql.push_str(&values.join(",\n"));
        sql.push('\n');
        sql.push_str("ON CONFLICT (name, parent_region_id) DO NOTHING;");
    }

    info!(
        "Seed script covers {} raions ({} skipped)",
        values.len(),
        skipped
    );

    SeedScript {
        sql,
        inserted: values.len(),
        skipped,
    }
}
