use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::ignore::ImportSpec;
use crate::record::{ColumnMap, ExpectedColumns};

fn read_json<T: DeserializeOwned>(path: &Path, component: &str) -> Result<T> {
    let start_time = Instant::now();
    info!(action = "start", component = component, path = ?path, "Reading input file");

    if !path.exists() {
        anyhow::bail!("Input file not found: {:?}", path);
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {:?} as {}", path, component))?;

    info!(
        action = "complete",
        component = component,
        bytes = content.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Input file parsed"
    );
    Ok(value)
}

pub fn load_column_map(path: &Path) -> Result<ColumnMap> {
    let column_map: ColumnMap = read_json(path, "column_map")?;
    info!(
        action = "loaded",
        component = "column_map",
        year_count = column_map.len(),
        column_count = column_map.values().map(|columns| columns.len()).sum::<usize>(),
        "Loaded column map"
    );
    Ok(column_map)
}

pub fn load_expected_columns(path: &Path) -> Result<ExpectedColumns> {
    let listing: IndexMap<String, Vec<String>> = read_json(path, "column_list")?;
    let (expected, derived_union) = ExpectedColumns::from_listing(listing);

    if derived_union {
        warn!(
            action = "derive",
            component = "column_list",
            path = ?path,
            "Column list has no 'all' entry, using the union of every year"
        );
    }
    info!(
        action = "loaded",
        component = "column_list",
        year_count = expected.by_year.len(),
        union_count = expected.all.len(),
        "Loaded expected columns"
    );
    Ok(expected)
}

pub fn load_spec(path: &Path) -> Result<ImportSpec> {
    let spec: ImportSpec = read_json(path, "import_spec")?;
    info!(
        action = "loaded",
        component = "import_spec",
        ignore_rule_count = spec.ignore_columns.len(),
        "Loaded import spec"
    );
    Ok(spec)
}
