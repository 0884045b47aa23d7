use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const REPORT_FILE_NAME: &str = "column_map_validation.json";

/// Findings for one year of the column map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearReport {
    pub actual_column_count: usize,
    /// Margin-of-error columns with no estimate sharing their descriptor.
    pub moe_only: Vec<String>,
    pub estimate_count: usize,
    pub moe_count: usize,
    /// dcid -> columns, only for dcids used by more than one column.
    pub repeated_dcids: IndexMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dcid_missing_in_year: Option<Vec<String>>,
    /// Only filled in when `dcid_missing_in_year` is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_unique_dcid: Option<Vec<String>>,
}

/// Column coverage over the union of all years.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub same_dcid_different_statvar: Vec<String>,
    pub years: IndexMap<String, YearReport>,
    pub all: UnionReport,
    pub dcid_series_holes: IndexMap<String, Vec<String>>,
    /// dcid -> years it appears in. Used for the holes check, not written out.
    pub dcid_year_list: IndexMap<String, Vec<String>>,
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.years.len() + 3))?;
        map.serialize_entry(
            "same_dcid_different_statvar",
            &self.same_dcid_different_statvar,
        )?;
        for (year, year_report) in &self.years {
            map.serialize_entry(year, year_report)?;
        }
        map.serialize_entry("all", &self.all)?;
        map.serialize_entry("dcid_series_holes", &self.dcid_series_holes)?;
        map.end()
    }
}

impl Report {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize validation report")
    }
}

/// Writes the report into `output_dir`, creating the directory when needed.
pub fn write_report(report: &Report, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let path = output_dir.join(REPORT_FILE_NAME);
    let json = report.to_json()?;
    fs::write(&path, json).with_context(|| format!("Failed to write report to {:?}", path))?;

    info!(action = "write", component = "report", path = ?path, "Validation report written");
    Ok(path)
}
