use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key of the synthetic entry in the column list holding the union of all years.
pub const ALL_YEARS_KEY: &str = "all";

const MARGIN_OF_ERROR_MARKER: &str = "marginOfError";

/// A single column's StatVar assignment as produced by the data loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    #[serde(rename = "Node")]
    pub node: String,
    #[serde(rename = "statType")]
    pub stat_type: String,
    /// Every other property of the StatVar (measuredProperty, unit, constraints...).
    #[serde(flatten)]
    pub properties: BTreeMap<String, Value>,
}

impl VariableRecord {
    pub fn is_margin_of_error(&self) -> bool {
        self.stat_type.contains(MARGIN_OF_ERROR_MARKER)
    }

    /// The record with its destination and statistic type stripped; an
    /// estimate and its margin of error share the same descriptor.
    pub fn descriptor(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }
}

/// year -> column name -> record, in the order the loader wrote them
pub type ColumnMap = IndexMap<String, IndexMap<String, VariableRecord>>;

/// Expected columns per year, along with the union over every year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedColumns {
    pub by_year: IndexMap<String, Vec<String>>,
    pub all: Vec<String>,
}

impl ExpectedColumns {
    /// Splits a raw `{year: [column, ...], "all": [...]}` listing. Returns the
    /// expected columns and whether the union had to be derived because the
    /// listing carried no `all` entry.
    pub fn from_listing(mut listing: IndexMap<String, Vec<String>>) -> (Self, bool) {
        match listing.shift_remove(ALL_YEARS_KEY) {
            Some(all) => (
                Self {
                    by_year: listing,
                    all,
                },
                false,
            ),
            None => {
                let mut all: Vec<String> = Vec::new();
                for column in listing.values().flatten() {
                    if !all.contains(column) {
                        all.push(column.clone());
                    }
                }
                (
                    Self {
                        by_year: listing,
                        all,
                    },
                    true,
                )
            }
        }
    }

    pub fn for_year(&self, year: &str) -> Option<&[String]> {
        self.by_year.get(year).map(Vec::as_slice)
    }

    /// Applies `keep` to every year's list and to the union, preserving order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        for columns in self.by_year.values_mut() {
            columns.retain(|column| keep(column));
        }
        self.all.retain(|column| keep(column));
    }
}
