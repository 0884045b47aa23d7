use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Import configuration shared with the data loader. Only the ignore rules
/// matter here; the rest of the document is carried along untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportSpec {
    #[serde(rename = "ignoreColumns", default)]
    pub ignore_columns: Vec<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl ImportSpec {
    /// A rule spanning several tokens matches a full column name or a
    /// leading run of its tokens. A single token rule has to equal one of the
    /// column's tokens.
    pub fn ignores(&self, column_name: &str, delimiter: &str) -> bool {
        self.ignore_columns.iter().any(|rule| {
            if rule.contains(delimiter) {
                column_name == rule
                    || column_name
                        .strip_prefix(rule.as_str())
                        .is_some_and(|rest| rest.starts_with(delimiter))
            } else {
                column_name.split(delimiter).any(|token| token == rule)
            }
        })
    }

    pub fn remove_ignored(&self, columns: &[String], delimiter: &str) -> Vec<String> {
        columns
            .iter()
            .filter(|column| !self.ignores(column, delimiter))
            .cloned()
            .collect()
    }
}
