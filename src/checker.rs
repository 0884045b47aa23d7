//! Consistency checks over a column map.
//!
//! The per-year pass is a fold over the years of the map; each step returns
//! the updated accumulator. Cross-year checks then run over what the fold
//! collected. Nothing here touches the filesystem. Years, columns and dcids
//! keep the order of the input files; only set differences come out sorted.

use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};

use crate::record::{ColumnMap, ExpectedColumns, VariableRecord};
use crate::report::{Report, UnionReport, YearReport};

#[derive(Default)]
struct Accumulator<'a> {
    years: IndexMap<String, YearReport>,
    /// dcid -> first record seen for it, across all years
    first_record: HashMap<&'a str, &'a VariableRecord>,
    same_dcid_different_statvar: Vec<String>,
    /// year -> dcids in the order their first column appears
    dcids_by_year: IndexMap<&'a str, Vec<&'a str>>,
    actual_columns: BTreeSet<&'a str>,
}

impl<'a> Accumulator<'a> {
    fn visit_year(
        mut self,
        year: &'a str,
        columns: &'a IndexMap<String, VariableRecord>,
        expected: Option<&[String]>,
    ) -> Self {
        let mut year_report = YearReport {
            actual_column_count: columns.len(),
            ..Default::default()
        };
        let mut columns_by_dcid: IndexMap<&'a str, Vec<String>> = IndexMap::new();

        for (column_name, record) in columns {
            let dcid = record.node.as_str();
            columns_by_dcid
                .entry(dcid)
                .or_default()
                .push(column_name.clone());

            if record.is_margin_of_error() {
                year_report.moe_count += 1;
                if !has_matching_estimate(record, columns) {
                    year_report.moe_only.push(column_name.clone());
                }
            } else {
                year_report.estimate_count += 1;
            }

            match self.first_record.get(dcid) {
                None => {
                    self.first_record.insert(dcid, record);
                }
                Some(first) if *first != record => {
                    if !self.same_dcid_different_statvar.iter().any(|d| d == dcid) {
                        self.same_dcid_different_statvar.push(dcid.to_string());
                    }
                }
                Some(_) => {}
            }

            self.actual_columns.insert(column_name.as_str());
        }

        let dcid_order: Vec<&'a str> = columns_by_dcid.keys().copied().collect();
        year_report.repeated_dcids = columns_by_dcid
            .into_iter()
            .filter(|(_, dcid_columns)| dcid_columns.len() > 1)
            .map(|(dcid, dcid_columns)| (dcid.to_string(), dcid_columns))
            .collect();

        let actual: BTreeSet<&str> = columns.keys().map(String::as_str).collect();
        let expected: BTreeSet<&str> = expected
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .collect();
        year_report.missing_columns = non_empty(difference(&expected, &actual));
        year_report.extra_columns = non_empty(difference(&actual, &expected));

        self.dcids_by_year.insert(year, dcid_order);
        self.years.insert(year.to_string(), year_report);
        self
    }

    fn finish(mut self, expected_all: &[String]) -> Report {
        let expected_all: BTreeSet<&str> = expected_all.iter().map(String::as_str).collect();
        let all = UnionReport {
            missing_columns: non_empty(difference(&expected_all, &self.actual_columns)),
            extra_columns: non_empty(difference(&self.actual_columns, &expected_all)),
        };

        let year_sets: IndexMap<&str, BTreeSet<&str>> = self
            .dcids_by_year
            .iter()
            .map(|(year, dcids)| (*year, dcids.iter().copied().collect()))
            .collect();
        let all_dcids: BTreeSet<&str> = year_sets.values().flatten().copied().collect();

        for (year, dcids) in &year_sets {
            let Some(year_report) = self.years.get_mut(*year) else {
                continue;
            };

            let missing_in_year = difference(&all_dcids, dcids);
            if missing_in_year.is_empty() {
                continue;
            }

            let elsewhere: BTreeSet<&str> = year_sets
                .iter()
                .filter(|(other, _)| *other != year)
                .flat_map(|(_, other_dcids)| other_dcids.iter().copied())
                .collect();
            year_report.dcid_missing_in_year = Some(missing_in_year);
            // Reported alongside dcid_missing_in_year only, even when a year
            // has dcids of its own.
            year_report.year_unique_dcid = Some(difference(dcids, &elsewhere));
        }

        let mut dcid_year_list: IndexMap<String, Vec<String>> = IndexMap::new();
        for (year, dcids) in &self.dcids_by_year {
            for dcid in dcids {
                let years = dcid_year_list.entry(dcid.to_string()).or_default();
                if !years.iter().any(|y| y == year) {
                    years.push(year.to_string());
                }
            }
        }

        let mut all_years: Vec<&str> = self.dcids_by_year.keys().copied().collect();
        all_years.sort_unstable();
        let dcid_series_holes = dcid_year_list
            .iter()
            .filter(|(_, years)| {
                let mut sorted: Vec<&str> = years.iter().map(String::as_str).collect();
                sorted.sort_unstable();
                sorted != all_years
            })
            .map(|(dcid, years)| (dcid.clone(), years.clone()))
            .collect();

        Report {
            same_dcid_different_statvar: self.same_dcid_different_statvar,
            years: self.years,
            all,
            dcid_series_holes,
            dcid_year_list,
        }
    }
}

/// Whether some estimate in the same year describes the same quantity as `moe`.
///
/// Candidates are the records [`VariableRecord::is_margin_of_error`] rejects:
/// any `statType` containing `marginOfError` is skipped, not only an exact
/// `dcid:marginOfError`.
fn has_matching_estimate(
    moe: &VariableRecord,
    columns: &IndexMap<String, VariableRecord>,
) -> bool {
    columns
        .values()
        .filter(|candidate| !candidate.is_margin_of_error())
        .any(|candidate| candidate.descriptor() == moe.descriptor())
}

fn difference(left: &BTreeSet<&str>, right: &BTreeSet<&str>) -> Vec<String> {
    left.difference(right).map(|s| s.to_string()).collect()
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Runs every check on `column_map` against the already filtered `expected`
/// columns.
pub fn check_column_map(column_map: &ColumnMap, expected: &ExpectedColumns) -> Report {
    column_map
        .iter()
        .fold(Accumulator::default(), |acc, (year, columns)| {
            acc.visit_year(year, columns, expected.for_year(year))
        })
        .finish(&expected.all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn column_map(value: Value) -> ColumnMap {
        serde_json::from_value(value).unwrap()
    }

    fn expected(value: Value) -> ExpectedColumns {
        ExpectedColumns::from_listing(serde_json::from_value(value).unwrap()).0
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn counts_columns_estimates_and_moes() {
        let map = column_map(json!({
            "2019": {
                "A": {"Node": "dcid:X", "statType": "measuredValue", "unit": "Count"},
                "A_MOE": {"Node": "dcid:X_MOE", "statType": "dcid:marginOfError", "unit": "Count"},
                "B": {"Node": "dcid:Y", "statType": "measuredValue", "unit": "Percent"}
            }
        }));
        let report = check_column_map(&map, &expected(json!({"2019": ["A", "A_MOE", "B"], "all": ["A", "A_MOE", "B"]})));

        let year = &report.years["2019"];
        assert_eq!(year.actual_column_count, 3);
        assert_eq!(year.estimate_count, 2);
        assert_eq!(year.moe_count, 1);
        assert!(year.moe_only.is_empty());
    }

    #[test]
    fn moe_without_estimate_is_flagged() {
        let map = column_map(json!({
            "2019": {
                "A_MOE": {"Node": "dcid:X", "statType": "dcid:marginOfError", "unit": "Count"},
                "B": {"Node": "dcid:Y", "statType": "measuredValue", "unit": "Percent"}
            }
        }));
        let report = check_column_map(&map, &ExpectedColumns::default());
        assert_eq!(report.years["2019"].moe_only, strings(&["A_MOE"]));
    }

    #[test]
    fn moe_does_not_match_another_moe() {
        let map = column_map(json!({
            "2019": {
                "A_MOE": {"Node": "dcid:X", "statType": "dcid:marginOfError", "unit": "Count"},
                "B_MOE": {"Node": "dcid:Y", "statType": "dcid:marginOfError", "unit": "Count"}
            }
        }));
        let report = check_column_map(&map, &ExpectedColumns::default());
        assert_eq!(report.years["2019"].moe_only, strings(&["A_MOE", "B_MOE"]));
    }

    #[test]
    fn repeated_dcids_list_every_column() {
        let map = column_map(json!({
            "2019": {
                "A": {"Node": "dcid:X", "statType": "measuredValue"},
                "B": {"Node": "dcid:X", "statType": "measuredValue"},
                "C": {"Node": "dcid:Z", "statType": "measuredValue"}
            }
        }));
        let report = check_column_map(&map, &ExpectedColumns::default());

        let repeated = &report.years["2019"].repeated_dcids;
        assert_eq!(repeated.len(), 1);
        assert_eq!(repeated["dcid:X"], strings(&["A", "B"]));
        // identical records under one dcid are not a conflict
        assert!(report.same_dcid_different_statvar.is_empty());
    }

    #[test]
    fn same_dcid_with_different_record_across_years() {
        let map = column_map(json!({
            "2018": {"A": {"Node": "dcid:Y", "statType": "measuredValue", "unit": "Count"}},
            "2019": {"A": {"Node": "dcid:Y", "statType": "measuredValue", "unit": "Percent"}},
            "2020": {"A": {"Node": "dcid:Y", "statType": "measuredValue", "unit": "Ratio"}}
        }));
        let report = check_column_map(&map, &ExpectedColumns::default());
        assert_eq!(report.same_dcid_different_statvar, strings(&["dcid:Y"]));
    }

    #[test]
    fn missing_and_extra_columns_per_year_and_overall() {
        let map = column_map(json!({
            "2019": {
                "A": {"Node": "dcid:X", "statType": "measuredValue"},
                "Z": {"Node": "dcid:Z", "statType": "measuredValue"}
            }
        }));
        let report = check_column_map(
            &map,
            &expected(json!({"2019": ["A", "B"], "all": ["A", "B", "C"]})),
        );

        let year = &report.years["2019"];
        assert_eq!(year.missing_columns, Some(strings(&["B"])));
        assert_eq!(year.extra_columns, Some(strings(&["Z"])));
        assert_eq!(report.all.missing_columns, Some(strings(&["B", "C"])));
        assert_eq!(report.all.extra_columns, Some(strings(&["Z"])));
    }

    #[test]
    fn year_absent_from_column_list_has_only_extras() {
        let map = column_map(json!({
            "2021": {"A": {"Node": "dcid:X", "statType": "measuredValue"}}
        }));
        let report = check_column_map(&map, &expected(json!({"2019": ["A"], "all": ["A"]})));

        let year = &report.years["2021"];
        assert_eq!(year.missing_columns, None);
        assert_eq!(year.extra_columns, Some(strings(&["A"])));
    }

    #[test]
    fn series_holes_keep_first_seen_years() {
        let map = column_map(json!({
            "2018": {
                "A": {"Node": "dcid:X", "statType": "measuredValue"},
                "B": {"Node": "dcid:W", "statType": "measuredValue"}
            },
            "2019": {"B": {"Node": "dcid:W", "statType": "measuredValue"}},
            "2020": {
                "A": {"Node": "dcid:X", "statType": "measuredValue"},
                "B": {"Node": "dcid:W", "statType": "measuredValue"}
            }
        }));
        let report = check_column_map(&map, &ExpectedColumns::default());

        assert_eq!(report.dcid_year_list["dcid:X"], strings(&["2018", "2020"]));
        assert_eq!(report.dcid_series_holes.len(), 1);
        assert_eq!(report.dcid_series_holes["dcid:X"], strings(&["2018", "2020"]));
    }

    #[test]
    fn year_unique_dcid_is_gated_on_missing_dcids() {
        // 2018 holds every dcid, so nothing is missing there and its unique
        // dcid goes unreported; 2019 misses dcid:U and gets both fields.
        let map = column_map(json!({
            "2018": {
                "A": {"Node": "dcid:X", "statType": "measuredValue"},
                "U": {"Node": "dcid:U", "statType": "measuredValue"}
            },
            "2019": {"A": {"Node": "dcid:X", "statType": "measuredValue"}}
        }));
        let report = check_column_map(&map, &ExpectedColumns::default());

        let y2018 = &report.years["2018"];
        assert_eq!(y2018.dcid_missing_in_year, None);
        assert_eq!(y2018.year_unique_dcid, None);

        let y2019 = &report.years["2019"];
        assert_eq!(y2019.dcid_missing_in_year, Some(strings(&["dcid:U"])));
        assert_eq!(y2019.year_unique_dcid, Some(Vec::new()));
    }

    #[test]
    fn clean_map_produces_no_optional_findings() {
        let map = column_map(json!({
            "2018": {"A": {"Node": "dcid:X", "statType": "measuredValue"}},
            "2019": {"A": {"Node": "dcid:X", "statType": "measuredValue"}}
        }));
        let report = check_column_map(
            &map,
            &expected(json!({"2018": ["A"], "2019": ["A"], "all": ["A"]})),
        );

        for year in report.years.values() {
            assert_eq!(year.missing_columns, None);
            assert_eq!(year.extra_columns, None);
            assert_eq!(year.dcid_missing_in_year, None);
            assert!(year.repeated_dcids.is_empty());
            assert!(year.moe_only.is_empty());
        }
        assert_eq!(report.all, UnionReport::default());
        assert!(report.dcid_series_holes.is_empty());
        assert!(report.same_dcid_different_statvar.is_empty());
    }

    #[test]
    fn findings_follow_input_order() {
        let map = column_map(json!({
            "2020": {
                "Z": {"Node": "dcid:B", "statType": "measuredValue", "unit": "Count"},
                "Y": {"Node": "dcid:Q", "statType": "measuredValue"},
                "C": {"Node": "dcid:Q", "statType": "measuredValue"},
                "A": {"Node": "dcid:A", "statType": "measuredValue", "unit": "Count"}
            },
            "2018": {
                "Z": {"Node": "dcid:B", "statType": "measuredValue", "unit": "Percent"},
                "A": {"Node": "dcid:A", "statType": "measuredValue", "unit": "Percent"}
            }
        }));
        let report = check_column_map(&map, &ExpectedColumns::default());

        let years: Vec<&str> = report.years.keys().map(String::as_str).collect();
        assert_eq!(years, ["2020", "2018"]);
        assert_eq!(report.same_dcid_different_statvar, strings(&["dcid:B", "dcid:A"]));
        assert_eq!(report.years["2020"].repeated_dcids["dcid:Q"], strings(&["Y", "C"]));
        assert_eq!(report.dcid_year_list["dcid:B"], strings(&["2020", "2018"]));

        let holes: Vec<&str> = report.dcid_series_holes.keys().map(String::as_str).collect();
        assert_eq!(holes, ["dcid:Q"]);
        assert_eq!(report.dcid_series_holes["dcid:Q"], strings(&["2020"]));
    }

    #[test]
    fn empty_year_makes_every_dcid_a_hole() {
        let map = column_map(json!({
            "2018": {"A": {"Node": "dcid:X", "statType": "measuredValue"}},
            "2019": {}
        }));
        let report = check_column_map(&map, &ExpectedColumns::default());

        assert_eq!(report.years["2019"].actual_column_count, 0);
        assert_eq!(report.dcid_series_holes["dcid:X"], strings(&["2018"]));
    }
}
