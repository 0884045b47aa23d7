use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::{checker, inputs, report, report::Report, utils::expand_user, Args};

pub struct ValidationOutcome {
    pub report: Report,
    pub report_path: PathBuf,
}

pub fn run_validation(args: &Args) -> Result<ValidationOutcome> {
    let total_start_time = Instant::now();
    info!(
        action = "start",
        component = "validation",
        "Starting column map validation"
    );

    let column_map = inputs::load_column_map(&expand_user(&args.column_map))?;
    let mut expected = inputs::load_expected_columns(&expand_user(&args.yearwise_columns))?;
    let spec = inputs::load_spec(&expand_user(&args.spec_path))?;
    let output_dir = expand_user(&args.colmap_validation_output);

    expected.retain(|column| !spec.ignores(column, &args.delimiter));

    for year in column_map.keys() {
        if expected.for_year(year).is_none() {
            warn!(
                action = "compare",
                component = "column_list",
                year = %year,
                "Year missing from column list, comparing against no expected columns"
            );
        }
    }

    let check_start = Instant::now();
    let report = checker::check_column_map(&column_map, &expected);
    info!(
        action = "complete",
        component = "checker",
        year_count = report.years.len(),
        series_holes = report.dcid_series_holes.len(),
        duration_ms = check_start.elapsed().as_millis(),
        "Checks completed"
    );

    let report_path = report::write_report(&report, &output_dir)?;

    info!(
        action = "complete",
        component = "validation",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Validation completed successfully"
    );

    Ok(ValidationOutcome {
        report,
        report_path,
    })
}

/// Prints one status line per check so a run can be eyeballed without
/// opening the report.
pub fn print_validation_summary(outcome: &ValidationOutcome) {
    for (year, year_report) in &outcome.report.years {
        if year_report.repeated_dcids.is_empty() {
            println!("No repeated dcids for year {}", year);
        } else {
            println!(
                "Found some repeated dcids for year {} , please check output file",
                year
            );
        }

        if year_report.missing_columns.is_some() {
            println!(
                "Found some columns missing for year {} , please check output file",
                year
            );
        } else {
            println!("No missing columns for year {}", year);
        }

        if year_report.extra_columns.is_some() {
            println!(
                "Found some extra columns for year {} , please check output file",
                year
            );
        } else {
            println!("No extra columns for year {}", year);
        }
    }

    if outcome.report.dcid_series_holes.is_empty() {
        println!("All dcids found across all years");
    } else {
        println!("Found some dcids missing for some years, please check the output file");
    }

    println!("Writing output file at {}", outcome.report_path.display());
}
