use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "colmap-check",
    about = "Sanity-check a generated column to StatVar map against the expected columns of each year",
    version,
    long_about = None
)]
pub struct Args {
    /// Path of json file containing the column StatVar map
    #[arg(long)]
    pub column_map: PathBuf,

    /// Path of json file containing list of all columns by year
    #[arg(long)]
    pub yearwise_columns: PathBuf,

    /// Path of json file containing the import spec
    #[arg(long)]
    pub spec_path: PathBuf,

    /// Directory path to write output file
    #[arg(short = 'o', long, default_value = "../output/")]
    pub colmap_validation_output: PathBuf,

    /// Delimiter separating tokens within a single column name
    #[arg(short, long, default_value = "!!")]
    pub delimiter: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
