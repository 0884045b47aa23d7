use anyhow::Result;
use clap::Parser;
use colmap_check::{
    print_validation_summary, run_validation,
    utils::{setup_logging, validate_args},
    Args,
};
use tracing::error;

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    validate_args(&args)?;

    match run_validation(&args) {
        Ok(outcome) => {
            print_validation_summary(&outcome);
            Ok(())
        }
        Err(e) => {
            error!(action = "fail", component = "main", error = ?e, "Validation failed");
            std::process::exit(1);
        }
    }
}
