use std::env;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use tracing_subscriber::{fmt, fmt::time::LocalTime, EnvFilter};

pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::new(format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        )))
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves a leading `~` against the user's home directory, leaving every
/// other path untouched.
pub fn expand_user(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match env::var("HOME").or_else(|_| env::var("USERPROFILE")) {
        Ok(home) => PathBuf::from(home).join(rest),
        Err(_) => path.to_path_buf(),
    }
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if args.delimiter.is_empty() {
        anyhow::bail!("--delimiter must not be empty");
    }

    Ok(())
}
