pub mod args;
pub mod checker;
pub mod ignore;
pub mod inputs;
pub mod record;
pub mod report;
pub mod utils;
pub mod validate;

pub use args::Args;
pub use checker::check_column_map;
pub use record::{ColumnMap, ExpectedColumns, VariableRecord};
pub use report::{Report, UnionReport, YearReport};
pub use validate::{print_validation_summary, run_validation, ValidationOutcome};
