//! fund-collector CLI: select sources and a year range, collect, export CSV.

pub mod export;
pub mod report;

pub use export::{export_outcomes, export_source, file_name, preview_lines, write_csv};
pub use report::{all_failed, status_line, summary};
