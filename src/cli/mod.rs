//! CLI command handlers

pub mod commands;

pub use commands::{columns, export, import, load_records, load_schema, ExportOptions, ImportOptions};
