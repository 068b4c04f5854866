pub mod aggregate_cmd;
pub mod base_commands;
pub mod command_error;
pub mod completions_cmd;
pub mod fetch_cmd;
pub mod report_format;
pub mod summary_cmd;
