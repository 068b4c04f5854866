pub mod adjustments_yaml;
pub mod amounts;
pub mod credentials;
pub mod local_sheet;
pub mod names;
pub mod payroll_aggregator;
pub mod payroll_config;
pub mod results_yaml;
pub mod revenue_stats;
pub mod sheet_source;
pub mod sheets_api;
pub mod summary;
pub mod summary_csv;
