pub mod json_store;
pub mod project_registry;
pub mod report_exporter;
pub mod user_directory;

pub use json_store::{JsonStore, Store, WriteDiscipline};
pub use project_registry::ProjectRegistry;
pub use report_exporter::{format_money, ReportExporter};
pub use user_directory::UserDirectory;
