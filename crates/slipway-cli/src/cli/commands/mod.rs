//! CLI command handlers. Each command is in its own file for clarity.

mod deploy;
mod logs;
mod migrate;
mod plan;
mod pull_schema;
mod status;

pub use deploy::run_deploy;
pub use logs::run_logs;
pub use migrate::run_migrate;
pub use plan::run_plan;
pub use pull_schema::run_pull_schema;
pub use status::run_status;
