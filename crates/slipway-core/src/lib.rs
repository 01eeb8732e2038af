pub mod config;
pub mod logging;

// Deployment building blocks
pub mod archive;
pub mod exec;
pub mod migrate;
pub mod platform;
pub mod poll;
pub mod retry;
pub mod schema;
pub mod stage;
pub mod store;
pub mod uploader;
