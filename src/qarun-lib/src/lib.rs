pub mod ai;
pub mod assertions;
pub mod auth;
pub mod codegen;
pub mod config;
pub mod error;
pub mod executor;
pub mod extraction;
pub mod http;
pub mod import;
pub mod json_path;
pub mod model;
pub mod runner;
pub mod script;
pub mod store;
pub mod variables;

pub use codegen::generate_code;
pub use config::EngineConfig;
pub use executor::RequestExecutor;
pub use runner::{CollectionRunner, RunOptions};
pub use store::{JsonStore, RecordStore, Workspace};
pub use variables::VariableMap;
