pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ClientConfig;

pub use adapters::{FsPrintHost, MemorySession};
pub use core::{
    export::{GradeSheet, GradeSheetExporter},
    gateway::ApiGateway,
    login::{CallbackObserver, LoginClient},
    print::PrintAdapter,
};
pub use utils::error::{ClientError, Result};
