pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CliRuntime, DryRunExecutor, InMemoryRuntime};
pub use config::ProjectConfig;
pub use crate::core::report::{ResourceKind, ResourceOutcome, ResourceRecord, TeardownReport};
pub use crate::core::teardown::{TeardownEngine, TeardownOptions};
pub use domain::cancel::{cancel_scope, CancelHandle, CancelSignal};
pub use domain::model::{Container, ContainerMetadata, Network, Project, Volume};
pub use utils::error::{Result, TeardownError};
