pub mod report;
pub mod teardown;

pub use crate::domain::cancel::{cancel_scope, CancelHandle, CancelSignal};
pub use crate::domain::model::{Container, ContainerMetadata, Network, Project, Volume};
pub use crate::domain::ports::{ContainerDirectory, ResourceExecutor};
pub use crate::utils::error::Result;
