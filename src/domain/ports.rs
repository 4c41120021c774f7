use crate::domain::cancel::CancelSignal;
use crate::domain::model::{Container, ContainerMetadata};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Finds the live containers that belong to a service.
#[async_trait]
pub trait ContainerDirectory: Send + Sync {
    async fn list_containers(&self, service: &str, cancel: &CancelSignal)
        -> Result<Vec<Container>>;

    /// Best-effort read. Implementations return an empty snapshot rather than fail.
    async fn fetch_metadata(&self, container: &Container, cancel: &CancelSignal)
        -> ContainerMetadata;
}

/// The destructive actions teardown needs, plus the existence checks guarding them.
#[async_trait]
pub trait ResourceExecutor: Send + Sync {
    async fn network_exists(&self, full_name: &str, cancel: &CancelSignal) -> Result<bool>;

    async fn volume_exists(&self, full_name: &str, cancel: &CancelSignal) -> Result<bool>;

    /// Forced removal. With `remove_anonymous_volumes` the container's
    /// anonymous volumes go with it.
    async fn remove_container(
        &self,
        id: &str,
        remove_anonymous_volumes: bool,
        cancel: &CancelSignal,
    ) -> Result<()>;

    async fn remove_network(&self, full_name: &str, cancel: &CancelSignal) -> Result<()>;

    async fn remove_volume(&self, full_name: &str, force: bool, cancel: &CancelSignal)
        -> Result<()>;
}
