use async_trait::async_trait;

use crate::domain::cancel::CancelSignal;
use crate::domain::ports::ResourceExecutor;
use crate::utils::error::Result;

/// Wraps an executor so existence checks still hit the runtime but removals
/// are only logged.
pub struct DryRunExecutor<E> {
    inner: E,
}

impl<E: ResourceExecutor> DryRunExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: ResourceExecutor> ResourceExecutor for DryRunExecutor<E> {
    async fn network_exists(&self, full_name: &str, cancel: &CancelSignal) -> Result<bool> {
        self.inner.network_exists(full_name, cancel).await
    }

    async fn volume_exists(&self, full_name: &str, cancel: &CancelSignal) -> Result<bool> {
        self.inner.volume_exists(full_name, cancel).await
    }

    async fn remove_container(
        &self,
        id: &str,
        remove_anonymous_volumes: bool,
        _cancel: &CancelSignal,
    ) -> Result<()> {
        tracing::info!(
            anonymous_volumes = remove_anonymous_volumes,
            "Would remove container {}",
            id
        );
        Ok(())
    }

    async fn remove_network(&self, full_name: &str, _cancel: &CancelSignal) -> Result<()> {
        tracing::info!("Would remove network {}", full_name);
        Ok(())
    }

    async fn remove_volume(
        &self,
        full_name: &str,
        force: bool,
        _cancel: &CancelSignal,
    ) -> Result<()> {
        tracing::info!(force, "Would remove volume {}", full_name);
        Ok(())
    }
}
