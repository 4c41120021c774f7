use crate::core::report::{ResourceKind, ResourceOutcome, ResourceRecord, TeardownReport};
use crate::domain::cancel::CancelSignal;
use crate::domain::model::{Container, Project};
use crate::domain::ports::{ContainerDirectory, ResourceExecutor};
use crate::utils::error::{Result, TeardownError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TeardownOptions {
    /// Also remove the project's named volumes and each container's anonymous volumes.
    pub remove_volumes: bool,
}

/// Removes a project's containers, then its networks, then optionally its volumes.
///
/// Failing to remove a single resource is recorded in the report and
/// teardown moves on. Failing to enumerate what exists, or being asked about
/// a network or volume the project does not declare, aborts.
pub struct TeardownEngine<'a, D: ?Sized, E: ?Sized> {
    directory: &'a D,
    executor: &'a E,
}

impl<'a, D, E> TeardownEngine<'a, D, E>
where
    D: ContainerDirectory + ?Sized,
    E: ResourceExecutor + ?Sized,
{
    pub fn new(directory: &'a D, executor: &'a E) -> Self {
        Self {
            directory,
            executor,
        }
    }

    pub async fn tear_down(
        &self,
        project: &Project,
        options: &TeardownOptions,
        cancel: &CancelSignal,
    ) -> Result<TeardownReport> {
        let mut report = TeardownReport::new(&project.name, options.remove_volumes);
        let service_names = project.service_names()?;

        // dependents first
        for service in service_names.iter().rev() {
            cancel.check()?;
            let containers = self
                .directory
                .list_containers(service, cancel)
                .await
                .map_err(|e| match e {
                    TeardownError::Cancelled => TeardownError::Cancelled,
                    other => TeardownError::ContainerLookup {
                        service: service.clone(),
                        message: other.to_string(),
                    },
                })?;
            tracing::debug!(service = %service, count = containers.len(), "Found containers");
            self.down_containers(&containers, options.remove_volumes, cancel, &mut report)
                .await?;
        }

        self.down_networks(project, &project.network_names(), cancel, &mut report)
            .await?;

        if options.remove_volumes {
            self.down_volumes(project, &project.volume_names(), cancel, &mut report)
                .await?;
        }

        report.finish();
        Ok(report)
    }

    pub async fn down_containers(
        &self,
        containers: &[Container],
        remove_anonymous_volumes: bool,
        cancel: &CancelSignal,
        report: &mut TeardownReport,
    ) -> Result<()> {
        for container in containers {
            cancel.check()?;
            let metadata = self.directory.fetch_metadata(container, cancel).await;
            let name = metadata.display_name(container).to_string();
            tracing::info!("Removing container {}", name);

            cancel.check()?;
            let outcome = removal_outcome(
                self.executor
                    .remove_container(&container.id, remove_anonymous_volumes, cancel)
                    .await,
            )?;
            report.push(ResourceRecord::new(ResourceKind::Container, name, outcome));
        }
        Ok(())
    }

    /// Stops at the first structural error; later names are not processed.
    pub async fn down_networks(
        &self,
        project: &Project,
        short_names: &[String],
        cancel: &CancelSignal,
        report: &mut TeardownReport,
    ) -> Result<()> {
        for short_name in short_names {
            let record = self.down_network(project, short_name, cancel).await?;
            report.push(record);
        }
        Ok(())
    }

    pub async fn down_network(
        &self,
        project: &Project,
        short_name: &str,
        cancel: &CancelSignal,
    ) -> Result<ResourceRecord> {
        let network = project
            .networks
            .get(short_name)
            .ok_or_else(|| TeardownError::InvalidNetwork(short_name.to_string()))?;

        let full_name = &network.name;
        if network.external {
            tracing::debug!("Skipping external network {}", full_name);
            return Ok(skipped_external(ResourceKind::Network, full_name));
        }

        cancel.check()?;
        let exists = self
            .executor
            .network_exists(full_name, cancel)
            .await
            .map_err(|e| existence_error(ResourceKind::Network, full_name, e))?;
        if !exists {
            return Ok(ResourceRecord::new(
                ResourceKind::Network,
                full_name.as_str(),
                ResourceOutcome::SkippedAbsent,
            ));
        }

        tracing::info!("Removing network {}", full_name);
        cancel.check()?;
        let outcome = removal_outcome(self.executor.remove_network(full_name, cancel).await)?;
        Ok(ResourceRecord::new(ResourceKind::Network, full_name.as_str(), outcome))
    }

    /// Stops at the first structural error; later names are not processed.
    pub async fn down_volumes(
        &self,
        project: &Project,
        short_names: &[String],
        cancel: &CancelSignal,
        report: &mut TeardownReport,
    ) -> Result<()> {
        for short_name in short_names {
            let record = self.down_volume(project, short_name, cancel).await?;
            report.push(record);
        }
        Ok(())
    }

    pub async fn down_volume(
        &self,
        project: &Project,
        short_name: &str,
        cancel: &CancelSignal,
    ) -> Result<ResourceRecord> {
        let volume = project
            .volumes
            .get(short_name)
            .ok_or_else(|| TeardownError::InvalidVolume(short_name.to_string()))?;

        let full_name = &volume.name;
        if volume.external {
            tracing::debug!("Skipping external volume {}", full_name);
            return Ok(skipped_external(ResourceKind::Volume, full_name));
        }

        cancel.check()?;
        let exists = self
            .executor
            .volume_exists(full_name, cancel)
            .await
            .map_err(|e| existence_error(ResourceKind::Volume, full_name, e))?;
        if !exists {
            return Ok(ResourceRecord::new(
                ResourceKind::Volume,
                full_name.as_str(),
                ResourceOutcome::SkippedAbsent,
            ));
        }

        tracing::info!("Removing volume {}", full_name);
        cancel.check()?;
        let outcome = removal_outcome(self.executor.remove_volume(full_name, true, cancel).await)?;
        Ok(ResourceRecord::new(ResourceKind::Volume, full_name.as_str(), outcome))
    }
}

fn skipped_external(kind: ResourceKind, full_name: &str) -> ResourceRecord {
    ResourceRecord::new(kind, full_name, ResourceOutcome::SkippedExternal)
}

fn existence_error(kind: ResourceKind, full_name: &str, error: TeardownError) -> TeardownError {
    match error {
        TeardownError::Cancelled => TeardownError::Cancelled,
        other => TeardownError::ExistenceCheck {
            kind: kind.to_string(),
            name: full_name.to_string(),
            message: other.to_string(),
        },
    }
}

/// Removal failures become a recorded outcome; only cancellation propagates.
fn removal_outcome(result: Result<()>) -> Result<ResourceOutcome> {
    match result {
        Ok(()) => Ok(ResourceOutcome::Removed),
        Err(TeardownError::Cancelled) => Err(TeardownError::Cancelled),
        Err(e) => {
            tracing::warn!("{}", e);
            Ok(ResourceOutcome::RemovalFailed {
                reason: e.to_string(),
            })
        }
    }
}
