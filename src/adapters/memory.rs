//! In-memory container runtime.
//!
//! Implements both ports over plain collections, records every call in order
//! and lets callers inject failures. Used to exercise the teardown engine
//! without a daemon.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::cancel::CancelSignal;
use crate::domain::model::{Container, ContainerMetadata};
use crate::domain::ports::{ContainerDirectory, ResourceExecutor};
use crate::utils::error::{Result, TeardownError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    ListContainers(String),
    FetchMetadata(String),
    NetworkExists(String),
    VolumeExists(String),
    RemoveContainer {
        id: String,
        remove_anonymous_volumes: bool,
    },
    RemoveNetwork(String),
    RemoveVolume {
        name: String,
        force: bool,
    },
}

impl RuntimeCall {
    pub fn is_removal(&self) -> bool {
        matches!(
            self,
            RuntimeCall::RemoveContainer { .. }
                | RuntimeCall::RemoveNetwork(_)
                | RuntimeCall::RemoveVolume { .. }
        )
    }
}

#[derive(Debug, Default)]
struct State {
    containers: BTreeMap<String, Vec<(Container, ContainerMetadata)>>,
    networks: HashSet<String>,
    volumes: HashSet<String>,
    failing_lookups: HashSet<String>,
    failing_removals: HashSet<String>,
    failing_existence_checks: HashSet<String>,
    calls: Vec<RuntimeCall>,
}

#[derive(Debug, Default)]
pub struct InMemoryRuntime {
    state: Mutex<State>,
}

impl InMemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_container(&self, service: &str, container: Container) -> &Self {
        self.add_container_with_metadata(service, container, ContainerMetadata::default())
    }

    pub fn add_container_with_metadata(
        &self,
        service: &str,
        container: Container,
        metadata: ContainerMetadata,
    ) -> &Self {
        self.state()
            .containers
            .entry(service.to_string())
            .or_default()
            .push((container, metadata));
        self
    }

    pub fn add_network(&self, full_name: &str) -> &Self {
        self.state().networks.insert(full_name.to_string());
        self
    }

    pub fn add_volume(&self, full_name: &str) -> &Self {
        self.state().volumes.insert(full_name.to_string());
        self
    }

    /// Listing the containers of `service` will fail.
    pub fn fail_lookup(&self, service: &str) -> &Self {
        self.state().failing_lookups.insert(service.to_string());
        self
    }

    /// Removing the container id, network or volume called `name` will fail.
    pub fn fail_removal(&self, name: &str) -> &Self {
        self.state().failing_removals.insert(name.to_string());
        self
    }

    pub fn fail_existence_check(&self, full_name: &str) -> &Self {
        self.state()
            .failing_existence_checks
            .insert(full_name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.state().calls.clone()
    }

    pub fn removal_calls(&self) -> Vec<RuntimeCall> {
        self.calls().into_iter().filter(RuntimeCall::is_removal).collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn has_network(&self, full_name: &str) -> bool {
        self.state().networks.contains(full_name)
    }

    pub fn has_volume(&self, full_name: &str) -> bool {
        self.state().volumes.contains(full_name)
    }

    pub fn container_count(&self) -> usize {
        self.state().containers.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl ContainerDirectory for InMemoryRuntime {
    async fn list_containers(
        &self,
        service: &str,
        _cancel: &CancelSignal,
    ) -> Result<Vec<Container>> {
        let mut state = self.state();
        state
            .calls
            .push(RuntimeCall::ListContainers(service.to_string()));

        if state.failing_lookups.contains(service) {
            return Err(TeardownError::runtime(
                format!("ps --filter service={}", service),
                "directory unavailable",
            ));
        }

        Ok(state
            .containers
            .get(service)
            .map(|entries| entries.iter().map(|(c, _)| c.clone()).collect())
            .unwrap_or_default())
    }

    async fn fetch_metadata(
        &self,
        container: &Container,
        _cancel: &CancelSignal,
    ) -> ContainerMetadata {
        let mut state = self.state();
        state
            .calls
            .push(RuntimeCall::FetchMetadata(container.id.clone()));

        state
            .containers
            .values()
            .flatten()
            .find(|(c, _)| c.id == container.id)
            .map(|(_, metadata)| metadata.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResourceExecutor for InMemoryRuntime {
    async fn network_exists(&self, full_name: &str, _cancel: &CancelSignal) -> Result<bool> {
        let mut state = self.state();
        state
            .calls
            .push(RuntimeCall::NetworkExists(full_name.to_string()));

        if state.failing_existence_checks.contains(full_name) {
            return Err(TeardownError::runtime("network ls", "runtime unreachable"));
        }
        Ok(state.networks.contains(full_name))
    }

    async fn volume_exists(&self, full_name: &str, _cancel: &CancelSignal) -> Result<bool> {
        let mut state = self.state();
        state
            .calls
            .push(RuntimeCall::VolumeExists(full_name.to_string()));

        if state.failing_existence_checks.contains(full_name) {
            return Err(TeardownError::runtime("volume ls", "runtime unreachable"));
        }
        Ok(state.volumes.contains(full_name))
    }

    async fn remove_container(
        &self,
        id: &str,
        remove_anonymous_volumes: bool,
        _cancel: &CancelSignal,
    ) -> Result<()> {
        let mut state = self.state();
        state.calls.push(RuntimeCall::RemoveContainer {
            id: id.to_string(),
            remove_anonymous_volumes,
        });

        if state.failing_removals.contains(id) {
            return Err(TeardownError::runtime(
                format!("rm -f {}", id),
                "container is stuck",
            ));
        }

        let mut found = false;
        for entries in state.containers.values_mut() {
            let before = entries.len();
            entries.retain(|(c, _)| c.id != id);
            found |= entries.len() != before;
        }
        if !found {
            return Err(TeardownError::runtime(
                format!("rm -f {}", id),
                format!("no such container: {}", id),
            ));
        }
        Ok(())
    }

    async fn remove_network(&self, full_name: &str, _cancel: &CancelSignal) -> Result<()> {
        let mut state = self.state();
        state
            .calls
            .push(RuntimeCall::RemoveNetwork(full_name.to_string()));

        if state.failing_removals.contains(full_name) {
            return Err(TeardownError::runtime(
                format!("network rm {}", full_name),
                "network has active endpoints",
            ));
        }
        state.networks.remove(full_name);
        Ok(())
    }

    async fn remove_volume(
        &self,
        full_name: &str,
        force: bool,
        _cancel: &CancelSignal,
    ) -> Result<()> {
        let mut state = self.state();
        state.calls.push(RuntimeCall::RemoveVolume {
            name: full_name.to_string(),
            force,
        });

        if state.failing_removals.contains(full_name) {
            return Err(TeardownError::runtime(
                format!("volume rm {}", full_name),
                "volume is in use",
            ));
        }
        state.volumes.remove(full_name);
        Ok(())
    }
}
