use crate::utils::error::{Result, TeardownError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Label carrying the human-readable container name.
pub const NAME_LABEL: &str = "nerdctl/name";

/// A compose project as seen by teardown: services in creation order plus the
/// declared networks and volumes keyed by their short names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub services: Vec<String>,
    pub networks: BTreeMap<String, Network>,
    pub volumes: BTreeMap<String, Volume>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.services.push(service.into());
        self
    }

    pub fn with_network(mut self, short_name: impl Into<String>, network: Network) -> Self {
        self.networks.insert(short_name.into(), network);
        self
    }

    pub fn with_volume(mut self, short_name: impl Into<String>, volume: Volume) -> Self {
        self.volumes.insert(short_name.into(), volume);
        self
    }

    /// Services in dependency (creation) order.
    pub fn service_names(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        for service in &self.services {
            if service.trim().is_empty() {
                return Err(TeardownError::ServiceOrder {
                    message: "service with an empty name".to_string(),
                });
            }
            if !seen.insert(service.as_str()) {
                return Err(TeardownError::ServiceOrder {
                    message: format!("service {:?} is listed more than once", service),
                });
            }
        }
        Ok(self.services.clone())
    }

    pub fn network_names(&self) -> Vec<String> {
        self.networks.keys().cloned().collect()
    }

    pub fn volume_names(&self) -> Vec<String> {
        self.volumes.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Globally scoped name, e.g. `wordpress_default`.
    pub name: String,
    pub external: bool,
}

impl Network {
    pub fn owned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external: false,
        }
    }

    pub fn external(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Globally scoped name, e.g. `wordpress_db_data`.
    pub name: String,
    pub external: bool,
}

impl Volume {
    pub fn owned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external: false,
        }
    }

    pub fn external(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub name: Option<String>,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

/// Snapshot of a container's metadata. May be stale or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerMetadata {
    pub labels: HashMap<String, String>,
}

impl ContainerMetadata {
    pub fn display_name<'a>(&'a self, container: &'a Container) -> &'a str {
        self.labels
            .get(NAME_LABEL)
            .map(String::as_str)
            .or(container.name.as_deref())
            .unwrap_or(&container.id)
    }
}
