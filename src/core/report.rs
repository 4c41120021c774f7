use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Container,
    Network,
    Volume,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ResourceKind::Container => "container",
            ResourceKind::Network => "network",
            ResourceKind::Volume => "volume",
        };
        f.write_str(kind)
    }
}

/// Terminal state of one declared resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResourceOutcome {
    SkippedExternal,
    SkippedAbsent,
    Removed,
    RemovalFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub kind: ResourceKind,
    /// Container display name, or the full network/volume name.
    pub name: String,
    #[serde(flatten)]
    pub outcome: ResourceOutcome,
}

impl ResourceRecord {
    pub fn new(kind: ResourceKind, name: impl Into<String>, outcome: ResourceOutcome) -> Self {
        Self {
            kind,
            name: name.into(),
            outcome,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeardownReport {
    pub project: String,
    pub remove_volumes: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub records: Vec<ResourceRecord>,
}

impl TeardownReport {
    pub fn new(project: impl Into<String>, remove_volumes: bool) -> Self {
        Self {
            project: project.into(),
            remove_volumes,
            started_at: Utc::now(),
            finished_at: None,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ResourceRecord) {
        self.records.push(record);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn records_of(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, ResourceOutcome::RemovalFailed { .. }))
    }

    pub fn removed(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records
            .iter()
            .filter(|r| r.outcome == ResourceOutcome::Removed)
    }

    /// True when nothing failed to be removed.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn summary(&self) -> String {
        let count = |kind: ResourceKind| {
            self.records_of(kind)
                .filter(|r| r.outcome == ResourceOutcome::Removed)
                .count()
        };
        let skipped = self
            .records
            .iter()
            .filter(|r| {
                matches!(
                    r.outcome,
                    ResourceOutcome::SkippedExternal | ResourceOutcome::SkippedAbsent
                )
            })
            .count();

        format!(
            "removed {} container(s), {} network(s), {} volume(s); skipped {}; failed {}",
            count(ResourceKind::Container),
            count(ResourceKind::Network),
            count(ResourceKind::Volume),
            skipped,
            self.failures().count()
        )
    }
}
