use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::domain::cancel::CancelSignal;
use crate::domain::model::{Container, ContainerMetadata};
use crate::domain::ports::{ContainerDirectory, ResourceExecutor};
use crate::utils::error::{Result, TeardownError};

pub const PROJECT_LABEL: &str = "com.docker.compose.project";
pub const SERVICE_LABEL: &str = "com.docker.compose.service";

pub const DEFAULT_BINARY: &str = "nerdctl";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Drives a docker-compatible CLI (`nerdctl`, `docker`, `podman`).
#[derive(Debug, Clone)]
pub struct CliRuntime {
    binary: String,
    namespace: Option<String>,
    project: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct PsEntry {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Names", default)]
    names: String,
}

impl CliRuntime {
    pub fn new(binary: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            namespace: None,
            project: project.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn command_line(&self, args: &[&str]) -> String {
        let mut parts = vec![self.binary.as_str()];
        if let Some(namespace) = &self.namespace {
            parts.push("--namespace");
            parts.push(namespace.as_str());
        }
        parts.extend_from_slice(args);
        parts.join(" ")
    }

    /// Runs one command, returning stdout. A non-zero exit becomes
    /// `TeardownError::Runtime` with the trimmed stderr.
    async fn run(&self, args: &[&str], cancel: &CancelSignal) -> Result<String> {
        let command_line = self.command_line(args);
        tracing::debug!("Executing runtime command: '{}'", command_line);

        let mut command = Command::new(&self.binary);
        if let Some(namespace) = &self.namespace {
            command.arg("--namespace").arg(namespace);
        }
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| TeardownError::runtime(&command_line, e.to_string()))?;

        let output = tokio::select! {
            result = tokio::time::timeout(self.timeout, child.wait_with_output()) => match result {
                Ok(output) => output?,
                Err(_) => {
                    return Err(TeardownError::CommandTimeout {
                        command: command_line,
                        timeout: self.timeout,
                    })
                }
            },
            _ = cancel.cancelled() => return Err(TeardownError::Cancelled),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(TeardownError::runtime(command_line, message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ContainerDirectory for CliRuntime {
    async fn list_containers(
        &self,
        service: &str,
        cancel: &CancelSignal,
    ) -> Result<Vec<Container>> {
        let project_filter = format!("label={}={}", PROJECT_LABEL, self.project);
        let service_filter = format!("label={}={}", SERVICE_LABEL, service);
        let stdout = self
            .run(
                &[
                    "ps",
                    "-a",
                    "--no-trunc",
                    "--filter",
                    &project_filter,
                    "--filter",
                    &service_filter,
                    "--format",
                    "{{json .}}",
                ],
                cancel,
            )
            .await?;
        parse_ps_output(&stdout)
    }

    async fn fetch_metadata(
        &self,
        container: &Container,
        cancel: &CancelSignal,
    ) -> ContainerMetadata {
        let result = self
            .run(
                &[
                    "container",
                    "inspect",
                    "--format",
                    "{{json .Config.Labels}}",
                    &container.id,
                ],
                cancel,
            )
            .await
            .and_then(|stdout| parse_labels(&stdout));

        match result {
            Ok(labels) => ContainerMetadata { labels },
            Err(e) => {
                tracing::debug!("No metadata for container {}: {}", container.id, e);
                ContainerMetadata::default()
            }
        }
    }
}

#[async_trait]
impl ResourceExecutor for CliRuntime {
    async fn network_exists(&self, full_name: &str, cancel: &CancelSignal) -> Result<bool> {
        let stdout = self
            .run(&["network", "ls", "--format", "{{.Name}}"], cancel)
            .await?;
        Ok(contains_name(&stdout, full_name))
    }

    async fn volume_exists(&self, full_name: &str, cancel: &CancelSignal) -> Result<bool> {
        let stdout = self.run(&["volume", "ls", "--quiet"], cancel).await?;
        Ok(contains_name(&stdout, full_name))
    }

    async fn remove_container(
        &self,
        id: &str,
        remove_anonymous_volumes: bool,
        cancel: &CancelSignal,
    ) -> Result<()> {
        let mut args = vec!["rm", "-f"];
        if remove_anonymous_volumes {
            args.push("-v");
        }
        args.push(id);
        self.run(&args, cancel).await.map(|_| ())
    }

    async fn remove_network(&self, full_name: &str, cancel: &CancelSignal) -> Result<()> {
        self.run(&["network", "rm", full_name], cancel)
            .await
            .map(|_| ())
    }

    async fn remove_volume(
        &self,
        full_name: &str,
        force: bool,
        cancel: &CancelSignal,
    ) -> Result<()> {
        let mut args = vec!["volume", "rm"];
        if force {
            args.push("-f");
        }
        args.push(full_name);
        self.run(&args, cancel).await.map(|_| ())
    }
}

/// One JSON object per line, as printed by `ps --format '{{json .}}'`.
fn parse_ps_output(stdout: &str) -> Result<Vec<Container>> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| -> Result<Container> {
            let entry: PsEntry = serde_json::from_str(line)?;
            let name = entry
                .names
                .split(',')
                .map(str::trim)
                .find(|n| !n.is_empty())
                .map(str::to_string);
            Ok(Container { id: entry.id, name })
        })
        .collect()
}

fn parse_labels(stdout: &str) -> Result<HashMap<String, String>> {
    let labels: Option<HashMap<String, String>> = serde_json::from_str(stdout.trim())?;
    Ok(labels.unwrap_or_default())
}

fn contains_name(stdout: &str, name: &str) -> bool {
    stdout.lines().any(|line| line.trim() == name)
}
