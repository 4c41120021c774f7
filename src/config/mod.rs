pub mod project_config;

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use std::path::PathBuf;

pub use project_config::ProjectConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "compose-teardown")]
#[command(about = "Stop and remove a compose project's containers, networks and volumes")]
pub struct CliConfig {
    /// Path to the project TOML file
    #[arg(short, long, default_value = "compose-teardown.toml")]
    pub config: PathBuf,

    /// Also remove named volumes and anonymous container volumes
    #[arg(short = 'v', long)]
    pub volumes: bool,

    /// Log what would be removed without removing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Override the runtime binary (nerdctl, docker, podman)
    #[arg(long)]
    pub runtime: Option<String>,

    /// Override the runtime namespace
    #[arg(long)]
    pub namespace: Option<String>,

    /// Override the per-command timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the teardown report as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Command line flags win over the file.
    pub fn apply_overrides(&self, config: &mut ProjectConfig) {
        let runtime = config.runtime.get_or_insert_with(Default::default);
        if let Some(binary) = &self.runtime {
            runtime.binary = Some(binary.clone());
        }
        if let Some(namespace) = &self.namespace {
            runtime.namespace = Some(namespace.clone());
        }
        if let Some(timeout) = self.timeout {
            runtime.timeout_seconds = Some(timeout);
        }
    }
}
