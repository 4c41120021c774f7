use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TeardownError {
    #[error("invalid network name {0:?}")]
    InvalidNetwork(String),

    #[error("invalid volume name {0:?}")]
    InvalidVolume(String),

    #[error("could not determine service order: {message}")]
    ServiceOrder { message: String },

    #[error("failed to list containers of service {service:?}: {message}")]
    ContainerLookup { service: String, message: String },

    #[error("failed to check whether {kind} {name:?} exists: {message}")]
    ExistenceCheck {
        kind: String,
        name: String,
        message: String,
    },

    #[error("teardown cancelled")]
    Cancelled,

    #[error("`{command}` failed: {message}")]
    Runtime { command: String, message: String },

    #[error("`{command}` timed out after {timeout:?}")]
    CommandTimeout { command: String, timeout: Duration },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value {value:?} for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: [{section}]")]
    MissingConfigError { section: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The project or the engine's view of it is inconsistent.
    Structural,
    /// The container runtime could not be driven.
    Runtime,
    Configuration,
    Cancelled,
}

impl TeardownError {
    pub fn runtime(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Runtime {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidNetwork(_)
            | Self::InvalidVolume(_)
            | Self::ServiceOrder { .. }
            | Self::ContainerLookup { .. }
            | Self::ExistenceCheck { .. } => ErrorCategory::Structural,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Runtime { .. }
            | Self::CommandTimeout { .. }
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorCategory::Runtime,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Structural => 1,
            ErrorCategory::Runtime => 3,
            ErrorCategory::Configuration => 2,
            ErrorCategory::Cancelled => 130,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Structural => format!("Teardown aborted: {}", self),
            ErrorCategory::Runtime => format!("Container runtime error: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Cancelled => "Teardown was cancelled before it finished".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidNetwork(_) | Self::InvalidVolume(_) => {
                "Check that every network and volume referenced is declared in the project"
            }
            Self::ServiceOrder { .. } => "Make sure each service is listed exactly once",
            Self::ContainerLookup { .. } | Self::ExistenceCheck { .. } => {
                "Check that the container runtime is reachable, then run the teardown again"
            }
            Self::Cancelled => "Run the teardown again; already removed resources are skipped",
            Self::Runtime { .. } | Self::CommandTimeout { .. } | Self::IoError(_) => {
                "Verify the runtime binary is installed and the daemon is running"
            }
            Self::SerializationError(_) => "The runtime returned output in an unexpected format",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => "Fix the configuration file and try again",
            Self::MissingConfigError { .. } => "Add the missing section to the project file",
        }
    }
}

pub type Result<T> = std::result::Result<T, TeardownError>;
