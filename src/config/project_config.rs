use crate::adapters::cli_runtime::{DEFAULT_BINARY, DEFAULT_TIMEOUT};
use crate::domain::model::{Network, Project, Volume};
use crate::utils::error::{Result, TeardownError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Network added when a project declares none, as compose does.
pub const DEFAULT_NETWORK: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    pub runtime: Option<RuntimeConfig>,
    #[serde(default)]
    pub networks: BTreeMap<String, ResourceConfig>,
    #[serde(default)]
    pub volumes: BTreeMap<String, ResourceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    pub name: String,
    /// Services in dependency (creation) order.
    #[serde(default)]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub binary: Option<String>,
    pub namespace: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Full name override. Defaults to `<project>_<short>`, or to the short
    /// name itself for external resources.
    pub name: Option<String>,
    #[serde(default)]
    pub external: bool,
}

impl ProjectConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TeardownError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        let parse_error = |e: toml::de::Error| TeardownError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        };

        let table: toml::Table = toml::from_str(&processed_content).map_err(parse_error)?;
        if !table.contains_key("project") {
            return Err(TeardownError::MissingConfigError {
                section: "project".to_string(),
            });
        }

        toml::Value::Table(table).try_into().map_err(parse_error)
    }

    /// 替換環境變數 (例如 ${PROJECT_NAME})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| TeardownError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_resource_name("project.name", &self.project.name)?;

        for service in &self.project.services {
            validation::validate_resource_name("project.services", service)?;
        }
        validation::validate_unique("project.services", &self.project.services)?;

        for (short_name, network) in &self.networks {
            let field = format!("networks.{}", short_name);
            validation::validate_resource_name(&field, short_name)?;
            if let Some(name) = &network.name {
                validation::validate_resource_name(&field, name)?;
            }
        }

        for (short_name, volume) in &self.volumes {
            let field = format!("volumes.{}", short_name);
            validation::validate_resource_name(&field, short_name)?;
            if let Some(name) = &volume.name {
                validation::validate_resource_name(&field, name)?;
            }
        }

        if let Some(runtime) = &self.runtime {
            if let Some(binary) = &runtime.binary {
                validation::validate_non_empty_string("runtime.binary", binary)?;
            }
            if let Some(timeout) = runtime.timeout_seconds {
                validation::validate_range("runtime.timeout_seconds", timeout, 1, 3600)?;
            }
        }

        Ok(())
    }

    pub fn runtime_binary(&self) -> &str {
        self.runtime
            .as_ref()
            .and_then(|r| r.binary.as_deref())
            .unwrap_or(DEFAULT_BINARY)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.runtime.as_ref().and_then(|r| r.namespace.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        self.runtime
            .as_ref()
            .and_then(|r| r.timeout_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    fn full_name(&self, short_name: &str, resource: &ResourceConfig) -> String {
        match &resource.name {
            Some(name) => name.clone(),
            None if resource.external => short_name.to_string(),
            None => format!("{}_{}", self.project.name, short_name),
        }
    }

    pub fn to_project(&self) -> Project {
        let mut project = Project::new(&self.project.name);
        project.services = self.project.services.clone();

        for (short_name, resource) in &self.networks {
            let network = Network {
                name: self.full_name(short_name, resource),
                external: resource.external,
            };
            project.networks.insert(short_name.clone(), network);
        }
        if project.networks.is_empty() && !project.services.is_empty() {
            let implicit = ResourceConfig::default();
            project.networks.insert(
                DEFAULT_NETWORK.to_string(),
                Network::owned(self.full_name(DEFAULT_NETWORK, &implicit)),
            );
        }

        for (short_name, resource) in &self.volumes {
            let volume = Volume {
                name: self.full_name(short_name, resource),
                external: resource.external,
            };
            project.volumes.insert(short_name.clone(), volume);
        }

        project
    }
}

impl Validate for ProjectConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_project_config() {
        let toml_content = r#"
[project]
name = "wordpress"
services = ["db", "wordpress"]

[runtime]
binary = "docker"
timeout_seconds = 30

[networks.default]

[networks.shared]
external = true

[volumes.db_data]
"#;

        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.runtime_binary(), "docker");
        assert_eq!(config.timeout(), Duration::from_secs(30));

        let project = config.to_project();
        assert_eq!(project.services, vec!["db", "wordpress"]);
        assert_eq!(
            project.networks["default"],
            Network::owned("wordpress_default")
        );
        assert_eq!(project.networks["shared"], Network::external("shared"));
        assert_eq!(project.volumes["db_data"], Volume::owned("wordpress_db_data"));
    }

    #[test]
    fn test_implicit_default_network() {
        let toml_content = r#"
[project]
name = "blog"
services = ["web"]
"#;

        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.runtime_binary(), DEFAULT_BINARY);

        let project = config.to_project();
        assert_eq!(project.network_names(), vec![DEFAULT_NETWORK]);
        assert_eq!(project.networks[DEFAULT_NETWORK].name, "blog_default");
        assert!(project.volumes.is_empty());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("COMPOSE_TEARDOWN_TEST_PROJECT", "shop");

        let toml_content = r#"
[project]
name = "${COMPOSE_TEARDOWN_TEST_PROJECT}"
services = ["api"]
"#;

        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.project.name, "shop");

        std::env::remove_var("COMPOSE_TEARDOWN_TEST_PROJECT");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[project]
name = "blog"
services = ["web", "db", "web"]
"#;

        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[project]
name = "blog"

[runtime]
timeout_seconds = 0
"#;

        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_project_section() {
        let toml_content = r#"
[networks.default]
"#;

        match ProjectConfig::from_toml_str(toml_content) {
            Err(TeardownError::MissingConfigError { section }) => assert_eq!(section, "project"),
            other => panic!("expected a missing section error, got {:?}", other),
        }

        let result = ProjectConfig::from_toml_str("[project\nname = 1");
        assert!(matches!(
            result,
            Err(TeardownError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[project]
name = "file-test"
services = ["cache"]

[volumes.cache_data]
name = "shared_cache"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = ProjectConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.project.name, "file-test");
        assert_eq!(config.to_project().volumes["cache_data"].name, "shared_cache");
    }
}
