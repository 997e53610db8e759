use crate::metrics::PriorityFilter;
use crate::models::Project;
use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("JIRA_HOSTNAME should not start with \"http\": {0}")]
    HostnameWithScheme(String),
    #[error("Could not read projects file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not parse projects file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub cache_directory: PathBuf,
    pub priorities: PriorityFilter,
    /// Lower case.
    pub done_statuses: BTreeSet<String>,
    pub story_points_field: String,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn comma_separated(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

impl Settings {
    /// Reads the Jira connection and filtering settings from the environment.
    /// Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let hostname = required("JIRA_HOSTNAME")?;
        if hostname.starts_with("http://") || hostname.starts_with("https://") {
            return Err(ConfigError::HostnameWithScheme(hostname));
        }

        let priorities = optional("JIRA_PRIORITIES", "P0,P1,P2");
        let priorities = if comma_separated(&priorities).next().is_none() {
            PriorityFilter::any()
        } else {
            PriorityFilter::only(comma_separated(&priorities))
        };

        Ok(Self {
            hostname,
            username: required("JIRA_USERNAME")?,
            password: required("JIRA_PASSWORD")?,
            cache_directory: PathBuf::from(optional("JIRA_CACHE_DIR", "cache")),
            priorities,
            done_statuses: comma_separated(&optional("JIRA_DONE_STATUSES", "done"))
                .map(str::to_lowercase)
                .collect(),
            story_points_field: optional("JIRA_STORY_POINTS_FIELD", "customfield_10005"),
        })
    }
}

/// Parses the projects YAML, dropping disabled projects.
pub fn parse_projects(yaml: &str) -> Result<Vec<Project>, ConfigError> {
    let projects: Vec<Project> = serde_yaml::from_str(yaml)?;
    Ok(projects.into_iter().filter(|project| !project.disabled).collect())
}

pub fn load_projects(path: &Path) -> Result<Vec<Project>, ConfigError> {
    let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_projects(&yaml)
}
