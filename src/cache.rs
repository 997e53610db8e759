use crate::models::JiraIssue;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cached issues in {path} are not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Raw query results on disk, one JSON file per JQL query.
pub struct QueryCache {
    directory: PathBuf,
}

impl QueryCache {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn file_for(&self, query: &str) -> PathBuf {
        let digest = Sha256::digest(query.as_bytes());
        self.directory.join(format!("{:x}.cached.json", digest))
    }

    /// Returns `None` when the query has not been cached yet.
    pub fn load(&self, query: &str) -> Result<Option<Vec<JiraIssue>>, CacheError> {
        let path = self.file_for(query);
        if !path.is_file() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;
        let issues = serde_json::from_str(&raw).map_err(|source| CacheError::Json { path, source })?;
        Ok(Some(issues))
    }

    pub fn store(&self, query: &str, issues: &[JiraIssue]) -> Result<(), CacheError> {
        ensure_directory(&self.directory)?;
        let path = self.file_for(query);
        let raw = serde_json::to_string(issues).map_err(|source| CacheError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, raw).map_err(|source| CacheError::Io { path, source })
    }
}

fn ensure_directory(directory: &Path) -> Result<(), CacheError> {
    if !directory.exists() {
        fs::create_dir_all(directory).map_err(|source| CacheError::Io {
            path: directory.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_issues() -> Vec<JiraIssue> {
        serde_json::from_value(serde_json::json!([{
            "key": "WEB-1",
            "fields": {
                "issuetype": {"name": "Bug"},
                "status": {"name": "Done"},
                "priority": {"name": "P0"},
                "created": "2024-01-02T10:11:12.000+0000",
                "resolutiondate": "2024-01-03T10:11:12.000+0000",
                "customfield_10005": 2
            }
        }]))
        .unwrap()
    }

    #[test]
    fn cache_file_is_keyed_by_query_hash() {
        let cache = QueryCache::new("cache");
        let first = cache.file_for("project = WEB");
        let second = cache.file_for("project = SRCH");

        assert_ne!(first, second);
        assert_eq!(first, cache.file_for("project = WEB"));
        let name = first.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with(".cached.json"));
        assert_eq!(name.len(), 64 + ".cached.json".len());
    }

    #[test]
    fn missing_entry_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QueryCache::new(dir.path());
        assert!(cache.load("project = WEB").unwrap().is_none());
    }

    #[test]
    fn stored_issues_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QueryCache::new(dir.path().join("nested"));

        cache.store("project = WEB", &sample_issues()).unwrap();
        let loaded = cache.load("project = WEB").unwrap().unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].key, "WEB-1");
        assert_eq!(loaded[0].fields.custom.get("customfield_10005"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn corrupt_cache_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QueryCache::new(dir.path());
        fs::write(cache.file_for("project = WEB"), "not json").unwrap();

        assert!(matches!(cache.load("project = WEB"), Err(CacheError::Json { .. })));
    }
}
