use crate::cache::*;
use crate::jira_client::*;
use crate::models::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error(transparent)]
    Jira(#[from] JiraError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

pub struct Collector {
    jira_client: JiraClient,
    cache: QueryCache,
    story_points_field: String,
}

impl Collector {
    pub fn new(jira_client: JiraClient, cache: QueryCache, story_points_field: impl Into<String>) -> Self {
        Self {
            jira_client,
            cache,
            story_points_field: story_points_field.into(),
        }
    }

    /// Runs `query`, or reads its cached result when `use_cache` is set and one exists.
    /// Fresh results always overwrite the cache.
    pub async fn collect_issues(&self, query: &str, use_cache: bool) -> Result<Vec<Issue>, CollectError> {
        let cached = if use_cache { self.cache.load(query)? } else { None };

        let raw_issues = match cached {
            Some(issues) => {
                tracing::info!(query, "Fetching from cache");
                issues
            }
            None => {
                tracing::debug!(query, "Querying Jira");
                let issues = self.jira_client.get_jql(query).await?;
                self.cache.store(query, &issues)?;
                issues
            }
        };

        Ok(to_issues(raw_issues, &self.story_points_field))
    }
}

/// Converts raw Jira results, leaving out epics.
pub fn to_issues(raw_issues: Vec<JiraIssue>, story_points_field: &str) -> Vec<Issue> {
    raw_issues
        .into_iter()
        .map(|issue| Issue::from_jira(issue, story_points_field))
        .filter(|issue| !issue.is_epic())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epics_are_left_out() {
        let raw: Vec<JiraIssue> = serde_json::from_value(serde_json::json!([
            {"key": "WEB-1", "fields": {"issuetype": {"name": "Epic"}, "status": {"name": "Open"}, "created": "2024-01-01"}},
            {"key": "WEB-2", "fields": {"issuetype": {"name": "Story"}, "status": {"name": "Open"}, "created": "2024-01-01"}}
        ]))
        .unwrap();

        let issues = to_issues(raw, "customfield_10005");

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key, "WEB-2");
    }
}
