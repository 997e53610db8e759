use crate::config::Settings;
use crate::models::*;
use thiserror::Error;

const PAGE_SIZE: u64 = 100;

#[derive(Error, Debug)]
pub enum JiraError {
    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("URL {url} got status: {status}\n{body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Could not decode response from {url}: {source}")]
    Decode { url: String, source: reqwest::Error },
}

pub struct JiraClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl JiraClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("https://{}", settings.hostname),
            username: settings.username.clone(),
            password: settings.password.clone(),
        }
    }

    async fn _get<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, JiraError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(query)
            .send()
            .await
            .map_err(|source| JiraError::Request { url: url.clone(), source })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let body = match serde_json::from_str::<JiraErrorResponse>(&body) {
                Ok(errors) if !errors.error_messages.is_empty() => errors.error_messages.join("\n"),
                _ => body,
            };
            return Err(JiraError::Status { url, status, body });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| JiraError::Decode { url, source })
    }

    pub async fn get_jql(&self, jql: &str) -> Result<Vec<JiraIssue>, JiraError> {
        let mut issues: Vec<JiraIssue> = Vec::new();
        let mut start_at = 0;

        loop {
            let issues_response = self
                ._get::<IssueListResponse>(
                    "/rest/api/2/search",
                    &[
                        ("jql", jql.to_string()),
                        ("startAt", start_at.to_string()),
                        ("maxResults", PAGE_SIZE.to_string()),
                    ],
                )
                .await?;

            let total = issues_response.total;
            let page_size = issues_response.issues.len() as u64;
            tracing::debug!(jql, start_at, page_size, total, "Fetched page");

            issues.extend(issues_response.issues);
            start_at += page_size;

            if page_size == 0 || start_at >= total {
                break;
            }
        }

        Ok(issues)
    }
}
