use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Deserialize, Serialize)]
pub struct IssueListResponse {
    pub total: u64,
    pub issues: Vec<JiraIssue>,
}

#[derive(Deserialize)]
pub struct JiraErrorResponse {
    #[serde(rename = "errorMessages", default)]
    pub error_messages: Vec<String>,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct JiraIssue {
    pub key: String,
    pub fields: JiraIssueFields,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct JiraIssueFields {
    #[serde(rename = "issuetype")]
    pub issue_type: JiraNamed,
    pub status: JiraNamed,
    pub priority: Option<JiraNamed>,
    pub created: String,
    #[serde(rename = "resolutiondate")]
    pub resolution_date: Option<String>,
    /// Custom fields, story points among them. The field id differs per Jira instance.
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct JiraNamed {
    pub name: String,
}

/// An issue as seen by the metrics layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub key: String,
    pub issue_type: String,
    pub status: String,
    pub priority: Option<String>,
    pub created: String,
    pub resolved: Option<String>,
    pub story_points: Option<u64>,
}

impl Issue {
    pub fn from_jira(issue: JiraIssue, story_points_field: &str) -> Self {
        let story_points = issue
            .fields
            .custom
            .get(story_points_field)
            .and_then(|value| match value {
                serde_json::Value::String(points) => points.trim().parse::<f64>().ok(),
                other => other.as_f64(),
            })
            .filter(|points| *points > 0.0)
            .map(|points| points.trunc() as u64);

        Self {
            key: issue.key,
            issue_type: issue.fields.issue_type.name,
            status: issue.fields.status.name,
            priority: issue.fields.priority.map(|p| p.name),
            created: issue.fields.created,
            resolved: issue.fields.resolution_date,
            story_points,
        }
    }

    pub fn is_epic(&self) -> bool {
        self.issue_type == "Epic"
    }
}

/// One entry of the projects YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub name: String,
    pub query: String,
    /// Week start date mapped to comma separated developers per day.
    #[serde(default)]
    pub dev_days: Option<BTreeMap<NaiveDate, String>>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub disabled: bool,
}
