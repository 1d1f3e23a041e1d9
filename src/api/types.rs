//! Linear GraphQL request and response types.
//!
//! These types mirror the shapes selected by the queries in `client.rs`.
//! They stay close to the wire; UI-facing conversions live in `domain`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user, returned by the `viewer` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A workflow state such as "Todo" or "In Progress".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueState {
    pub id: String,
    pub name: String,
    /// Linear's state category: `backlog`, `unstarted`, `started`, ...
    #[serde(rename = "type", default)]
    pub state_type: String,
    #[serde(default)]
    pub color: String,
}

/// A workspace member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A team. The first team returned becomes the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    /// Short prefix used in issue identifiers, e.g. `ENG`.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// The project reference embedded in an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
}

/// An issue as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueNode {
    /// Internal UUID, required for mutations.
    pub id: String,
    /// Human-readable identifier, e.g. `ENG-35`.
    #[serde(default)]
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 0 = none, 1 = urgent, 2 = high, 3 = normal, 4 = low.
    #[serde(default)]
    pub priority: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: Option<IssueState>,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
}

/// A project as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Completion ratio reported by Linear.
    #[serde(default)]
    pub progress: f64,
    /// `YYYY-MM-DD`, or absent.
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub target_date: Option<String>,
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Relay-style pagination info.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// A `{ nodes, pageInfo }` connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

/// Input for `issueCreate`. Empty optional fields are left out of the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueInput {
    pub title: String,
    pub team_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
}

/// Input for `issueUpdate`. Fields left `None` are not touched server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssueInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
}

impl UpdateIssueInput {
    /// True when nothing would be sent.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Keep a value only if it is non-empty after trimming.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// Response envelopes for individual queries.

#[derive(Debug, Deserialize)]
pub(crate) struct ViewerData {
    pub viewer: Viewer,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssuesData {
    pub issues: Connection<IssueNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueData {
    pub issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsData {
    pub projects: Connection<ProjectNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamsData {
    pub teams: Connection<Team>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersData {
    pub users: Connection<User>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamStates {
    pub states: Connection<IssueState>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamStatesData {
    pub team: Option<TeamStates>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssuePayload {
    pub success: bool,
    #[serde(default)]
    pub issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueCreateData {
    pub issue_create: IssuePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueUpdateData {
    pub issue_update: IssuePayload,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentPayload {
    pub success: bool,
    #[serde(default)]
    pub comment: Option<Comment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentCreateData {
    pub comment_create: CommentPayload,
}
