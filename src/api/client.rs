//! Linear API client implementation.
//!
//! One method per GraphQL operation. Every method runs its transport call
//! through the [`RetryExecutor`], so rate limiting and backoff apply
//! uniformly.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, instrument};

use super::context::RequestContext;
use super::diagnostics::DiagnosticSink;
use super::error::{ApiError, Result};
use super::retry::RetryExecutor;
use super::transport::{GraphqlRequest, GraphqlTransport, HttpTransport};
use super::types::{
    Comment, CommentCreateData, CreateIssueInput, IssueCreateData, IssueData, IssueNode,
    IssueState, IssueUpdateData, IssuesData, ProjectNode, ProjectsData, Team, TeamStatesData,
    TeamsData, UpdateIssueInput, User, UsersData, Viewer, ViewerData,
};

/// Largest page Linear will return for a single connection.
const MAX_PAGE_SIZE: u32 = 250;

const ISSUE_FIELDS: &str = r#"
    id
    identifier
    title
    description
    priority
    createdAt
    updatedAt
    state { id name type color }
    assignee { id name email avatarUrl }
    team { id name key }
    project { id name }
"#;

const VIEWER_QUERY: &str = r#"
query ValidateApiKey {
  viewer { id name email }
}
"#;

const PROJECTS_QUERY: &str = r#"
query Projects {
  projects {
    nodes { id name description state progress startDate targetDate }
    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
  }
}
"#;

const TEAMS_QUERY: &str = r#"
query Teams {
  teams {
    nodes { id name description key }
    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
  }
}
"#;

const USERS_QUERY: &str = r#"
query Users {
  users {
    nodes { id name email avatarUrl }
    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
  }
}
"#;

const TEAM_STATES_QUERY: &str = r#"
query TeamStates($teamId: String!) {
  team(id: $teamId) {
    states { nodes { id name type color } }
  }
}
"#;

const COMMENT_CREATE_MUTATION: &str = r#"
mutation CommentCreate($input: CommentCreateInput!) {
  commentCreate(input: $input) {
    success
    comment { id body createdAt user { id name email avatarUrl } }
  }
}
"#;

fn issues_query() -> String {
    format!(
        r#"
query Issues($teamId: ID!, $first: Int!) {{
  issues(filter: {{ team: {{ id: {{ eq: $teamId }} }} }}, first: $first) {{
    nodes {{ {ISSUE_FIELDS} }}
    pageInfo {{ hasNextPage hasPreviousPage startCursor endCursor }}
  }}
}}
"#
    )
}

fn issue_query() -> String {
    format!(
        r#"
query Issue($id: String!) {{
  issue(id: $id) {{ {ISSUE_FIELDS} }}
}}
"#
    )
}

fn issue_create_mutation() -> String {
    format!(
        r#"
mutation IssueCreate($input: IssueCreateInput!) {{
  issueCreate(input: $input) {{
    success
    issue {{ {ISSUE_FIELDS} }}
  }}
}}
"#
    )
}

fn issue_update_mutation() -> String {
    format!(
        r#"
mutation IssueUpdate($id: String!, $input: IssueUpdateInput!) {{
  issueUpdate(id: $id, input: $input) {{
    success
    issue {{ {ISSUE_FIELDS} }}
  }}
}}
"#
    )
}

/// The Linear API client.
#[derive(Clone)]
pub struct LinearClient {
    transport: Arc<dyn GraphqlTransport>,
    executor: RetryExecutor,
}

impl std::fmt::Debug for LinearClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearClient")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl LinearClient {
    pub fn new(transport: Arc<dyn GraphqlTransport>, executor: RetryExecutor) -> Self {
        Self {
            transport,
            executor,
        }
    }

    /// Create a client for the public endpoint with default retry settings.
    pub fn from_api_key(api_key: &str, sink: Arc<dyn DiagnosticSink>) -> Result<Self> {
        let transport = HttpTransport::new(api_key)?.with_sink(sink);
        Ok(Self::new(Arc::new(transport), RetryExecutor::default()))
    }

    /// Run one request with retry and decode its `data` payload.
    async fn request<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        request: GraphqlRequest,
    ) -> Result<T> {
        let data = self
            .executor
            .execute_with_retry(ctx, || self.transport.execute(ctx, &request))
            .await?;

        serde_json::from_value(data)
            .map_err(|e| ApiError::api(format!("failed to decode response data: {}", e), 200))
    }

    /// Check the API key by fetching the authenticated user.
    #[instrument(skip_all)]
    pub async fn validate_api_key(&self, ctx: &RequestContext) -> Result<Viewer> {
        let data: ViewerData = self
            .request(ctx, GraphqlRequest::without_variables(VIEWER_QUERY))
            .await?;
        info!("API key valid for {} ({})", data.viewer.name, data.viewer.email);
        Ok(data.viewer)
    }

    /// Fetch up to `limit` issues for a team.
    #[instrument(skip(self, ctx))]
    pub async fn get_issues(
        &self,
        ctx: &RequestContext,
        team_id: &str,
        limit: u32,
    ) -> Result<Vec<IssueNode>> {
        let variables = json!({ "teamId": team_id, "first": limit.min(MAX_PAGE_SIZE) });
        let data: IssuesData = self
            .request(ctx, GraphqlRequest::new(issues_query(), variables))
            .await?;
        debug!("Fetched {} issues", data.issues.nodes.len());
        Ok(data.issues.nodes)
    }

    /// Fetch a single issue by internal ID.
    #[instrument(skip(self, ctx))]
    pub async fn get_issue(&self, ctx: &RequestContext, id: &str) -> Result<IssueNode> {
        let data: IssueData = self
            .request(ctx, GraphqlRequest::new(issue_query(), json!({ "id": id })))
            .await?;
        data.issue
            .ok_or_else(|| ApiError::api(format!("issue {} not found", id), 404))
    }

    #[instrument(skip_all)]
    pub async fn get_projects(&self, ctx: &RequestContext) -> Result<Vec<ProjectNode>> {
        let data: ProjectsData = self
            .request(ctx, GraphqlRequest::without_variables(PROJECTS_QUERY))
            .await?;
        debug!("Fetched {} projects", data.projects.nodes.len());
        Ok(data.projects.nodes)
    }

    #[instrument(skip_all)]
    pub async fn get_teams(&self, ctx: &RequestContext) -> Result<Vec<Team>> {
        let data: TeamsData = self
            .request(ctx, GraphqlRequest::without_variables(TEAMS_QUERY))
            .await?;
        debug!("Fetched {} teams", data.teams.nodes.len());
        Ok(data.teams.nodes)
    }

    #[instrument(skip_all)]
    pub async fn get_users(&self, ctx: &RequestContext) -> Result<Vec<User>> {
        let data: UsersData = self
            .request(ctx, GraphqlRequest::without_variables(USERS_QUERY))
            .await?;
        Ok(data.users.nodes)
    }

    /// Workflow states available to a team.
    #[instrument(skip(self, ctx))]
    pub async fn get_issue_states(
        &self,
        ctx: &RequestContext,
        team_id: &str,
    ) -> Result<Vec<IssueState>> {
        let data: TeamStatesData = self
            .request(
                ctx,
                GraphqlRequest::new(TEAM_STATES_QUERY, json!({ "teamId": team_id })),
            )
            .await?;
        Ok(data.team.map(|team| team.states.nodes).unwrap_or_default())
    }

    #[instrument(skip_all, fields(title = %input.title))]
    pub async fn create_issue(
        &self,
        ctx: &RequestContext,
        input: &CreateIssueInput,
    ) -> Result<IssueNode> {
        let data: IssueCreateData = self
            .request(
                ctx,
                GraphqlRequest::new(issue_create_mutation(), json!({ "input": input })),
            )
            .await?;
        match data.issue_create {
            payload if payload.success => payload
                .issue
                .ok_or_else(|| ApiError::api("issue missing from create response", 200)),
            _ => Err(ApiError::api("failed to create issue", 200)),
        }
    }

    #[instrument(skip(self, ctx, input))]
    pub async fn update_issue(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: &UpdateIssueInput,
    ) -> Result<IssueNode> {
        let data: IssueUpdateData = self
            .request(
                ctx,
                GraphqlRequest::new(
                    issue_update_mutation(),
                    json!({ "id": id, "input": input }),
                ),
            )
            .await?;
        match data.issue_update {
            payload if payload.success => payload
                .issue
                .ok_or_else(|| ApiError::api("issue missing from update response", 200)),
            _ => Err(ApiError::api("failed to update issue", 200)),
        }
    }

    #[instrument(skip(self, ctx, body))]
    pub async fn create_comment(
        &self,
        ctx: &RequestContext,
        issue_id: &str,
        body: &str,
    ) -> Result<Comment> {
        let variables = json!({ "input": { "issueId": issue_id, "body": body } });
        let data: CommentCreateData = self
            .request(ctx, GraphqlRequest::new(COMMENT_CREATE_MUTATION, variables))
            .await?;
        match data.comment_create {
            payload if payload.success => payload
                .comment
                .ok_or_else(|| ApiError::api("comment missing from create response", 200)),
            _ => Err(ApiError::api("failed to create comment", 200)),
        }
    }
}
