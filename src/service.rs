//! Domain operations over the Linear API.
//!
//! [`LinearService`] owns the team/user metadata used to resolve
//! human-entered names into IDs, and the staleness clock for that metadata.
//! Every public operation runs under its own 30 second deadline.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::types::{non_empty, CreateIssueInput, IssueState, Team, UpdateIssueInput, User};
use crate::api::{ApiError, CancelHandle, ErrorKind, LinearClient, RequestContext};
use crate::domain::{priority_from_label, Issue, IssueDraft, Project, UNASSIGNED};

/// Issues fetched per load.
pub const ISSUE_PAGE_SIZE: u32 = 50;

/// Deadline for each public operation.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Age after which cached team/user metadata is considered stale.
pub const STALE_AFTER: Duration = Duration::from_secs(5 * 60);

const NO_DEFAULT_TEAM: &str = "no default team available - please check your Linear workspace access";

/// An API error with the operation that produced it.
///
/// The wrapped error is never re-classified; [`ServiceError::kind`] reports
/// the original kind.
#[derive(Debug, Clone, Error)]
#[error("{context}: {source}")]
pub struct ServiceError {
    context: String,
    source: ApiError,
}

impl ServiceError {
    pub fn new(context: impl Into<String>, source: ApiError) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }

    fn validation(context: &str, message: &str) -> Self {
        Self::new(context, ApiError::validation(message))
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind
    }

    pub fn api_error(&self) -> &ApiError {
        &self.source
    }
}

/// Issues and projects for the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceData {
    pub issues: Vec<Issue>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Default)]
struct WorkspaceCache {
    teams: Vec<Team>,
    users: Vec<User>,
    default_team: Option<Team>,
    last_fetch: Option<Instant>,
}

/// Linear operations used by the application.
#[derive(Debug)]
pub struct LinearService {
    client: LinearClient,
    cache: RwLock<WorkspaceCache>,
    base_context: RequestContext,
    shutdown: CancelHandle,
}

impl LinearService {
    pub fn new(client: LinearClient) -> Self {
        let (base_context, shutdown) = RequestContext::background().cancellable();
        Self {
            client,
            cache: RwLock::new(WorkspaceCache::default()),
            base_context,
            shutdown,
        }
    }

    /// Cancel every in-flight operation. Backoff waits end with a
    /// `Cancelled` error instead of retrying.
    pub fn shutdown(&self) {
        debug!("Cancelling in-flight Linear requests");
        self.shutdown.cancel();
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, WorkspaceCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, WorkspaceCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn context(&self) -> RequestContext {
        self.base_context.clone().deadline_in(REQUEST_TIMEOUT)
    }

    /// Validate the key, then load teams and users.
    ///
    /// The first team becomes the default. Nothing is cached unless every
    /// step succeeds.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<(), ServiceError> {
        let ctx = self.context();

        let viewer = self
            .client
            .validate_api_key(&ctx)
            .await
            .map_err(|e| ServiceError::new("API key validation failed", e))?;
        let teams = self
            .client
            .get_teams(&ctx)
            .await
            .map_err(|e| ServiceError::new("failed to fetch teams", e))?;
        let users = self
            .client
            .get_users(&ctx)
            .await
            .map_err(|e| ServiceError::new("failed to fetch users", e))?;

        let mut cache = self.write_cache();
        cache.default_team = teams.first().cloned();
        match &cache.default_team {
            Some(team) => info!("Default team: {} ({})", team.name, team.key),
            None => warn!("Workspace has no teams"),
        }
        info!(
            "Initialized for {}: {} teams, {} users",
            viewer.name,
            teams.len(),
            users.len()
        );
        cache.teams = teams;
        cache.users = users;
        cache.last_fetch = Some(Instant::now());
        Ok(())
    }

    /// Initialize if the metadata was never fetched or has gone stale.
    pub async fn ensure_fresh(&self) -> Result<(), ServiceError> {
        if self.is_stale() {
            debug!("Workspace metadata stale, refreshing");
            self.initialize().await?;
        }
        Ok(())
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Instant::now())
    }

    pub(crate) fn is_stale_at(&self, now: Instant) -> bool {
        match self.read_cache().last_fetch {
            Some(fetched) => now.saturating_duration_since(fetched) > STALE_AFTER,
            None => true,
        }
    }

    pub fn last_fetch(&self) -> Option<Instant> {
        self.read_cache().last_fetch
    }

    pub fn teams(&self) -> Vec<Team> {
        self.read_cache().teams.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.read_cache().users.clone()
    }

    pub fn default_team(&self) -> Option<Team> {
        self.read_cache().default_team.clone()
    }

    fn require_default_team(&self, context: &str) -> Result<Team, ServiceError> {
        self.default_team()
            .ok_or_else(|| ServiceError::validation(context, NO_DEFAULT_TEAM))
    }

    /// First cached user whose name matches exactly.
    fn resolve_assignee(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() || name == UNASSIGNED {
            return None;
        }
        let cache = self.read_cache();
        let found = cache.users.iter().find(|user| user.name == name);
        if found.is_none() {
            warn!("No user named {:?}, leaving assignee unset", name);
        }
        found.map(|user| user.id.clone())
    }

    /// State ID for a status name on the default team. Lookup failures are
    /// logged and leave the status unset.
    async fn resolve_state(&self, ctx: &RequestContext, team_id: &str, name: &str) -> Option<String> {
        let name = non_empty(name)?;
        match self.client.get_issue_states(ctx, team_id).await {
            Ok(states) => {
                let found = states.into_iter().find(|state| state.name == name);
                if found.is_none() {
                    warn!("No workflow state named {:?}", name);
                }
                found.map(|state| state.id)
            }
            Err(err) => {
                warn!("Could not resolve status {:?}: {}", name, err);
                None
            }
        }
    }

    fn priority(label: &str) -> Option<u8> {
        Some(priority_from_label(label)).filter(|priority| *priority > 0)
    }

    /// Issues for the default team, capped at [`ISSUE_PAGE_SIZE`].
    #[instrument(skip(self))]
    pub async fn get_issues(&self) -> Result<Vec<Issue>, ServiceError> {
        const CONTEXT: &str = "failed to fetch issues from Linear API";
        let team = self.require_default_team(CONTEXT)?;
        let nodes = self
            .client
            .get_issues(&self.context(), &team.id, ISSUE_PAGE_SIZE)
            .await
            .map_err(|e| ServiceError::new(CONTEXT, e))?;
        Ok(nodes.into_iter().map(Issue::from).collect())
    }

    /// One issue by internal ID.
    #[instrument(skip(self))]
    pub async fn get_issue(&self, linear_id: &str) -> Result<Issue, ServiceError> {
        self.client
            .get_issue(&self.context(), linear_id)
            .await
            .map(Issue::from)
            .map_err(|e| ServiceError::new("failed to fetch issue from Linear API", e))
    }

    #[instrument(skip(self))]
    pub async fn get_projects(&self) -> Result<Vec<Project>, ServiceError> {
        const CONTEXT: &str = "failed to fetch projects from Linear API";
        self.require_default_team(CONTEXT)?;
        let nodes = self
            .client
            .get_projects(&self.context())
            .await
            .map_err(|e| ServiceError::new(CONTEXT, e))?;
        Ok(nodes.into_iter().map(Project::from).collect())
    }

    /// Refresh metadata if needed, then fetch issues and projects.
    pub async fn load_workspace_data(&self) -> Result<WorkspaceData, ServiceError> {
        self.ensure_fresh().await?;
        let issues = self.get_issues().await?;
        let projects = self.get_projects().await?;
        Ok(WorkspaceData { issues, projects })
    }

    /// Workflow states for the default team.
    pub async fn get_issue_states(&self) -> Result<Vec<IssueState>, ServiceError> {
        const CONTEXT: &str = "failed to fetch issue states";
        let team = self.require_default_team(CONTEXT)?;
        self.client
            .get_issue_states(&self.context(), &team.id)
            .await
            .map_err(|e| ServiceError::new(CONTEXT, e))
    }

    /// Create an issue on the default team.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_issue(&self, draft: &IssueDraft) -> Result<Issue, ServiceError> {
        const CONTEXT: &str = "failed to create issue";
        let title = non_empty(&draft.title)
            .ok_or_else(|| ServiceError::validation(CONTEXT, "title is required"))?;
        let team = self.require_default_team(CONTEXT)?;
        let ctx = self.context();

        let input = CreateIssueInput {
            title,
            team_id: team.id.clone(),
            description: non_empty(&draft.description),
            priority: Self::priority(&draft.priority),
            assignee_id: self.resolve_assignee(&draft.assignee),
            state_id: self.resolve_state(&ctx, &team.id, &draft.status).await,
        };

        let node = self
            .client
            .create_issue(&ctx, &input)
            .await
            .map_err(|e| ServiceError::new(CONTEXT, e))?;
        info!("Created issue {}", node.identifier);
        Ok(Issue::from(node))
    }

    /// Apply the non-empty fields of `draft` to an existing issue.
    #[instrument(skip(self, draft))]
    pub async fn update_issue(&self, linear_id: &str, draft: &IssueDraft) -> Result<Issue, ServiceError> {
        const CONTEXT: &str = "failed to update issue";
        let ctx = self.context();

        let state_id = match non_empty(&draft.status) {
            Some(status) => {
                let team = self.require_default_team(CONTEXT)?;
                self.resolve_state(&ctx, &team.id, &status).await
            }
            None => None,
        };

        let input = UpdateIssueInput {
            title: non_empty(&draft.title),
            description: non_empty(&draft.description),
            priority: Self::priority(&draft.priority),
            assignee_id: self.resolve_assignee(&draft.assignee),
            state_id,
        };
        if input.is_empty() {
            return Err(ServiceError::validation(CONTEXT, "nothing to update"));
        }

        let node = self
            .client
            .update_issue(&ctx, linear_id, &input)
            .await
            .map_err(|e| ServiceError::new(CONTEXT, e))?;
        info!("Updated issue {}", node.identifier);
        Ok(Issue::from(node))
    }

    #[instrument(skip(self, body))]
    pub async fn create_comment(&self, issue_id: &str, body: &str) -> Result<(), ServiceError> {
        const CONTEXT: &str = "failed to create comment";
        if body.trim().is_empty() {
            return Err(ServiceError::validation(CONTEXT, "comment body is required"));
        }
        self.client
            .create_comment(&self.context(), issue_id, body)
            .await
            .map(|_| ())
            .map_err(|e| ServiceError::new(CONTEXT, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{issue_json, project_json, stub_client, StubTransport};
    use serde_json::json;
    use std::sync::Arc;

    fn push_bootstrap(stub: &StubTransport) {
        stub.push_ok(json!({ "viewer": { "id": "me", "name": "Ada", "email": "ada@example.com" } }));
        stub.push_ok(json!({ "teams": { "nodes": [
            { "id": "t1", "name": "Engineering", "key": "ENG" },
            { "id": "t2", "name": "Design", "key": "DES" }
        ] } }));
        stub.push_ok(json!({ "users": { "nodes": [
            { "id": "u1", "name": "Grace Hopper" },
            { "id": "u2", "name": "Alan Turing" },
            { "id": "u3", "name": "Alan Turing" }
        ] } }));
    }

    async fn initialized() -> (Arc<StubTransport>, LinearService) {
        let stub = StubTransport::new();
        push_bootstrap(&stub);
        let service = LinearService::new(stub_client(&stub));
        service.initialize().await.unwrap();
        (stub, service)
    }

    fn created(identifier: &str) -> serde_json::Value {
        json!({ "issueCreate": { "success": true, "issue": issue_json("new", identifier, "Fix bug") } })
    }

    #[tokio::test]
    async fn test_initialize_selects_first_team() {
        let (stub, service) = initialized().await;
        assert_eq!(stub.request_count(), 3);
        assert_eq!(service.default_team().unwrap().id, "t1");
        assert_eq!(service.teams().len(), 2);
        assert_eq!(service.users().len(), 3);
        assert!(!service.is_stale());
    }

    #[tokio::test]
    async fn test_initialize_failure_commits_nothing() {
        let stub = StubTransport::new();
        stub.push_ok(json!({ "viewer": { "id": "me", "name": "Ada" } }));
        stub.push_ok(json!({ "teams": { "nodes": [{ "id": "t1", "name": "Eng" }] } }));
        stub.push_err(ApiError::auth("authentication failed - invalid API key"));
        let service = LinearService::new(stub_client(&stub));

        let err = service.initialize().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(err.to_string().starts_with("failed to fetch users: "));
        assert!(service.default_team().is_none());
        assert!(service.teams().is_empty());
        assert!(service.is_stale());
    }

    #[tokio::test]
    async fn test_invalid_key_aborts_initialize() {
        let stub = StubTransport::new();
        stub.push_err(ApiError::auth("authentication failed - invalid API key"));
        let service = LinearService::new(stub_client(&stub));

        let err = service.initialize().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(stub.request_count(), 1);
    }

    #[tokio::test]
    async fn test_staleness_window() {
        let (_stub, service) = initialized().await;
        let fetched = service.last_fetch().unwrap();
        assert!(!service.is_stale_at(fetched + Duration::from_secs(299)));
        assert!(!service.is_stale_at(fetched + STALE_AFTER));
        assert!(service.is_stale_at(fetched + STALE_AFTER + Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_uninitialized_service_is_stale() {
        let service = LinearService::new(stub_client(&StubTransport::new()));
        assert!(service.is_stale());
        assert!(service.last_fetch().is_none());
    }

    #[tokio::test]
    async fn test_get_issues_without_default_team() {
        let stub = StubTransport::new();
        let service = LinearService::new(stub_client(&stub));
        let err = service.get_issues().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("no default team available"));
        assert_eq!(stub.request_count(), 0);
    }

    #[tokio::test]
    async fn test_get_issues_uses_default_team_and_page_size() {
        let (stub, service) = initialized().await;
        stub.push_ok(json!({ "issues": { "nodes": [
            issue_json("a", "ENG-1", "One"),
            issue_json("b", "ENG-2", "Two")
        ] } }));

        let issues = service.get_issues().await.unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].id, "ENG-1");
        assert_eq!(issues[0].linear_id, "a");
        assert_eq!(issues[0].priority, "Normal");

        let request = stub.requests_matching("query Issues").remove(0);
        let variables = request.variables.unwrap();
        assert_eq!(variables["teamId"], "t1");
        assert_eq!(variables["first"], 50);
    }

    #[tokio::test]
    async fn test_load_workspace_data_bootstraps_once() {
        let stub = StubTransport::new();
        push_bootstrap(&stub);
        stub.push_ok(json!({ "issues": { "nodes": [issue_json("a", "ENG-1", "One")] } }));
        stub.push_ok(json!({ "projects": { "nodes": [project_json("p1", "Launch")] } }));
        let service = LinearService::new(stub_client(&stub));

        let data = service.load_workspace_data().await.unwrap();
        assert_eq!(data.issues.len(), 1);
        assert_eq!(data.projects[0].name, "Launch");
        assert_eq!(stub.request_count(), 5);

        stub.push_ok(json!({ "issues": { "nodes": [] } }));
        stub.push_ok(json!({ "projects": { "nodes": [] } }));
        service.load_workspace_data().await.unwrap();
        assert_eq!(stub.request_count(), 7);
    }

    #[tokio::test]
    async fn test_create_issue_resolves_priority_and_omits_unassigned() {
        let (stub, service) = initialized().await;
        stub.push_ok(created("ENG-9"));

        let draft = IssueDraft::new("Fix bug", "", "High", "Unassigned");
        let issue = service.create_issue(&draft).await.unwrap();
        assert_eq!(issue.id, "ENG-9");

        let request = stub.requests_matching("mutation IssueCreate").remove(0);
        let input = &request.variables.unwrap()["input"];
        assert_eq!(input, &json!({ "title": "Fix bug", "teamId": "t1", "priority": 2 }));
        assert!(input.get("assigneeId").is_none());
        assert!(input.get("description").is_none());
    }

    #[tokio::test]
    async fn test_create_issue_first_exact_user_match_wins() {
        let (stub, service) = initialized().await;
        stub.push_ok(created("ENG-10"));

        let draft = IssueDraft::new("Fix bug", "Steps to reproduce", "none", "Alan Turing");
        service.create_issue(&draft).await.unwrap();

        let request = stub.requests_matching("mutation IssueCreate").remove(0);
        let input = &request.variables.unwrap()["input"];
        assert_eq!(input["assigneeId"], "u2");
        assert_eq!(input["description"], "Steps to reproduce");
        assert!(input.get("priority").is_none());
    }

    #[tokio::test]
    async fn test_create_issue_unknown_assignee_is_omitted() {
        let (stub, service) = initialized().await;
        stub.push_ok(created("ENG-11"));

        let draft = IssueDraft::new("Fix bug", "", "Low", "alan turing");
        service.create_issue(&draft).await.unwrap();

        let request = stub.requests_matching("mutation IssueCreate").remove(0);
        assert!(request.variables.unwrap()["input"].get("assigneeId").is_none());
    }

    #[tokio::test]
    async fn test_create_issue_requires_title() {
        let (stub, service) = initialized().await;
        let err = service
            .create_issue(&IssueDraft::new("   ", "", "High", ""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(stub.request_count(), 3);
    }

    #[tokio::test]
    async fn test_update_issue_resolves_status() {
        let (stub, service) = initialized().await;
        stub.push_ok(json!({ "team": { "states": { "nodes": [
            { "id": "s1", "name": "Todo", "type": "unstarted" },
            { "id": "s2", "name": "Done", "type": "completed" }
        ] } } }));
        stub.push_ok(json!({
            "issueUpdate": { "success": true, "issue": issue_json("a", "ENG-1", "One") }
        }));

        let draft = IssueDraft::default().with_status("Done");
        service.update_issue("a", &draft).await.unwrap();

        let request = stub.requests_matching("mutation IssueUpdate").remove(0);
        let variables = request.variables.unwrap();
        assert_eq!(variables["id"], "a");
        assert_eq!(variables["input"], json!({ "stateId": "s2" }));
    }

    #[tokio::test]
    async fn test_update_issue_status_lookup_failure_is_not_fatal() {
        let (stub, service) = initialized().await;
        stub.push_err(ApiError::api("unexpected status code: 400", 400));
        stub.push_ok(json!({
            "issueUpdate": { "success": true, "issue": issue_json("a", "ENG-1", "Renamed") }
        }));

        let draft = IssueDraft::new("Renamed", "", "", "").with_status("Done");
        let issue = service.update_issue("a", &draft).await.unwrap();
        assert_eq!(issue.title, "Renamed");

        let request = stub.requests_matching("mutation IssueUpdate").remove(0);
        assert_eq!(request.variables.unwrap()["input"], json!({ "title": "Renamed" }));
    }

    #[tokio::test]
    async fn test_update_issue_with_nothing_to_send() {
        let (stub, service) = initialized().await;
        let err = service
            .update_issue("a", &IssueDraft::new("", "", "None", "Unassigned"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(stub.request_count(), 3);
    }

    #[tokio::test]
    async fn test_get_issue_wraps_context() {
        let (stub, service) = initialized().await;
        stub.push_ok(json!({ "issue": null }));
        let err = service.get_issue("gone").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(err.to_string().starts_with("failed to fetch issue from Linear API: "));
    }

    #[tokio::test]
    async fn test_create_comment_requires_body() {
        let (stub, service) = initialized().await;
        assert!(service.create_comment("a", "  ").await.is_err());
        assert_eq!(stub.request_count(), 3);

        stub.push_ok(json!({ "commentCreate": { "success": true, "comment": {
            "id": "c1", "body": "Done", "createdAt": "2024-03-01T12:00:00Z"
        } } }));
        service.create_comment("a", "Done").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_backoff() {
        let (stub, service) = initialized().await;
        service.shutdown();

        let err = service.get_issue("a").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(stub.request_count(), 4);
    }
}
