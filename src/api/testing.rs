//! Test doubles shared by the client and service tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::client::LinearClient;
use super::context::RequestContext;
use super::error::{ApiError, Result};
use super::ratelimit::RateLimiter;
use super::retry::{RetryConfig, RetryExecutor};
use super::transport::{GraphqlRequest, GraphqlTransport};

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub struct StubTransport {
    requests: Mutex<Vec<GraphqlRequest>>,
    responses: Mutex<VecDeque<Result<Value>>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, data: Value) {
        self.responses.lock().unwrap().push_back(Ok(data));
    }

    pub fn push_err(&self, err: ApiError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<GraphqlRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests whose query text contains `needle`.
    pub fn requests_matching(&self, needle: &str) -> Vec<GraphqlRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.query.contains(needle))
            .collect()
    }
}

#[async_trait]
impl GraphqlTransport for StubTransport {
    async fn execute(&self, _ctx: &RequestContext, request: &GraphqlRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::network("no stub response queued")))
    }
}

/// A client over `stub` with a roomy limiter and default retry settings.
pub fn stub_client(stub: &Arc<StubTransport>) -> LinearClient {
    let executor = RetryExecutor::new(Arc::new(RateLimiter::default()), RetryConfig::default());
    LinearClient::new(stub.clone(), executor)
}

/// A minimal issue payload as the API would return it.
pub fn issue_json(id: &str, identifier: &str, title: &str) -> Value {
    json!({
        "id": id,
        "identifier": identifier,
        "title": title,
        "description": "",
        "priority": 3,
        "createdAt": "2024-03-01T12:00:00.000Z",
        "updatedAt": "2024-03-01T12:00:00.000Z",
        "state": { "id": "s1", "name": "Todo", "type": "unstarted", "color": "#e2e2e2" },
        "assignee": null,
        "team": { "id": "t1", "name": "Engineering", "key": "ENG" },
        "project": null
    })
}

pub fn project_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "state": "started",
        "progress": 0.5,
        "startDate": "2024-01-15",
        "targetDate": null
    })
}
