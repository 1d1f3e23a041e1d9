//! Background tasks for Linear operations.
//!
//! The UI never awaits the network. `App::update` returns an [`Effect`],
//! the main loop hands it to [`TaskSpawner::dispatch`], and the spawned task
//! reports back through an unbounded channel as an [`ApiMessage`]. The main
//! loop drains the channel with `try_recv()` between frames.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::Effect;
use crate::domain::{Issue, IssueDraft};
use crate::error::AppError;
use crate::service::{LinearService, WorkspaceData};

/// Results of background operations.
#[derive(Debug)]
pub enum ApiMessage {
    /// Issues and projects for the dashboard.
    DataLoaded(Result<WorkspaceData, AppError>),

    /// A single issue re-fetched after a change.
    IssueRefreshed {
        linear_id: String,
        result: Result<Issue, AppError>,
    },

    IssueCreated(Result<Issue, AppError>),

    IssueUpdated {
        linear_id: String,
        result: Result<Issue, AppError>,
    },
}

/// Create the channel background tasks report on.
pub fn create_task_channel() -> (
    mpsc::UnboundedSender<ApiMessage>,
    mpsc::UnboundedReceiver<ApiMessage>,
) {
    mpsc::unbounded_channel()
}

/// Spawns service calls onto the tokio runtime.
///
/// Without a service (no API key configured) every operation reports
/// [`AppError::MissingApiKey`] instead of touching the network.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
    service: Option<Arc<LinearService>>,
}

impl TaskSpawner {
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>, service: Option<Arc<LinearService>>) -> Self {
        Self { tx, service }
    }

    /// Run whatever `effect` asks for.
    ///
    /// `Effect::Quit` is the main loop's concern and is ignored here.
    pub fn dispatch(&self, effect: Effect) {
        match effect {
            Effect::None | Effect::Quit => {}
            Effect::LoadData => self.spawn_load(),
            Effect::RefreshIssue(linear_id) => self.spawn_refresh_issue(linear_id),
            Effect::CreateIssue(draft) => self.spawn_create_issue(draft),
            Effect::UpdateIssue { linear_id, draft } => self.spawn_update_issue(linear_id, draft),
        }
    }

    fn send(tx: &mpsc::UnboundedSender<ApiMessage>, message: ApiMessage) {
        if tx.send(message).is_err() {
            warn!("Task result dropped: receiver closed");
        }
    }

    /// Load issues and projects, bootstrapping the service if needed.
    pub fn spawn_load(&self) {
        debug!("Spawning workspace load");
        let tx = self.tx.clone();
        let service = self.service.clone();
        tokio::spawn(async move {
            let result = match service {
                Some(service) => service.load_workspace_data().await.map_err(AppError::from),
                None => Err(AppError::MissingApiKey),
            };
            Self::send(&tx, ApiMessage::DataLoaded(result));
        });
    }

    /// Re-fetch one issue by its Linear ID.
    pub fn spawn_refresh_issue(&self, linear_id: String) {
        let tx = self.tx.clone();
        let service = self.service.clone();
        tokio::spawn(async move {
            let result = match service {
                Some(service) => service.get_issue(&linear_id).await.map_err(AppError::from),
                None => Err(AppError::MissingApiKey),
            };
            Self::send(&tx, ApiMessage::IssueRefreshed { linear_id, result });
        });
    }

    pub fn spawn_create_issue(&self, draft: IssueDraft) {
        let tx = self.tx.clone();
        let service = self.service.clone();
        tokio::spawn(async move {
            let result = match service {
                Some(service) => service.create_issue(&draft).await.map_err(AppError::from),
                None => Err(AppError::MissingApiKey),
            };
            Self::send(&tx, ApiMessage::IssueCreated(result));
        });
    }

    pub fn spawn_update_issue(&self, linear_id: String, draft: IssueDraft) {
        let tx = self.tx.clone();
        let service = self.service.clone();
        tokio::spawn(async move {
            let result = match service {
                Some(service) => service
                    .update_issue(&linear_id, &draft)
                    .await
                    .map_err(AppError::from),
                None => Err(AppError::MissingApiKey),
            };
            Self::send(&tx, ApiMessage::IssueUpdated { linear_id, result });
        });
    }
}
