//! UI-facing issue and project models.
//!
//! The API layer speaks Linear's wire shapes; everything the views and the
//! app state hold is converted into these flatter types first.

use chrono::{DateTime, NaiveDate, Utc};

use crate::api::types::{IssueNode, ProjectNode};

/// Assignee label used when an issue has nobody assigned.
pub const UNASSIGNED: &str = "Unassigned";

/// Priority labels offered in forms, in Linear's numeric order.
pub const PRIORITY_LABELS: [&str; 5] = ["None", "Urgent", "High", "Normal", "Low"];

/// An issue as shown in the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// Display identifier, e.g. `ENG-35`. Used for UI identity.
    pub id: String,
    /// Internal ID used for mutations and in-place updates.
    pub linear_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub assignee: String,
    pub created_at: DateTime<Utc>,
}

/// A project as shown in the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    /// Completion ratio in `[0, 1]`.
    pub progress: f64,
    /// Derived from the project's start date. `None` when absent or malformed.
    pub created_at: Option<NaiveDate>,
}

/// Human-entered issue fields from the create/edit form.
///
/// Labels are unresolved: priority is a label such as "High" and assignee
/// and status are display names. Empty strings mean "leave unset".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub assignee: String,
}

impl IssueDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: impl Into<String>,
        assignee: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: String::new(),
            priority: priority.into(),
            assignee: assignee.into(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Prefill from an existing issue for editing.
    pub fn from_issue(issue: &Issue) -> Self {
        Self {
            title: issue.title.clone(),
            description: issue.description.clone(),
            status: issue.status.clone(),
            priority: issue.priority.clone(),
            assignee: issue.assignee.clone(),
        }
    }
}

impl From<IssueNode> for Issue {
    fn from(node: IssueNode) -> Self {
        let id = if node.identifier.is_empty() {
            node.id.clone()
        } else {
            node.identifier
        };

        Self {
            id,
            linear_id: node.id,
            title: node.title,
            description: node.description.unwrap_or_default(),
            status: node.state.map(|state| state.name).unwrap_or_default(),
            priority: priority_to_label(node.priority).to_string(),
            assignee: node
                .assignee
                .map(|user| user.name)
                .unwrap_or_else(|| UNASSIGNED.to_string()),
            created_at: node.created_at,
        }
    }
}

impl From<ProjectNode> for Project {
    fn from(node: ProjectNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            description: node.description.unwrap_or_default(),
            status: node.state.unwrap_or_default(),
            progress: node.progress.clamp(0.0, 1.0),
            created_at: node.start_date.as_deref().and_then(parse_project_date),
        }
    }
}

/// Parse a `YYYY-MM-DD` date. Anything else yields `None`.
pub fn parse_project_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Map Linear's numeric priority to its label.
pub fn priority_to_label(priority: u8) -> &'static str {
    match priority {
        0 => "None",
        1 => "Urgent",
        2 => "High",
        3 => "Normal",
        4 => "Low",
        _ => "Unknown",
    }
}

/// Map a priority label to Linear's numeric scale. Unknown labels map to 0.
pub fn priority_from_label(label: &str) -> u8 {
    match label.trim().to_ascii_lowercase().as_str() {
        "urgent" => 1,
        "high" => 2,
        "normal" | "medium" => 3,
        "low" => 4,
        _ => 0,
    }
}
