use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Phase, Priority, TaskStatus};
use crate::state::LeaseTable;

/// The whole persisted project document. Every store lives inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub enabled_features: BTreeSet<String>,
    /// Agent registry, opaque to this crate
    #[serde(default)]
    pub agents: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub task_locks: LeaseTable,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub assignee: Option<String>,
    pub feature: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub feature: Option<String>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub feature: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status == status)
            && self
                .feature
                .as_deref()
                .is_none_or(|feature| task.feature.as_deref() == Some(feature))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    pub title: String,
    pub description: String,
    pub rationale: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDecision {
    pub id: String,
    pub title: String,
    pub description: String,
    pub rationale: String,
}

/// Counts shown by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub code: String,
    pub phase: Phase,
    pub enabled_features: Vec<String>,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub agents: Vec<String>,
    pub locks: usize,
    pub live_locks: usize,
}
