//! Plain record stores living next to the lease table: tasks, phase,
//! features and decisions.

use chrono::{DateTime, Utc};

use crate::error::{NyoError, Result};
use crate::state::LeaseTable;
use crate::types::*;

const TASK_ID_PREFIX: &str = "TASK-";

impl ProjectState {
    pub fn new(name: &str, code: Option<&str>, now: DateTime<Utc>) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NyoError::Validation("project name is required".to_string()));
        }
        let code = match code {
            Some(code) if !code.trim().is_empty() => code.trim().to_uppercase(),
            Some(_) => return Err(NyoError::Validation("project code must not be empty".to_string())),
            None => derive_code(name)?,
        };

        Ok(Self {
            name: name.to_string(),
            code,
            phase: Phase::default(),
            enabled_features: Default::default(),
            agents: Default::default(),
            tasks: Vec::new(),
            task_locks: LeaseTable::new(),
            decisions: Vec::new(),
            created_at: now,
        })
    }

    // ─── Tasks ──────────────────────────────────────────────────────────────

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn create_task(&mut self, input: NewTask, now: DateTime<Utc>) -> Result<Task> {
        if input.title.trim().is_empty() {
            return Err(NyoError::Validation("task title is required".to_string()));
        }

        let task = Task {
            id: self.next_task_id(),
            title: input.title,
            description: input.description.unwrap_or_default(),
            status: TaskStatus::Pending,
            assignee: None,
            feature: input.feature,
            priority: input.priority.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn list_tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    pub fn set_task_status(&mut self, id: &str, status: TaskStatus, now: DateTime<Utc>) -> Result<Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| NyoError::TaskNotFound(id.to_string()))?;

        task.status = status;
        task.updated_at = now;
        task.completed_at = match status {
            TaskStatus::Completed => task.completed_at.or(Some(now)),
            _ => None,
        };
        Ok(task.clone())
    }

    /// One past the highest numeric suffix among existing `TASK-NNN` ids.
    fn next_task_id(&self) -> String {
        let next = self
            .tasks
            .iter()
            .filter_map(|t| t.id.strip_prefix(TASK_ID_PREFIX))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        format!("{}{:03}", TASK_ID_PREFIX, next)
    }

    // ─── Phase ──────────────────────────────────────────────────────────────

    pub fn set_phase(&mut self, value: &str) -> Result<Phase> {
        let phase: Phase = value.parse()?;
        self.phase = phase;
        Ok(phase)
    }

    // ─── Features ───────────────────────────────────────────────────────────

    /// Every catalog feature paired with whether it is enabled.
    pub fn features(&self) -> Vec<(&'static str, bool)> {
        AVAILABLE_FEATURES
            .iter()
            .map(|f| (*f, self.enabled_features.contains(*f)))
            .collect()
    }

    /// Returns true when the feature was newly enabled.
    pub fn enable_feature(&mut self, id: &str) -> Result<bool> {
        ensure_known_feature(id)?;
        Ok(self.enabled_features.insert(id.to_string()))
    }

    /// Returns true when the feature was enabled before.
    pub fn disable_feature(&mut self, id: &str) -> Result<bool> {
        ensure_known_feature(id)?;
        Ok(self.enabled_features.remove(id))
    }

    // ─── Decisions ──────────────────────────────────────────────────────────

    pub fn add_decision(&mut self, input: NewDecision, now: DateTime<Utc>) -> Result<Decision> {
        if input.id.trim().is_empty() {
            return Err(NyoError::Validation("decision id is required".to_string()));
        }
        if self.decisions.iter().any(|d| d.id == input.id) {
            return Err(NyoError::Validation(format!(
                "Decision {} already exists",
                input.id
            )));
        }

        let decision = Decision {
            id: input.id,
            title: input.title,
            description: input.description,
            rationale: input.rationale,
            created_at: now,
        };
        self.decisions.push(decision.clone());
        Ok(decision)
    }

    // ─── Summary ────────────────────────────────────────────────────────────

    pub fn summary(&self, now: DateTime<Utc>) -> ProjectSummary {
        let count = |status: TaskStatus| self.tasks.iter().filter(|t| t.status == status).count();

        ProjectSummary {
            name: self.name.clone(),
            code: self.code.clone(),
            phase: self.phase,
            enabled_features: self.enabled_features.iter().cloned().collect(),
            pending: count(TaskStatus::Pending),
            in_progress: count(TaskStatus::InProgress),
            completed: count(TaskStatus::Completed),
            agents: self.agents.keys().cloned().collect(),
            locks: self.task_locks.len(),
            live_locks: self.task_locks.live_count(now),
        }
    }
}

fn ensure_known_feature(id: &str) -> Result<()> {
    if is_known_feature(id) {
        Ok(())
    } else {
        Err(NyoError::Validation(format!(
            "Unknown feature '{}'. Must be one of: {}",
            id,
            AVAILABLE_FEATURES.join(", ")
        )))
    }
}

fn derive_code(name: &str) -> Result<String> {
    let code: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if code.is_empty() {
        Err(NyoError::Validation(format!(
            "cannot derive a project code from '{}'; pass one explicitly",
            name
        )))
    } else {
        Ok(code)
    }
}
