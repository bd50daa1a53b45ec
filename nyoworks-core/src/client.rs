//! High-level client that wraps the lease table and record stores with a
//! pluggable backend and clock. The CLI delegates every command to this.

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::error::{NyoError, Result};
use crate::infrastructure::StateStore;
use crate::types::*;

/// The main entry point for project operations.
///
/// Each call is one load → mutate → save transaction on the store, with the
/// clock read inside it, so lease checks and writes are a single step.
pub struct ProjectClient<S, C = SystemClock> {
    store: S,
    clock: C,
    config: LeaseConfig,
}

impl<S: StateStore> ProjectClient<S> {
    pub fn new(store: S, config: LeaseConfig) -> Self {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S: StateStore, C: Clock> ProjectClient<S, C> {
    pub fn with_clock(store: S, clock: C, config: LeaseConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> LeaseConfig {
        self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create the project document.
    pub fn init(&self, name: &str, code: Option<&str>) -> Result<ProjectState> {
        let state = ProjectState::new(name, code, self.clock.now())?;
        self.store.create(&state)?;
        tracing::info!(name = %state.name, code = %state.code, "Project initialized");
        Ok(state)
    }

    /// Current document, or `NoProject`.
    pub fn state(&self) -> Result<ProjectState> {
        self.store.load()?.ok_or(NyoError::NoProject)
    }

    pub fn summary(&self) -> Result<ProjectSummary> {
        Ok(self.state()?.summary(self.clock.now()))
    }

    // ─── Leases ─────────────────────────────────────────────────────────────

    /// Claim `task_id`; `holder` defaults to "manual".
    pub fn claim(&self, task_id: &str, holder: Option<&str>) -> Result<Lease> {
        let holder = holder.unwrap_or(DEFAULT_HOLDER);
        let require_known_task = self.config.require_known_task;

        let claim = self
            .store
            .transact(|state| {
                if require_known_task && state.task(task_id).is_none() {
                    return Err(NyoError::TaskNotFound(task_id.to_string()));
                }
                state.task_locks.claim(task_id, holder, self.clock.now())
            })
            .inspect_err(|e| {
                if let NyoError::Conflict { holder: held_by, .. } = e {
                    tracing::info!(task_id = %task_id, holder = %held_by, requester = %holder, "Claim denied");
                }
            })?;

        if let Some(previous) = &claim.superseded {
            tracing::info!(
                task_id = %task_id,
                previous_holder = %previous.holder,
                expired_at = %previous.expires_at,
                "Expired lease superseded"
            );
        }
        tracing::info!(
            task_id = %task_id,
            holder = %claim.lease.holder,
            lease_id = %claim.lease.id,
            expires_at = %claim.lease.expires_at,
            "Task claimed"
        );
        Ok(claim.lease)
    }

    /// Release a lease. Under strict ownership `requester` must be the holder.
    pub fn release(&self, task_id: &str, requester: Option<&str>) -> Result<Lease> {
        let ownership = self.config.ownership;
        let lease = self
            .store
            .transact(|state| state.task_locks.release(task_id, requester, ownership))?;
        tracing::info!(task_id = %task_id, holder = %lease.holder, lease_id = %lease.id, "Task released");
        Ok(lease)
    }

    /// Administrative removal of a lease, whoever holds it.
    pub fn force_unlock(&self, task_id: &str) -> Result<Lease> {
        let lease = self
            .store
            .transact(|state| state.task_locks.force_unlock(task_id))?;
        tracing::warn!(task_id = %task_id, holder = %lease.holder, lease_id = %lease.id, "Task force unlocked");
        Ok(lease)
    }

    /// Every lease present in the table, expired ones included. Callers
    /// decide liveness with `Lease::is_expired(self.now())`.
    pub fn list_active(&self) -> Result<Vec<Lease>> {
        Ok(self.state()?.task_locks.list())
    }

    /// Remove all expired leases.
    pub fn prune_expired(&self) -> Result<Vec<Lease>> {
        let pruned = self
            .store
            .transact(|state| Ok(state.task_locks.prune_expired(self.clock.now())))?;
        tracing::info!(pruned = pruned.len(), "Expired leases pruned");
        Ok(pruned)
    }

    // ─── Tasks ──────────────────────────────────────────────────────────────

    pub fn create_task(&self, input: NewTask) -> Result<Task> {
        let task = self
            .store
            .transact(|state| state.create_task(input, self.clock.now()))?;
        tracing::info!(task_id = %task.id, "Task created");
        Ok(task)
    }

    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        Ok(self.state()?.list_tasks(filter))
    }

    pub fn task(&self, id: &str) -> Result<Task> {
        self.state()?
            .task(id)
            .cloned()
            .ok_or_else(|| NyoError::TaskNotFound(id.to_string()))
    }

    pub fn set_task_status(&self, id: &str, status: TaskStatus) -> Result<Task> {
        self.store
            .transact(|state| state.set_task_status(id, status, self.clock.now()))
    }

    // ─── Phase ──────────────────────────────────────────────────────────────

    pub fn phase(&self) -> Result<Phase> {
        Ok(self.state()?.phase)
    }

    pub fn set_phase(&self, value: &str) -> Result<Phase> {
        let phase = self.store.transact(|state| state.set_phase(value))?;
        tracing::info!(phase = %phase, "Phase changed");
        Ok(phase)
    }

    // ─── Features ───────────────────────────────────────────────────────────

    pub fn features(&self) -> Result<Vec<(&'static str, bool)>> {
        Ok(self.state()?.features())
    }

    pub fn enable_feature(&self, id: &str) -> Result<bool> {
        self.store.transact(|state| state.enable_feature(id))
    }

    pub fn disable_feature(&self, id: &str) -> Result<bool> {
        self.store.transact(|state| state.disable_feature(id))
    }

    // ─── Decisions ──────────────────────────────────────────────────────────

    pub fn decisions(&self) -> Result<Vec<Decision>> {
        Ok(self.state()?.decisions)
    }

    pub fn add_decision(&self, input: NewDecision) -> Result<Decision> {
        self.store
            .transact(|state| state.add_decision(input, self.clock.now()))
    }
}
