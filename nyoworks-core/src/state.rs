//! The lease table: claim, release, force-unlock and listing over
//! `task_id -> Lease`, with expiry evaluated lazily against a caller-supplied
//! `now`. Nothing here touches storage or the clock.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NyoError, Result};
use crate::types::{Claim, Lease, OwnershipMode};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaseTable {
    leases: BTreeMap<String, Lease>,
}

impl LeaseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, task_id: &str) -> Option<&Lease> {
        self.leases.get(task_id)
    }

    pub fn len(&self) -> usize {
        self.leases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leases.is_empty()
    }

    /// Number of entries whose expiry has not passed.
    pub fn live_count(&self, now: DateTime<Utc>) -> usize {
        self.leases.values().filter(|l| !l.is_expired(now)).count()
    }

    /// Claim `task_id` for `holder`.
    ///
    /// Succeeds when the task is unclaimed or its lease has expired, in which
    /// case the expired lease is replaced wholesale. A live lease, even one
    /// held by the same holder, is a conflict and leaves the table untouched.
    pub fn claim(&mut self, task_id: &str, holder: &str, now: DateTime<Utc>) -> Result<Claim> {
        if task_id.trim().is_empty() {
            return Err(NyoError::Validation("task id is required".to_string()));
        }
        if holder.trim().is_empty() {
            return Err(NyoError::Validation("holder must not be empty".to_string()));
        }

        if let Some(existing) = self.leases.get(task_id) {
            if !existing.is_expired(now) {
                return Err(NyoError::Conflict {
                    task_id: task_id.to_string(),
                    holder: existing.holder.clone(),
                    expires_at: existing.expires_at,
                });
            }
        }

        let lease = Lease::new(task_id, holder, now);
        let superseded = self.leases.insert(task_id.to_string(), lease.clone());
        Ok(Claim { lease, superseded })
    }

    /// Remove the lease on `task_id`.
    ///
    /// Releasing an unlocked task is an error. In strict mode the requester
    /// must be the recorded holder.
    pub fn release(
        &mut self,
        task_id: &str,
        requester: Option<&str>,
        ownership: OwnershipMode,
    ) -> Result<Lease> {
        let existing = self
            .leases
            .get(task_id)
            .ok_or_else(|| NyoError::NotLocked(task_id.to_string()))?;

        if ownership == OwnershipMode::Strict {
            let requester = requester.ok_or_else(|| {
                NyoError::Validation(format!(
                    "Releasing {} requires naming the holder in strict ownership mode",
                    task_id
                ))
            })?;
            if requester != existing.holder {
                return Err(NyoError::NotHolder {
                    task_id: task_id.to_string(),
                    holder: existing.holder.clone(),
                    requester: requester.to_string(),
                });
            }
        }

        self.leases
            .remove(task_id)
            .ok_or_else(|| NyoError::NotLocked(task_id.to_string()))
    }

    /// Administrative removal, regardless of holder or mode.
    pub fn force_unlock(&mut self, task_id: &str) -> Result<Lease> {
        self.leases
            .remove(task_id)
            .ok_or_else(|| NyoError::NotLocked(task_id.to_string()))
    }

    /// Raw table contents ordered by task id, expired entries included.
    pub fn list(&self) -> Vec<Lease> {
        self.leases.values().cloned().collect()
    }

    /// Drop every expired entry and return what was removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> Vec<Lease> {
        let expired: Vec<String> = self
            .leases
            .iter()
            .filter(|(_, lease)| lease.is_expired(now))
            .map(|(task_id, _)| task_id.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|task_id| self.leases.remove(&task_id))
            .collect()
    }
}
