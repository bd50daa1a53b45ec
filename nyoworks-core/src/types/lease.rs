use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::OwnershipMode;

/// Holder recorded when a claim does not name one
pub const DEFAULT_HOLDER: &str = "manual";

/// How long a claim stays live. Leases are never extended in place.
pub const LEASE_DURATION_MINUTES: i64 = 30;

pub fn lease_duration() -> Duration {
    Duration::minutes(LEASE_DURATION_MINUTES)
}

/// Exclusive, time-bounded ownership of one task id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    /// Unique lease ID
    pub id: String,
    /// The claimed task
    pub task_id: String,
    /// Role or agent that claimed the task
    pub holder: String,
    /// When the lease was acquired
    pub acquired_at: DateTime<Utc>,
    /// acquired_at + lease duration
    pub expires_at: DateTime<Utc>,
}

impl Lease {
    pub fn new(task_id: impl Into<String>, holder: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("lease_{}", nanoid::nanoid!(12)),
            task_id: task_id.into(),
            holder: holder.into(),
            acquired_at: now,
            expires_at: now + lease_duration(),
        }
    }

    /// A lease is live strictly before `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.is_expired(now) {
            Duration::zero()
        } else {
            self.expires_at - now
        }
    }
}

/// A successful claim. `superseded` is the expired lease it replaced, if any.
#[derive(Debug, Clone)]
pub struct Claim {
    pub lease: Lease,
    pub superseded: Option<Lease>,
}

/// Lease policy knobs that are not fixed by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseConfig {
    pub ownership: OwnershipMode,
    /// Reject claims for ids missing from the task catalog
    pub require_known_task: bool,
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            ownership: OwnershipMode::Permissive,
            require_known_task: true,
        }
    }
}
