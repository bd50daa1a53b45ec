use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NyoError;

/// Features a project can switch on.
pub const AVAILABLE_FEATURES: &[&str] = &[
    "payments",
    "appointments",
    "inventory",
    "crm",
    "cms",
    "ecommerce",
    "analytics",
    "notifications",
    "audit",
    "export",
    "realtime",
];

/// Workflow phases, in the order a project moves through them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Discovery,
    Architecture,
    Planning,
    Backend,
    Frontend,
    Qa,
    Deployment,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Discovery,
        Phase::Architecture,
        Phase::Planning,
        Phase::Backend,
        Phase::Frontend,
        Phase::Qa,
        Phase::Deployment,
    ];

    /// Returns the position in the workflow (0-based)
    pub fn to_index(self) -> usize {
        match self {
            Phase::Discovery => 0,
            Phase::Architecture => 1,
            Phase::Planning => 2,
            Phase::Backend => 3,
            Phase::Frontend => 4,
            Phase::Qa => 5,
            Phase::Deployment => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Discovery => "DISCOVERY",
            Phase::Architecture => "ARCHITECTURE",
            Phase::Planning => "PLANNING",
            Phase::Backend => "BACKEND",
            Phase::Frontend => "FRONTEND",
            Phase::Qa => "QA",
            Phase::Deployment => "DEPLOYMENT",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = NyoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Phase::ALL.iter().map(|p| p.as_str()).collect();
                NyoError::Validation(format!(
                    "Invalid phase '{}'. Must be one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// Task lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = NyoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(NyoError::Validation(format!(
                "Invalid status '{}'. Must be one of: pending, in_progress, completed",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = NyoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(NyoError::Validation(format!(
                "Invalid priority '{}'. Must be one of: low, medium, high, critical",
                s
            ))),
        }
    }
}

/// Who may release a lease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipMode {
    /// Any caller may release any lease
    #[default]
    Permissive,
    /// Release must name the current holder
    Strict,
}

impl fmt::Display for OwnershipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnershipMode::Permissive => f.write_str("permissive"),
            OwnershipMode::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for OwnershipMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "permissive" => Ok(OwnershipMode::Permissive),
            "strict" => Ok(OwnershipMode::Strict),
            _ => Err(format!(
                "Invalid ownership mode '{}'. Must be one of: permissive, strict",
                s
            )),
        }
    }
}

pub fn is_known_feature(id: &str) -> bool {
    AVAILABLE_FEATURES.contains(&id)
}
