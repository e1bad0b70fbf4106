use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrmError, TenantScope};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: i64,
    pub company_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "OPEN",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(TaskStatus::Open),
            "IN_PROGRESS" => Some(TaskStatus::InProgress),
            "DONE" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    /// Tasks move forward and can be reopened, but a finished task
    /// cannot jump straight back to in-progress.
    pub fn can_transition(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Open, InProgress) | (InProgress, Done) | (InProgress, Open) | (Done, Open)
        )
    }

    pub fn transition(&self, next: TaskStatus) -> Result<TaskStatus, CrmError> {
        if self.can_transition(next) {
            Ok(next)
        } else {
            Err(CrmError::InvalidTransition {
                from: self.as_str().to_owned(),
                to: next.as_str().to_owned(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(TaskPriority::Low),
            "MEDIUM" => Some(TaskPriority::Medium),
            "HIGH" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskUpdate {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub assignee_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<TaskItem>, CrmError>;
    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<TaskItem>, CrmError>;
    async fn create(&self, company_id: i64, new: NewTask) -> Result<TaskItem, CrmError>;
    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: TaskUpdate,
    ) -> Result<TaskItem, CrmError>;
    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: TaskStatus,
    ) -> Result<TaskItem, CrmError>;
    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError>;
}
