use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{NewTask, TaskItem, TaskPriority, TaskRepository, TaskStatus, TaskUpdate};
use crate::{CrmError, TenantScope};

use super::{db_err, parse_stored};

const COLUMNS: &str = "id, company_id, title, description, status, priority, assignee_id, \
     due_date, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TaskRecord {
    id: i64,
    company_id: i64,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    assignee_id: Option<i64>,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRecord> for TaskItem {
    type Error = CrmError;

    fn try_from(row: TaskRecord) -> Result<Self, Self::Error> {
        let status = parse_stored(TaskStatus::from_str(&row.status), "status", &row.status)?;
        let priority =
            parse_stored(TaskPriority::from_str(&row.priority), "priority", &row.priority)?;
        Ok(TaskItem {
            id: row.id,
            company_id: row.company_id,
            title: row.title,
            description: row.description,
            status,
            priority,
            assignee_id: row.assignee_id,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<TaskItem>, CrmError> {
        let rows: Vec<TaskRecord> = match scope.company_id() {
            Some(company_id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM tasks WHERE company_id = ? ORDER BY id"
                ))
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!("SELECT {COLUMNS} FROM tasks ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_err("list_tasks", e))?;

        rows.into_iter().map(TaskItem::try_from).collect()
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<TaskItem>, CrmError> {
        let company_id = scope.company_id();
        let row: Option<TaskRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE id = ? AND (? IS NULL OR company_id = ?)"
        ))
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find_task", e))?;

        row.map(TaskItem::try_from).transpose()
    }

    async fn create(&self, company_id: i64, new: NewTask) -> Result<TaskItem, CrmError> {
        let now = Utc::now();
        let priority = new.priority.unwrap_or(TaskPriority::Medium);
        let row: TaskRecord = sqlx::query_as(&format!(
            "INSERT INTO tasks (company_id, title, description, status, priority, assignee_id, due_date, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(company_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(TaskStatus::Open.as_str())
        .bind(priority.as_str())
        .bind(new.assignee_id)
        .bind(new.due_date)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_task", e))?;

        row.try_into()
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: TaskUpdate,
    ) -> Result<TaskItem, CrmError> {
        let company_id = scope.company_id();
        let row: Option<TaskRecord> = sqlx::query_as(&format!(
            "UPDATE tasks SET title = ?, description = ?, priority = ?, assignee_id = ?, due_date = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.priority.as_str())
        .bind(update.assignee_id)
        .bind(update.due_date)
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("update_task", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: TaskStatus,
    ) -> Result<TaskItem, CrmError> {
        let company_id = scope.company_id();
        let row: Option<TaskRecord> = sqlx::query_as(&format!(
            "UPDATE tasks SET status = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("set_task_status", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let company_id = scope.company_id();
        let result =
            sqlx::query("DELETE FROM tasks WHERE id = ? AND (? IS NULL OR company_id = ?)")
                .bind(id)
                .bind(company_id)
                .bind(company_id)
                .execute(&self.pool)
                .await
                .map_err(|e| db_err("delete_task", e))?;

        if result.rows_affected() == 0 {
            return Err(CrmError::NotFound);
        }

        Ok(())
    }
}
