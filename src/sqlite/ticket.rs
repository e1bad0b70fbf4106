use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{
    NewTicket, TaskPriority, Ticket, TicketRepository, TicketStatus, TicketUpdate,
};
use crate::{CrmError, TenantScope};

use super::{db_err, parse_stored};

const COLUMNS: &str = "id, company_id, customer_id, subject, body, status, priority, \
     assignee_id, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteTicketRepository {
    pool: SqlitePool,
}

impl SqliteTicketRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TicketRecord {
    id: i64,
    company_id: i64,
    customer_id: i64,
    subject: String,
    body: String,
    status: String,
    priority: String,
    assignee_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRecord> for Ticket {
    type Error = CrmError;

    fn try_from(row: TicketRecord) -> Result<Self, Self::Error> {
        let status = parse_stored(TicketStatus::from_str(&row.status), "status", &row.status)?;
        let priority =
            parse_stored(TaskPriority::from_str(&row.priority), "priority", &row.priority)?;
        Ok(Ticket {
            id: row.id,
            company_id: row.company_id,
            customer_id: row.customer_id,
            subject: row.subject,
            body: row.body,
            status,
            priority,
            assignee_id: row.assignee_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl TicketRepository for SqliteTicketRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Ticket>, CrmError> {
        let rows: Vec<TicketRecord> = match scope.company_id() {
            Some(company_id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM tickets WHERE company_id = ? ORDER BY id"
                ))
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!("SELECT {COLUMNS} FROM tickets ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_err("list_tickets", e))?;

        rows.into_iter().map(Ticket::try_from).collect()
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Ticket>, CrmError> {
        let company_id = scope.company_id();
        let row: Option<TicketRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM tickets WHERE id = ? AND (? IS NULL OR company_id = ?)"
        ))
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find_ticket", e))?;

        row.map(Ticket::try_from).transpose()
    }

    async fn create(&self, company_id: i64, new: NewTicket) -> Result<Ticket, CrmError> {
        let now = Utc::now();
        let priority = new.priority.unwrap_or(TaskPriority::Medium);
        let row: TicketRecord = sqlx::query_as(&format!(
            "INSERT INTO tickets (company_id, customer_id, subject, body, status, priority, assignee_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(company_id)
        .bind(new.customer_id)
        .bind(&new.subject)
        .bind(&new.body)
        .bind(TicketStatus::Open.as_str())
        .bind(priority.as_str())
        .bind(new.assignee_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_ticket", e))?;

        row.try_into()
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: TicketUpdate,
    ) -> Result<Ticket, CrmError> {
        let company_id = scope.company_id();
        let row: Option<TicketRecord> = sqlx::query_as(&format!(
            "UPDATE tickets SET subject = ?, body = ?, priority = ?, assignee_id = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(&update.subject)
        .bind(&update.body)
        .bind(update.priority.as_str())
        .bind(update.assignee_id)
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("update_ticket", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: TicketStatus,
    ) -> Result<Ticket, CrmError> {
        let company_id = scope.company_id();
        let row: Option<TicketRecord> = sqlx::query_as(&format!(
            "UPDATE tickets SET status = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("set_ticket_status", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let company_id = scope.company_id();
        let result =
            sqlx::query("DELETE FROM tickets WHERE id = ? AND (? IS NULL OR company_id = ?)")
                .bind(id)
                .bind(company_id)
                .bind(company_id)
                .execute(&self.pool)
                .await
                .map_err(|e| db_err("delete_ticket", e))?;

        if result.rows_affected() == 0 {
            return Err(CrmError::NotFound);
        }

        Ok(())
    }
}
