use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{
    ApprovalKind, ApprovalRepository, ApprovalRequest, ApprovalStatus, NewApproval,
};
use crate::{CrmError, TenantScope};

use super::{db_err, parse_stored};

const COLUMNS: &str = "id, company_id, kind, subject_id, requested_by, status, decided_by, \
     decided_at, note, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteApprovalRepository {
    pool: SqlitePool,
}

impl SqliteApprovalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ApprovalRecord {
    id: i64,
    company_id: i64,
    kind: String,
    subject_id: i64,
    requested_by: i64,
    status: String,
    decided_by: Option<i64>,
    decided_at: Option<DateTime<Utc>>,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApprovalRecord> for ApprovalRequest {
    type Error = CrmError;

    fn try_from(row: ApprovalRecord) -> Result<Self, Self::Error> {
        let kind = parse_stored(ApprovalKind::from_str(&row.kind), "kind", &row.kind)?;
        let status = parse_stored(ApprovalStatus::from_str(&row.status), "status", &row.status)?;
        Ok(ApprovalRequest {
            id: row.id,
            company_id: row.company_id,
            kind,
            subject_id: row.subject_id,
            requested_by: row.requested_by,
            status,
            decided_by: row.decided_by,
            decided_at: row.decided_at,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ApprovalRepository for SqliteApprovalRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<ApprovalRequest>, CrmError> {
        let rows: Vec<ApprovalRecord> = match scope.company_id() {
            Some(company_id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM approvals WHERE company_id = ? ORDER BY id"
                ))
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!("SELECT {COLUMNS} FROM approvals ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_err("list_approvals", e))?;

        rows.into_iter().map(ApprovalRequest::try_from).collect()
    }

    async fn find(
        &self,
        scope: &TenantScope,
        id: i64,
    ) -> Result<Option<ApprovalRequest>, CrmError> {
        let company_id = scope.company_id();
        let row: Option<ApprovalRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM approvals WHERE id = ? AND (? IS NULL OR company_id = ?)"
        ))
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find_approval", e))?;

        row.map(ApprovalRequest::try_from).transpose()
    }

    async fn create(
        &self,
        company_id: i64,
        requested_by: i64,
        new: NewApproval,
    ) -> Result<ApprovalRequest, CrmError> {
        let now = Utc::now();
        let row: ApprovalRecord = sqlx::query_as(&format!(
            "INSERT INTO approvals (company_id, kind, subject_id, requested_by, status, note, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(company_id)
        .bind(new.kind.as_str())
        .bind(new.subject_id)
        .bind(requested_by)
        .bind(ApprovalStatus::Pending.as_str())
        .bind(&new.note)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_approval", e))?;

        row.try_into()
    }

    async fn decide(
        &self,
        scope: &TenantScope,
        id: i64,
        status: ApprovalStatus,
        decided_by: i64,
        note: Option<String>,
    ) -> Result<ApprovalRequest, CrmError> {
        let existing = self.find(scope, id).await?.ok_or(CrmError::NotFound)?;
        if existing.status != ApprovalStatus::Pending {
            return Err(CrmError::Validation(
                "Approval request already decided".to_owned(),
            ));
        }

        let company_id = scope.company_id();
        let now = Utc::now();
        let row: Option<ApprovalRecord> = sqlx::query_as(&format!(
            "UPDATE approvals SET status = ?, decided_by = ?, decided_at = ?, note = COALESCE(?, note), updated_at = ? \
             WHERE id = ? AND status = 'PENDING' AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(decided_by)
        .bind(now)
        .bind(&note)
        .bind(now)
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("decide_approval", e))?;

        // Lost the race against another decider.
        row.ok_or_else(|| CrmError::Validation("Approval request already decided".to_owned()))?
            .try_into()
    }
}
