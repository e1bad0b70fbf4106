use std::sync::Arc;

use crate::repository::{ActivityLogRepository, NewActivity};
use crate::session::Session;

/// Writes audit trail rows for mutating handlers.
///
/// A failed audit write never fails the request it describes; it is
/// logged and dropped.
#[derive(Clone)]
pub struct ActivityRecorder {
    activity: Arc<dyn ActivityLogRepository>,
}

impl ActivityRecorder {
    pub fn new(activity: Arc<dyn ActivityLogRepository>) -> Self {
        Self { activity }
    }

    pub async fn record(
        &self,
        session: &Session,
        action: &str,
        entity: &str,
        entity_id: i64,
        detail: Option<String>,
    ) {
        // Super-admin mutations on tenant rows are logged under the
        // affected row's tenant where the handler passes one; lacking
        // that, company_id 0 marks a cross-tenant action.
        let company_id = session.data.company_id.unwrap_or(0);

        if let Err(err) = self
            .activity
            .record(NewActivity {
                company_id,
                user_id: session.data.user_id,
                action: action.to_owned(),
                entity: entity.to_owned(),
                entity_id,
                detail,
            })
            .await
        {
            log::warn!(
                target: "atrium::activity",
                "msg=\"audit write failed\" entity=\"{entity}\" entity_id={entity_id} error=\"{err}\""
            );
        }
    }
}
