//! Lead service - core business logic

use std::sync::Arc;

use salesdesk_domain::types::activity::action;
use salesdesk_domain::{
    EntityKind, Lead, LeadFilters, LeadStatus, NewActivity, NewLead, Result,
};
use serde_json::json;
use tracing::error;

use crate::feed::ports::ActivityLog;

use super::ports::LeadStore;

/// Lead service
pub struct LeadService {
    store: Arc<dyn LeadStore>,
    log: Arc<dyn ActivityLog>,
}

impl LeadService {
    /// Create a new lead service
    pub fn new(store: Arc<dyn LeadStore>, log: Arc<dyn ActivityLog>) -> Self {
        Self { store, log }
    }

    /// One page of leads matching the filters.
    pub async fn list(
        &self,
        filters: &LeadFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Lead>, u64)> {
        self.store.list(filters, page, page_size).await
    }

    /// Fetch a single lead.
    pub async fn get(&self, id: &str) -> Result<Lead> {
        self.store.get(id).await
    }

    /// Create a lead and log `lead_created`.
    pub async fn create(&self, new_lead: NewLead) -> Result<Lead> {
        let lead = self.store.insert(new_lead).await?;

        self.append_log(NewActivity {
            action_type: action::LEAD_CREATED.to_string(),
            description: None,
            metadata: json!({ "name": lead.name }),
            entity_type: EntityKind::Lead,
            entity_id: lead.id.clone(),
            actor_id: lead.owner_id.clone(),
        })
        .await;

        Ok(lead)
    }

    /// Move a lead to a new status and log the transition with old/new
    /// status metadata. No-op transitions are not logged.
    pub async fn change_status(
        &self,
        id: &str,
        new_status: LeadStatus,
        actor_id: &str,
    ) -> Result<Lead> {
        let lead = self.store.get(id).await?;
        if lead.status == new_status {
            return Ok(lead);
        }

        self.store.set_status(id, new_status).await?;

        self.append_log(NewActivity {
            action_type: action::LEAD_STATUS_CHANGED.to_string(),
            description: None,
            metadata: json!({
                "old_status": lead.status.as_str(),
                "new_status": new_status.as_str(),
            }),
            entity_type: EntityKind::Lead,
            entity_id: id.to_string(),
            actor_id: actor_id.to_string(),
        })
        .await;

        Ok(Lead { status: new_status, ..lead })
    }

    /// Hand a lead over to another owner and log the reassignment.
    pub async fn reassign(
        &self,
        id: &str,
        new_owner_id: &str,
        note: Option<&str>,
        actor_id: &str,
    ) -> Result<Lead> {
        let lead = self.store.get(id).await?;
        self.store.set_owner(id, new_owner_id).await?;

        self.append_log(NewActivity {
            action_type: action::LEAD_REASSIGNED.to_string(),
            description: None,
            metadata: json!({
                "old_owner_id": lead.owner_id,
                "new_owner_id": new_owner_id,
                "note": note,
            }),
            entity_type: EntityKind::Lead,
            entity_id: id.to_string(),
            actor_id: actor_id.to_string(),
        })
        .await;

        Ok(Lead { owner_id: new_owner_id.to_string(), ..lead })
    }

    /// Log append failures are logged and swallowed so the primary mutation
    /// is never rolled back by observability plumbing.
    async fn append_log(&self, activity: NewActivity) {
        if let Err(err) = self.log.record(activity).await {
            error!(error = %err, "failed to record lead activity");
        }
    }
}
