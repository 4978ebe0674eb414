//! Deal service - core business logic

use std::sync::Arc;

use salesdesk_domain::types::activity::action;
use salesdesk_domain::{Deal, DealFilters, DealStage, EntityKind, NewActivity, NewDeal, Result};
use serde_json::json;
use tracing::error;

use crate::feed::ports::ActivityLog;

use super::ports::DealStore;

/// Deal service
pub struct DealService {
    store: Arc<dyn DealStore>,
    log: Arc<dyn ActivityLog>,
}

impl DealService {
    /// Create a new deal service
    pub fn new(store: Arc<dyn DealStore>, log: Arc<dyn ActivityLog>) -> Self {
        Self { store, log }
    }

    /// One page of deals matching the filters.
    pub async fn list(
        &self,
        filters: &DealFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Deal>, u64)> {
        self.store.list(filters, page, page_size).await
    }

    /// Fetch a single deal.
    pub async fn get(&self, id: &str) -> Result<Deal> {
        self.store.get(id).await
    }

    /// Create a deal and log `deal_created`.
    pub async fn create(&self, new_deal: NewDeal) -> Result<Deal> {
        let deal = self.store.insert(new_deal).await?;

        self.append_log(NewActivity {
            action_type: action::DEAL_CREATED.to_string(),
            description: None,
            metadata: json!({ "name": deal.name }),
            entity_type: EntityKind::Deal,
            entity_id: deal.id.clone(),
            actor_id: deal.owner_id.clone(),
        })
        .await;

        Ok(deal)
    }

    /// Move a deal to a new stage and log the transition with old/new stage
    /// metadata. No-op transitions are not logged.
    pub async fn change_stage(
        &self,
        id: &str,
        new_stage: DealStage,
        actor_id: &str,
    ) -> Result<Deal> {
        let deal = self.store.get(id).await?;
        if deal.stage == new_stage {
            return Ok(deal);
        }

        self.store.set_stage(id, new_stage).await?;

        self.append_log(NewActivity {
            action_type: action::DEAL_STAGE_CHANGED.to_string(),
            description: None,
            metadata: json!({
                "old_stage": deal.stage.as_str(),
                "new_stage": new_stage.as_str(),
            }),
            entity_type: EntityKind::Deal,
            entity_id: id.to_string(),
            actor_id: actor_id.to_string(),
        })
        .await;

        Ok(Deal { stage: new_stage, ..deal })
    }

    async fn append_log(&self, activity: NewActivity) {
        if let Err(err) = self.log.record(activity).await {
            error!(error = %err, "failed to record deal activity");
        }
    }
}
