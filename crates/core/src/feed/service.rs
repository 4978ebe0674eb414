//! Activity feed service - core business logic
//!
//! The enrichment resolver is the one read path with real branching: it
//! joins a page of log rows against three collections and resolves the
//! acquisition source through a variable-depth reference chain (lead,
//! deal -> lead, task -> lead or task -> deal -> lead).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use salesdesk_domain::constants::FALLBACK_SOURCE;
use salesdesk_domain::types::activity::action;
use salesdesk_domain::{
    ActivityFilters, ActivityRecord, DealSummary, EnrichedActivity, EntityKind, FeedPage,
    LeadSource, LeadSummary, LinkedEntity, NewActivity, Result, Role, SalesdeskError, TaskSummary,
    TeamMember,
};
use tracing::debug;

use super::ports::{ActivityLog, DealLookup, LeadLookup, TaskLookup, TeamDirectory};

/// Activity feed service
pub struct ActivityFeedService {
    log: Arc<dyn ActivityLog>,
    leads: Arc<dyn LeadLookup>,
    deals: Arc<dyn DealLookup>,
    tasks: Arc<dyn TaskLookup>,
    directory: Arc<dyn TeamDirectory>,
}

impl ActivityFeedService {
    /// Create a new feed service
    pub fn new(
        log: Arc<dyn ActivityLog>,
        leads: Arc<dyn LeadLookup>,
        deals: Arc<dyn DealLookup>,
        tasks: Arc<dyn TaskLookup>,
        directory: Arc<dyn TeamDirectory>,
    ) -> Self {
        Self { log, leads, deals, tasks, directory }
    }

    /// Fetch one page of the global feed and enrich it.
    ///
    /// A failed page query is fatal and propagates. The `source` filter is
    /// applied to the resolved label after enrichment and never alters
    /// `total_count`.
    pub async fn fetch_feed(
        &self,
        filters: &ActivityFilters,
        page: u32,
        page_size: u32,
    ) -> Result<FeedPage> {
        let (rows, total_count) = self.log.list(filters, page, page_size).await?;
        let mut activities = self.enrich(rows).await?;

        if let Some(source) = filters.source.as_deref() {
            activities.retain(|entry| entry.resolved_source == source);
        }

        Ok(FeedPage { activities, total_count })
    }

    /// Enrich a page of raw log rows, preserving input order.
    ///
    /// Issues at most one bulk lookup per entity type; empty id sets never
    /// reach storage. The three lookups run concurrently and the first
    /// failure fails the whole call - partial enrichment is never returned.
    pub async fn enrich(&self, activities: Vec<ActivityRecord>) -> Result<Vec<EnrichedActivity>> {
        let lead_ids = distinct_ids(&activities, EntityKind::Lead);
        let deal_ids = distinct_ids(&activities, EntityKind::Deal);
        let task_ids = distinct_ids(&activities, EntityKind::Task);

        let leads_fut = async {
            if lead_ids.is_empty() {
                Ok(Vec::new())
            } else {
                self.leads.find_summaries(&lead_ids).await
            }
        };
        let deals_fut = async {
            if deal_ids.is_empty() {
                Ok(Vec::new())
            } else {
                self.deals.find_summaries(&deal_ids).await
            }
        };
        let tasks_fut = async {
            if task_ids.is_empty() {
                Ok(Vec::new())
            } else {
                self.tasks.find_summaries(&task_ids).await
            }
        };

        let (leads, deals, tasks) = tokio::try_join!(leads_fut, deals_fut, tasks_fut)?;

        debug!(
            rows = activities.len(),
            leads = leads.len(),
            deals = deals.len(),
            tasks = tasks.len(),
            "enriching activity page"
        );

        let lead_map: HashMap<String, LeadSummary> =
            leads.into_iter().map(|lead| (lead.id.clone(), lead)).collect();
        let deal_map: HashMap<String, DealSummary> =
            deals.into_iter().map(|deal| (deal.id.clone(), deal)).collect();
        let task_map: HashMap<String, TaskSummary> =
            tasks.into_iter().map(|task| (task.id.clone(), task)).collect();

        Ok(activities
            .into_iter()
            .map(|activity| resolve(activity, &lead_map, &deal_map, &task_map))
            .collect())
    }

    /// Append a manually logged activity to the feed.
    pub async fn record_manual(
        &self,
        entity: EntityKind,
        entity_id: &str,
        activity_type: &str,
        description: &str,
        actor_id: &str,
    ) -> Result<()> {
        let activity = NewActivity {
            action_type: action::MANUAL_ACTIVITY.to_string(),
            description: Some(description.to_string()),
            metadata: serde_json::json!({ "activity_type": activity_type }),
            entity_type: entity,
            entity_id: entity_id.to_string(),
            actor_id: actor_id.to_string(),
        };
        self.log.record(activity).await
    }

    /// Activities for a lead or deal, including activities of tasks linked
    /// to it, newest first.
    pub async fn entity_timeline(
        &self,
        entity: EntityKind,
        entity_id: &str,
    ) -> Result<Vec<ActivityRecord>> {
        if entity == EntityKind::Task {
            return Err(SalesdeskError::InvalidInput(
                "timelines are available for leads and deals only".into(),
            ));
        }

        let task_ids = self.tasks.ids_linked_to(entity, entity_id).await?;
        let mut refs = Vec::with_capacity(task_ids.len() + 1);
        refs.push((entity, entity_id.to_string()));
        refs.extend(task_ids.into_iter().map(|id| (EntityKind::Task, id)));

        self.log.for_entities(&refs).await
    }

    /// Team members for the feed's actor filter control.
    pub async fn list_team_members(&self, role: Option<Role>) -> Result<Vec<TeamMember>> {
        self.directory.list_members(role).await
    }
}

/// Ids of activities of the given kind, de-duplicated, first-seen order.
/// The same id may appear in many activities; the bulk fetch is keyed by
/// unique id.
fn distinct_ids(activities: &[ActivityRecord], kind: EntityKind) -> Vec<String> {
    let mut seen = HashSet::new();
    activities
        .iter()
        .filter(|activity| activity.entity_kind() == Some(kind))
        .filter(|activity| seen.insert(activity.entity_id.clone()))
        .map(|activity| activity.entity_id.clone())
        .collect()
}

/// Attach the linked entity and resolved source to one activity.
///
/// An id missing from its map is a dangling reference, not an error: the
/// row degrades to no linked entity and the fallback label.
fn resolve(
    activity: ActivityRecord,
    leads: &HashMap<String, LeadSummary>,
    deals: &HashMap<String, DealSummary>,
    tasks: &HashMap<String, TaskSummary>,
) -> EnrichedActivity {
    let resolved = match activity.entity_kind() {
        Some(EntityKind::Lead) => leads
            .get(&activity.entity_id)
            .map(|lead| (LinkedEntity::Lead(lead.clone()), lead.source)),
        Some(EntityKind::Deal) => deals.get(&activity.entity_id).map(|deal| {
            let source = deal.lead.as_ref().and_then(|lead| lead.source);
            (LinkedEntity::Deal(deal.clone()), source)
        }),
        Some(EntityKind::Task) => tasks
            .get(&activity.entity_id)
            .map(|task| (LinkedEntity::Task(task.clone()), task_source(task))),
        None => None,
    };

    match resolved {
        Some((linked_entity, source)) => EnrichedActivity {
            activity,
            linked_entity: Some(linked_entity),
            resolved_source: source_label(source),
        },
        None => EnrichedActivity {
            activity,
            linked_entity: None,
            resolved_source: FALLBACK_SOURCE.to_string(),
        },
    }
}

/// Source priority chain for tasks: a directly linked lead always wins over
/// the deal's lead, even when its own source is unset.
fn task_source(task: &TaskSummary) -> Option<LeadSource> {
    if let Some(lead) = &task.lead {
        return lead.source;
    }
    task.deal.as_ref().and_then(|deal| deal.lead.as_ref()).and_then(|lead| lead.source)
}

fn source_label(source: Option<LeadSource>) -> String {
    source.map_or_else(|| FALLBACK_SOURCE.to_string(), |source| source.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, source: Option<LeadSource>) -> LeadSummary {
        LeadSummary { id: id.to_string(), name: "Acme".to_string(), company: None, source }
    }

    #[test]
    fn task_source_prefers_direct_lead_even_when_unset() {
        let task = TaskSummary {
            id: "t1".to_string(),
            description: "call".to_string(),
            lead: Some(summary("l1", None)),
            deal: Some(DealSummary {
                id: "d1".to_string(),
                name: "Deal".to_string(),
                value: None,
                stage: salesdesk_domain::DealStage::Prospecting,
                lead: Some(summary("l2", Some(LeadSource::B2B))),
            }),
        };

        // The direct link is present, so the deal's lead is never consulted.
        assert_eq!(task_source(&task), None);
    }

    #[test]
    fn task_source_walks_through_the_deal_without_direct_lead() {
        let task = TaskSummary {
            id: "t1".to_string(),
            description: "call".to_string(),
            lead: None,
            deal: Some(DealSummary {
                id: "d1".to_string(),
                name: "Deal".to_string(),
                value: None,
                stage: salesdesk_domain::DealStage::Prospecting,
                lead: Some(summary("l2", Some(LeadSource::Upwork))),
            }),
        };

        assert_eq!(task_source(&task), Some(LeadSource::Upwork));
    }

    #[test]
    fn source_label_falls_back_to_other() {
        assert_eq!(source_label(None), FALLBACK_SOURCE);
        assert_eq!(source_label(Some(LeadSource::Referral)), "Referral");
    }
}
