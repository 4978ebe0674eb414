//! Mock port implementations for testing
//!
//! Provides in-memory mocks for the feed ports, enabling deterministic
//! unit tests without database dependencies. Lookup mocks count their
//! invocations so tests can assert the batching and short-circuit rules.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use salesdesk_core::feed::ports::{ActivityLog, DealLookup, LeadLookup, TaskLookup, TeamDirectory};
use salesdesk_domain::{
    ActivityFilters, ActivityRecord, DealSummary, EntityKind, LeadSummary, NewActivity, Result,
    Role, SalesdeskError, TaskSummary, TeamMember,
};

/// In-memory mock for `ActivityLog`.
///
/// Stores a fixed set of rows and captures appended activities.
#[derive(Default, Clone)]
pub struct MockActivityLog {
    rows: Arc<Vec<ActivityRecord>>,
    recorded: Arc<Mutex<Vec<NewActivity>>>,
    fail_list: bool,
}

impl MockActivityLog {
    /// Create a new mock seeded with the provided rows.
    pub fn new(rows: Vec<ActivityRecord>) -> Self {
        Self { rows: Arc::new(rows), recorded: Arc::new(Mutex::new(Vec::new())), fail_list: false }
    }

    /// A mock whose page query always fails.
    pub fn failing() -> Self {
        Self { fail_list: true, ..Self::default() }
    }

    /// Activities appended through `record`.
    pub fn recorded(&self) -> Vec<NewActivity> {
        self.recorded.lock().map(|rows| rows.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ActivityLog for MockActivityLog {
    async fn list(
        &self,
        filters: &ActivityFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<ActivityRecord>, u64)> {
        if self.fail_list {
            return Err(SalesdeskError::Database("activity page query failed".into()));
        }

        let mut rows: Vec<ActivityRecord> = self
            .rows
            .iter()
            .filter(|row| {
                filters.actor_id.as_deref().map_or(true, |actor| row.actor_id == actor)
                    && filters.entity_type.map_or(true, |kind| row.entity_kind() == Some(kind))
                    && filters.start.map_or(true, |start| row.timestamp >= start)
                    && filters.end.map_or(true, |end| row.timestamp <= end)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total = rows.len() as u64;
        let offset = (page.saturating_sub(1) * page_size) as usize;
        let page_rows = rows.into_iter().skip(offset).take(page_size as usize).collect();
        Ok((page_rows, total))
    }

    async fn record(&self, activity: NewActivity) -> Result<()> {
        if let Ok(mut rows) = self.recorded.lock() {
            rows.push(activity);
        }
        Ok(())
    }

    async fn for_entities(&self, refs: &[(EntityKind, String)]) -> Result<Vec<ActivityRecord>> {
        let mut rows: Vec<ActivityRecord> = self
            .rows
            .iter()
            .filter(|row| {
                refs.iter().any(|(kind, id)| {
                    row.entity_kind() == Some(*kind) && row.entity_id == *id
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(rows)
    }
}

/// In-memory mock for `LeadLookup` with an invocation counter.
#[derive(Default, Clone)]
pub struct MockLeadLookup {
    leads: Arc<Vec<LeadSummary>>,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl MockLeadLookup {
    pub fn new(leads: Vec<LeadSummary>) -> Self {
        Self { leads: Arc::new(leads), calls: Arc::new(AtomicUsize::new(0)), fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// Number of bulk lookups issued against this mock.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeadLookup for MockLeadLookup {
    async fn find_summaries(&self, ids: &[String]) -> Result<Vec<LeadSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SalesdeskError::Database("lead bulk lookup failed".into()));
        }
        Ok(self.leads.iter().filter(|lead| ids.contains(&lead.id)).cloned().collect())
    }
}

/// In-memory mock for `DealLookup` with an invocation counter.
#[derive(Default, Clone)]
pub struct MockDealLookup {
    deals: Arc<Vec<DealSummary>>,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl MockDealLookup {
    pub fn new(deals: Vec<DealSummary>) -> Self {
        Self { deals: Arc::new(deals), calls: Arc::new(AtomicUsize::new(0)), fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DealLookup for MockDealLookup {
    async fn find_summaries(&self, ids: &[String]) -> Result<Vec<DealSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SalesdeskError::Database("deal bulk lookup failed".into()));
        }
        Ok(self.deals.iter().filter(|deal| ids.contains(&deal.id)).cloned().collect())
    }
}

/// In-memory mock for `TaskLookup` with an invocation counter.
#[derive(Default, Clone)]
pub struct MockTaskLookup {
    tasks: Arc<Vec<TaskSummary>>,
    links: Arc<Vec<(EntityKind, String, String)>>,
    calls: Arc<AtomicUsize>,
}

impl MockTaskLookup {
    pub fn new(tasks: Vec<TaskSummary>) -> Self {
        Self {
            tasks: Arc::new(tasks),
            links: Arc::new(Vec::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register a (parent kind, parent id) -> task id link for
    /// `ids_linked_to`.
    pub fn with_link(mut self, kind: EntityKind, entity_id: &str, task_id: &str) -> Self {
        Arc::make_mut(&mut self.links).push((kind, entity_id.to_string(), task_id.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskLookup for MockTaskLookup {
    async fn find_summaries(&self, ids: &[String]) -> Result<Vec<TaskSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tasks.iter().filter(|task| ids.contains(&task.id)).cloned().collect())
    }

    async fn ids_linked_to(&self, entity: EntityKind, entity_id: &str) -> Result<Vec<String>> {
        Ok(self
            .links
            .iter()
            .filter(|(kind, id, _)| *kind == entity && id == entity_id)
            .map(|(_, _, task_id)| task_id.clone())
            .collect())
    }
}

/// In-memory mock for `TeamDirectory`.
#[derive(Default, Clone)]
pub struct MockTeamDirectory {
    members: Arc<Vec<TeamMember>>,
}

impl MockTeamDirectory {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Self { members: Arc::new(members) }
    }
}

#[async_trait]
impl TeamDirectory for MockTeamDirectory {
    async fn list_members(&self, role: Option<Role>) -> Result<Vec<TeamMember>> {
        Ok(self
            .members
            .iter()
            .filter(|member| role.map_or(true, |role| member.role == role))
            .cloned()
            .collect())
    }
}

/// Activity-row builder for tests.
pub fn activity(id: &str, entity_type: &str, entity_id: &str) -> ActivityRecord {
    activity_at(id, entity_type, entity_id, 1_700_000_000)
}

/// Activity-row builder with an explicit unix timestamp.
pub fn activity_at(id: &str, entity_type: &str, entity_id: &str, ts: i64) -> ActivityRecord {
    ActivityRecord {
        id: id.to_string(),
        timestamp: DateTime::<Utc>::from_timestamp(ts, 0).expect("timestamp valid"),
        action_type: "lead_created".to_string(),
        description: None,
        metadata: serde_json::Value::Null,
        entity_type: entity_type.to_string(),
        entity_id: entity_id.to_string(),
        actor_id: "user-1".to_string(),
        actor_name: Some("Test User".to_string()),
    }
}
