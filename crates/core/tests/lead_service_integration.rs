//! Integration tests for the lead service's transition logging.

mod support;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use salesdesk_core::leads::ports::LeadStore;
use salesdesk_core::LeadService;
use salesdesk_domain::types::activity::action;
use salesdesk_domain::{
    Lead, LeadFilters, LeadSource, LeadStatus, NewLead, Result, SalesdeskError,
};
use support::MockActivityLog;

/// Single-lead in-memory store.
#[derive(Clone)]
struct MockLeadStore {
    lead: Arc<Mutex<Lead>>,
}

impl MockLeadStore {
    fn new(lead: Lead) -> Self {
        Self { lead: Arc::new(Mutex::new(lead)) }
    }

    fn current(&self) -> Lead {
        self.lead.lock().map(|lead| lead.clone()).unwrap_or_else(|err| err.into_inner().clone())
    }
}

#[async_trait]
impl LeadStore for MockLeadStore {
    async fn list(
        &self,
        _filters: &LeadFilters,
        _page: u32,
        _page_size: u32,
    ) -> Result<(Vec<Lead>, u64)> {
        Ok((vec![self.current()], 1))
    }

    async fn get(&self, id: &str) -> Result<Lead> {
        let lead = self.current();
        if lead.id == id {
            Ok(lead)
        } else {
            Err(SalesdeskError::NotFound(format!("lead {id}")))
        }
    }

    async fn insert(&self, new_lead: NewLead) -> Result<Lead> {
        let lead = Lead {
            id: "lead-new".to_string(),
            name: new_lead.name,
            company: new_lead.company,
            source: new_lead.source,
            status: new_lead.status,
            owner_id: new_lead.owner_id,
            created_at: now(),
        };
        Ok(lead)
    }

    async fn set_status(&self, _id: &str, status: LeadStatus) -> Result<()> {
        if let Ok(mut lead) = self.lead.lock() {
            lead.status = status;
        }
        Ok(())
    }

    async fn set_owner(&self, _id: &str, owner_id: &str) -> Result<()> {
        if let Ok(mut lead) = self.lead.lock() {
            lead.owner_id = owner_id.to_string();
        }
        Ok(())
    }
}

fn now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("timestamp valid")
}

fn sample_lead() -> Lead {
    Lead {
        id: "lead-1".to_string(),
        name: "Acme".to_string(),
        company: Some("Acme GmbH".to_string()),
        source: Some(LeadSource::Referral),
        status: LeadStatus::Applied,
        owner_id: "user-1".to_string(),
        created_at: now(),
    }
}

#[tokio::test]
async fn change_status_logs_transition_with_metadata() {
    let store = MockLeadStore::new(sample_lead());
    let log = MockActivityLog::default();
    let service = LeadService::new(Arc::new(store.clone()), Arc::new(log.clone()));

    let updated = service
        .change_status("lead-1", LeadStatus::Interview, "user-2")
        .await
        .expect("status change succeeds");

    assert_eq!(updated.status, LeadStatus::Interview);
    assert_eq!(store.current().status, LeadStatus::Interview);

    let recorded = log.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].action_type, action::LEAD_STATUS_CHANGED);
    assert_eq!(recorded[0].metadata["old_status"], "Applied");
    assert_eq!(recorded[0].metadata["new_status"], "Interview");
    assert_eq!(recorded[0].actor_id, "user-2");
}

#[tokio::test]
async fn noop_status_change_is_not_logged() {
    let store = MockLeadStore::new(sample_lead());
    let log = MockActivityLog::default();
    let service = LeadService::new(Arc::new(store), Arc::new(log.clone()));

    service
        .change_status("lead-1", LeadStatus::Applied, "user-2")
        .await
        .expect("noop change succeeds");

    assert!(log.recorded().is_empty());
}

#[tokio::test]
async fn reassign_logs_handover_with_old_and_new_owner() {
    let store = MockLeadStore::new(sample_lead());
    let log = MockActivityLog::default();
    let service = LeadService::new(Arc::new(store.clone()), Arc::new(log.clone()));

    let updated = service
        .reassign("lead-1", "user-9", Some("vacation handover"), "user-1")
        .await
        .expect("reassign succeeds");

    assert_eq!(updated.owner_id, "user-9");
    assert_eq!(store.current().owner_id, "user-9");

    let recorded = log.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].action_type, action::LEAD_REASSIGNED);
    assert_eq!(recorded[0].metadata["old_owner_id"], "user-1");
    assert_eq!(recorded[0].metadata["new_owner_id"], "user-9");
    assert_eq!(recorded[0].metadata["note"], "vacation handover");
}

#[tokio::test]
async fn create_logs_lead_created() {
    let store = MockLeadStore::new(sample_lead());
    let log = MockActivityLog::default();
    let service = LeadService::new(Arc::new(store), Arc::new(log.clone()));

    let lead = service
        .create(NewLead {
            name: "Globex".to_string(),
            company: None,
            source: Some(LeadSource::Upwork),
            status: LeadStatus::default(),
            owner_id: "user-3".to_string(),
        })
        .await
        .expect("create succeeds");

    assert_eq!(lead.status, LeadStatus::Applied);

    let recorded = log.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].action_type, action::LEAD_CREATED);
    assert_eq!(recorded[0].entity_id, lead.id);
}
