//! Port interfaces for lead management

use async_trait::async_trait;
use salesdesk_domain::{Lead, LeadFilters, LeadStatus, NewLead, Result};

/// Trait for persisting and querying leads
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// One page of leads matching the filters, newest first, plus the total
    /// match count.
    async fn list(
        &self,
        filters: &LeadFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Lead>, u64)>;

    /// Fetch a single lead; NotFound when missing.
    async fn get(&self, id: &str) -> Result<Lead>;

    /// Insert a new lead and return the stored record.
    async fn insert(&self, lead: NewLead) -> Result<Lead>;

    /// Update the pipeline status.
    async fn set_status(&self, id: &str, status: LeadStatus) -> Result<()>;

    /// Reassign the lead to another owner.
    async fn set_owner(&self, id: &str, owner_id: &str) -> Result<()>;
}
