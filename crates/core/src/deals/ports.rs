//! Port interfaces for deal management

use async_trait::async_trait;
use salesdesk_domain::{Deal, DealFilters, DealStage, NewDeal, Result};

/// Trait for persisting and querying deals
#[async_trait]
pub trait DealStore: Send + Sync {
    /// One page of deals matching the filters, newest first, plus the total
    /// match count. Rows carry the linked lead summary when present.
    async fn list(
        &self,
        filters: &DealFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Deal>, u64)>;

    /// Fetch a single deal; NotFound when missing.
    async fn get(&self, id: &str) -> Result<Deal>;

    /// Insert a new deal and return the stored record.
    async fn insert(&self, deal: NewDeal) -> Result<Deal>;

    /// Update the pipeline stage.
    async fn set_stage(&self, id: &str, stage: DealStage) -> Result<()>;
}
