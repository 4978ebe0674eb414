//! Port interfaces for task management

use async_trait::async_trait;
use salesdesk_domain::{NewTask, Result, Task, TaskFilters, TaskStatus};

/// Which rows a task list query is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScope {
    /// Tasks owned by one user.
    Owner(String),
    /// Tasks owned by anyone in a department (manager team view).
    Department(String),
}

/// Trait for persisting and querying tasks
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// One page of pending tasks in the scope, ordered by due date
    /// ascending (soonest first), plus the total match count.
    async fn list(
        &self,
        scope: &TaskScope,
        filters: &TaskFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Task>, u64)>;

    /// Fetch a single task; NotFound when missing.
    async fn get(&self, id: &str) -> Result<Task>;

    /// Insert a new task and return the stored record.
    async fn insert(&self, task: NewTask) -> Result<Task>;

    /// Update the lifecycle status; `cancel_reason` is stored only for
    /// cancellations.
    async fn set_status(
        &self,
        id: &str,
        status: TaskStatus,
        cancel_reason: Option<&str>,
    ) -> Result<()>;
}
