//! Task service - core business logic

use std::sync::Arc;

use salesdesk_domain::types::activity::action;
use salesdesk_domain::{
    Caller, EntityKind, NewActivity, NewTask, Result, Role, SalesdeskError, Task, TaskFilters,
    TaskStatus, TaskView,
};
use serde_json::json;
use tracing::error;

use crate::feed::ports::ActivityLog;

use super::ports::{TaskScope, TaskStore};

/// Task service
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    log: Arc<dyn ActivityLog>,
}

impl TaskService {
    /// Create a new task service
    pub fn new(store: Arc<dyn TaskStore>, log: Arc<dyn ActivityLog>) -> Self {
        Self { store, log }
    }

    /// One page of pending tasks for the requested view.
    ///
    /// The team view is honored only for managers and scopes to the
    /// caller's department; everyone else silently degrades to their own
    /// tasks. The owner filter applies in the team view only.
    pub async fn list(
        &self,
        view: TaskView,
        caller: &Caller,
        filters: &TaskFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Task>, u64)> {
        let team_view = view == TaskView::Team && caller.role == Role::Manager;

        let scope = if team_view {
            TaskScope::Department(caller.department.clone())
        } else {
            TaskScope::Owner(caller.user_id.clone())
        };

        let mut effective = filters.clone();
        if !team_view {
            effective.owner_id = None;
        }

        self.store.list(&scope, &effective, page, page_size).await
    }

    /// Fetch a single task.
    pub async fn get(&self, id: &str) -> Result<Task> {
        self.store.get(id).await
    }

    /// Create a task and log `task_created`.
    pub async fn create(&self, new_task: NewTask) -> Result<Task> {
        let task = self.store.insert(new_task).await?;

        self.append_log(NewActivity {
            action_type: action::TASK_CREATED.to_string(),
            description: None,
            metadata: json!({ "task_type": task.task_type.as_str() }),
            entity_type: EntityKind::Task,
            entity_id: task.id.clone(),
            actor_id: task.owner_id.clone(),
        })
        .await;

        Ok(task)
    }

    /// Mark a pending task completed and log `task_completed`.
    pub async fn complete(&self, id: &str, actor_id: &str) -> Result<Task> {
        let task = self.require_pending(id).await?;
        self.store.set_status(id, TaskStatus::Completed, None).await?;

        self.append_log(NewActivity {
            action_type: action::TASK_COMPLETED.to_string(),
            description: None,
            metadata: json!({ "task_type": task.task_type.as_str() }),
            entity_type: EntityKind::Task,
            entity_id: id.to_string(),
            actor_id: actor_id.to_string(),
        })
        .await;

        Ok(Task { status: TaskStatus::Completed, ..task })
    }

    /// Cancel a pending task with a reason and log `task_cancelled`.
    pub async fn cancel(&self, id: &str, reason: &str, actor_id: &str) -> Result<Task> {
        let task = self.require_pending(id).await?;
        self.store.set_status(id, TaskStatus::Cancelled, Some(reason)).await?;

        self.append_log(NewActivity {
            action_type: action::TASK_CANCELLED.to_string(),
            description: None,
            metadata: json!({ "reason": reason }),
            entity_type: EntityKind::Task,
            entity_id: id.to_string(),
            actor_id: actor_id.to_string(),
        })
        .await;

        Ok(Task {
            status: TaskStatus::Cancelled,
            cancel_reason: Some(reason.to_string()),
            ..task
        })
    }

    /// Only pending tasks can transition; anything else is invalid input.
    async fn require_pending(&self, id: &str) -> Result<Task> {
        let task = self.store.get(id).await?;
        if task.status != TaskStatus::Pending {
            return Err(SalesdeskError::InvalidInput(format!(
                "task {id} is {} and cannot transition",
                task.status.as_str()
            )));
        }
        Ok(task)
    }

    async fn append_log(&self, activity: NewActivity) {
        if let Err(err) = self.log.record(activity).await {
            error!(error = %err, "failed to record task activity");
        }
    }
}
