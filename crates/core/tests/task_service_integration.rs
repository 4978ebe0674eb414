//! Integration tests for task view scoping and lifecycle guards.

mod support;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use salesdesk_core::tasks::ports::{TaskScope, TaskStore};
use salesdesk_core::TaskService;
use salesdesk_domain::types::activity::action;
use salesdesk_domain::{
    Caller, NewTask, Result, Role, SalesdeskError, Task, TaskFilters, TaskStatus, TaskType,
    TaskView,
};
use support::MockActivityLog;

/// Records the scope each list call was issued with and holds one task for
/// lifecycle tests.
#[derive(Clone)]
struct MockTaskStore {
    task: Arc<Mutex<Task>>,
    scopes: Arc<Mutex<Vec<TaskScope>>>,
}

impl MockTaskStore {
    fn new(task: Task) -> Self {
        Self { task: Arc::new(Mutex::new(task)), scopes: Arc::new(Mutex::new(Vec::new())) }
    }

    fn current(&self) -> Task {
        self.task.lock().map(|task| task.clone()).unwrap_or_else(|err| err.into_inner().clone())
    }

    fn seen_scopes(&self) -> Vec<TaskScope> {
        self.scopes.lock().map(|scopes| scopes.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TaskStore for MockTaskStore {
    async fn list(
        &self,
        scope: &TaskScope,
        _filters: &TaskFilters,
        _page: u32,
        _page_size: u32,
    ) -> Result<(Vec<Task>, u64)> {
        if let Ok(mut scopes) = self.scopes.lock() {
            scopes.push(scope.clone());
        }
        Ok((vec![self.current()], 1))
    }

    async fn get(&self, id: &str) -> Result<Task> {
        let task = self.current();
        if task.id == id {
            Ok(task)
        } else {
            Err(SalesdeskError::NotFound(format!("task {id}")))
        }
    }

    async fn insert(&self, new_task: NewTask) -> Result<Task> {
        Ok(Task {
            id: "task-new".to_string(),
            task_type: new_task.task_type,
            description: new_task.description,
            due_date: new_task.due_date,
            status: TaskStatus::Pending,
            cancel_reason: None,
            owner_id: new_task.owner_id,
            lead_id: new_task.lead_id,
            deal_id: new_task.deal_id,
            created_at: now(),
        })
    }

    async fn set_status(
        &self,
        _id: &str,
        status: TaskStatus,
        cancel_reason: Option<&str>,
    ) -> Result<()> {
        if let Ok(mut task) = self.task.lock() {
            task.status = status;
            task.cancel_reason = cancel_reason.map(str::to_string);
        }
        Ok(())
    }
}

fn now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("timestamp valid")
}

fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("date valid")
}

fn pending_task() -> Task {
    Task {
        id: "task-1".to_string(),
        task_type: TaskType::Call,
        description: "intro call".to_string(),
        due_date: due_date(),
        status: TaskStatus::Pending,
        cancel_reason: None,
        owner_id: "user-1".to_string(),
        lead_id: None,
        deal_id: None,
        created_at: now(),
    }
}

fn caller(role: Role) -> Caller {
    Caller { user_id: "user-1".to_string(), role, department: "emea".to_string() }
}

fn service(store: &MockTaskStore, log: &MockActivityLog) -> TaskService {
    TaskService::new(Arc::new(store.clone()), Arc::new(log.clone()))
}

#[tokio::test]
async fn team_view_scopes_to_department_for_managers() {
    let store = MockTaskStore::new(pending_task());
    let svc = service(&store, &MockActivityLog::default());

    svc.list(TaskView::Team, &caller(Role::Manager), &TaskFilters::default(), 1, 20)
        .await
        .expect("list succeeds");

    assert_eq!(store.seen_scopes(), vec![TaskScope::Department("emea".to_string())]);
}

#[tokio::test]
async fn team_view_degrades_to_own_tasks_for_non_managers() {
    let store = MockTaskStore::new(pending_task());
    let svc = service(&store, &MockActivityLog::default());

    svc.list(TaskView::Team, &caller(Role::SalesRep), &TaskFilters::default(), 1, 20)
        .await
        .expect("list succeeds");

    assert_eq!(store.seen_scopes(), vec![TaskScope::Owner("user-1".to_string())]);
}

#[tokio::test]
async fn owner_filter_is_ignored_outside_team_view() {
    let store = MockTaskStore::new(pending_task());
    let svc = service(&store, &MockActivityLog::default());

    let filters =
        TaskFilters { owner_id: Some("user-7".to_string()), ..TaskFilters::default() };
    svc.list(TaskView::My, &caller(Role::Manager), &filters, 1, 20)
        .await
        .expect("list succeeds");

    // The scope already pins the owner; the filter must not leak through.
    assert_eq!(store.seen_scopes(), vec![TaskScope::Owner("user-1".to_string())]);
}

#[tokio::test]
async fn complete_marks_pending_task_and_logs() {
    let store = MockTaskStore::new(pending_task());
    let log = MockActivityLog::default();
    let svc = service(&store, &log);

    let task = svc.complete("task-1", "user-2").await.expect("complete succeeds");

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(store.current().status, TaskStatus::Completed);

    let recorded = log.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].action_type, action::TASK_COMPLETED);
}

#[tokio::test]
async fn complete_rejects_non_pending_tasks() {
    let mut task = pending_task();
    task.status = TaskStatus::Cancelled;
    let store = MockTaskStore::new(task);
    let svc = service(&store, &MockActivityLog::default());

    let err = svc.complete("task-1", "user-2").await.expect_err("must reject");
    assert!(matches!(err, SalesdeskError::InvalidInput(_)));
}

#[tokio::test]
async fn cancel_stores_reason_and_logs() {
    let store = MockTaskStore::new(pending_task());
    let log = MockActivityLog::default();
    let svc = service(&store, &log);

    let task =
        svc.cancel("task-1", "lead went cold", "user-2").await.expect("cancel succeeds");

    assert_eq!(task.status, TaskStatus::Cancelled);
    assert_eq!(task.cancel_reason.as_deref(), Some("lead went cold"));
    assert_eq!(store.current().cancel_reason.as_deref(), Some("lead went cold"));

    let recorded = log.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].action_type, action::TASK_CANCELLED);
    assert_eq!(recorded[0].metadata["reason"], "lead went cold");
}
