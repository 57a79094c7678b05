/**
 * Task Store
 *
 * In-memory task arena behind the tasks micro-frontend. Ids are assigned
 * from a monotonic counter and never reused; the newest task is listed
 * first. Contents live for the lifetime of the process.
 *
 * # Thread Safety
 *
 * Handlers share the store as `TasksState` (`Arc<RwLock<TaskStore>>`):
 * listings take the read lock, mutations the write lock.
 */

use crate::backend::error::BackendError;
use crate::shared::task::{NewTask, Task, TaskFilter, TaskPriority, TaskStats, TaskStatus, TaskUpdate};
use crate::shared::ShellError;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle used as axum state
pub type TasksState = Arc<RwLock<TaskStore>>;

pub const TASK_NOT_FOUND: &str = "Tarea no encontrada";
pub const TITLE_REQUIRED: &str = "El título es requerido";

#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Empty store
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Store with the three demo tasks shown on first start
    pub fn seeded() -> Self {
        let seed = |id, title: &str, description: &str, status, priority, created: &str| Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            status,
            priority,
            created: created.to_string(),
        };
        Self {
            tasks: vec![
                seed(
                    1,
                    "Implementar autenticación",
                    "Crear sistema de login",
                    TaskStatus::Completed,
                    TaskPriority::High,
                    "2025-11-20T00:00:00.000Z",
                ),
                seed(
                    2,
                    "Diseñar interfaz de chat",
                    "Mockups y wireframes",
                    TaskStatus::InProgress,
                    TaskPriority::Medium,
                    "2025-11-22T00:00:00.000Z",
                ),
                seed(
                    3,
                    "Configurar Kubernetes",
                    "Setup de deployments",
                    TaskStatus::Pending,
                    TaskPriority::High,
                    "2025-11-25T00:00:00.000Z",
                ),
            ],
            next_id: 4,
        }
    }

    /// Wrap the store for sharing between handlers
    pub fn into_state(self) -> TasksState {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks matching `filter`, newest first
    pub fn list(&self, filter: &TaskFilter) -> Vec<Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).cloned().collect()
    }

    pub fn get(&self, id: u64) -> Result<&Task, BackendError> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| BackendError::not_found(TASK_NOT_FOUND))
    }

    /// Create a task from a request body
    ///
    /// # Returns
    ///
    /// The stored task: trimmed title and description, status `pending`,
    /// priority defaulting to `medium`
    pub fn create(&mut self, new: NewTask) -> Result<Task, BackendError> {
        let title = new.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(ShellError::validation("title", TITLE_REQUIRED).into());
        }
        let priority = new.priority.unwrap_or_default();
        check_priority(&priority)?;

        let task = Task {
            id: self.next_id,
            title: title.to_string(),
            description: new.description.as_deref().map(str::trim).unwrap_or_default().to_string(),
            status: TaskStatus::Pending,
            priority,
            created: crate::shared::chat::timestamp_now(),
        };
        self.next_id += 1;
        self.tasks.insert(0, task.clone());
        tracing::info!("[Tasks] Created task {}: {}", task.id, task.title);
        Ok(task)
    }

    /// Apply a partial update
    pub fn update(&mut self, id: u64, update: TaskUpdate) -> Result<Task, BackendError> {
        if let Some(status) = &update.status {
            if !status.is_known() {
                return Err(ShellError::validation("status", format!("Estado inválido: {}", status.as_str())).into());
            }
        }
        if let Some(priority) = &update.priority {
            check_priority(priority)?;
        }

        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| BackendError::not_found(TASK_NOT_FOUND))?;
        update.apply(task);
        tracing::info!("[Tasks] Updated task {}", id);
        Ok(task.clone())
    }

    pub fn delete(&mut self, id: u64) -> Result<Task, BackendError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| BackendError::not_found(TASK_NOT_FOUND))?;
        tracing::info!("[Tasks] Deleted task {}", id);
        Ok(self.tasks.remove(index))
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::compute(&self.tasks)
    }
}

fn check_priority(priority: &TaskPriority) -> Result<(), BackendError> {
    if priority.is_known() {
        Ok(())
    } else {
        Err(ShellError::validation("priority", format!("Prioridad inválida: {}", priority.as_str())).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_seeded_contents() {
        let store = TaskStore::seeded();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(2).unwrap().status, TaskStatus::InProgress);
        assert_eq!(
            store.stats(),
            TaskStats {
                total: 3,
                completed: 1,
                in_progress: 1,
                pending: 1,
                high_priority: 2,
            }
        );
    }

    #[test]
    fn test_create_defaults_and_order() {
        let mut store = TaskStore::seeded();
        let task = store.create(new_task("  Escribir docs  ")).unwrap();
        assert_eq!(task.id, 4);
        assert_eq!(task.title, "Escribir docs");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(store.list(&TaskFilter::default())[0].id, 4);
    }

    #[test]
    fn test_create_requires_title() {
        let mut store = TaskStore::new();
        let err = store.create(new_task("   ")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), TITLE_REQUIRED);
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_rejects_unknown_priority() {
        let mut store = TaskStore::new();
        let err = store
            .create(NewTask {
                title: Some("x".into()),
                priority: Some(TaskPriority::from("urgent".to_string())),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut store = TaskStore::seeded();
        store.delete(3).unwrap();
        assert_eq!(store.create(new_task("otra")).unwrap().id, 4);
    }

    #[test]
    fn test_update_and_missing_ids() {
        let mut store = TaskStore::seeded();
        let updated = store
            .update(
                3,
                TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.title, "Configurar Kubernetes");

        assert_eq!(store.update(99, TaskUpdate::default()).unwrap_err().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(store.delete(99).unwrap_err().message(), TASK_NOT_FOUND);
    }

    #[test]
    fn test_filter() {
        let store = TaskStore::seeded();
        let filter = TaskFilter {
            status: Some("all".into()),
            priority: Some("high".into()),
        };
        let ids: Vec<u64> = store.list(&filter).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
