/**
 * Task Data Structures
 *
 * Types served by the tasks micro-frontend and shared with any client that
 * calls it through the API proxy.
 *
 * Status and priority travel as plain strings (`"in-progress"`, `"high"`).
 * Values outside the known set are preserved in an `Other` variant so a
 * newer service never breaks an older client; their label falls back to the
 * raw value and their icon to a generic glyph.
 */
use serde::{Deserialize, Serialize};

/// Workflow state of a task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    /// Unrecognized wire value
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Other(raw) => raw,
        }
    }

    /// Spanish display label
    pub fn label(&self) -> &str {
        match self {
            TaskStatus::Pending => "Pendiente",
            TaskStatus::InProgress => "En Progreso",
            TaskStatus::Completed => "Completada",
            TaskStatus::Other(raw) => raw,
        }
    }

    /// Material icon name
    pub fn icon(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending_actions",
            TaskStatus::InProgress => "autorenew",
            TaskStatus::Completed => "check_circle",
            TaskStatus::Other(_) => "help",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TaskStatus::Other(_))
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => TaskStatus::Pending,
            "in-progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            _ => TaskStatus::Other(value),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Other(String),
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl TaskPriority {
    pub fn as_str(&self) -> &str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TaskPriority::Low => "Baja",
            TaskPriority::Medium => "Media",
            TaskPriority::High => "Alta",
            TaskPriority::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TaskPriority::Other(_))
    }
}

impl From<String> for TaskPriority {
    fn from(value: String) -> Self {
        match value.as_str() {
            "low" => TaskPriority::Low,
            "medium" => TaskPriority::Medium,
            "high" => TaskPriority::High,
            _ => TaskPriority::Other(value),
        }
    }
}

impl From<TaskPriority> for String {
    fn from(priority: TaskPriority) -> Self {
        match priority {
            TaskPriority::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// A task record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Creation time, RFC 3339
    pub created: String,
}

/// Body of `POST /api/tasks`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
}

/// Body of `PUT /api/tasks/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
}

impl TaskUpdate {
    /// Apply the update in place
    ///
    /// An empty title (after trimming) keeps the current title.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            let title = title.trim();
            if !title.is_empty() {
                task.title = title.to_string();
            }
        }
        if let Some(description) = self.description {
            task.description = description.trim().to_string();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
    }
}

/// Query filter for task listings; `all` or absent matches everything
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        fn accepts(filter: &Option<String>, value: &str) -> bool {
            match filter.as_deref() {
                None | Some("") | Some("all") => true,
                Some(wanted) => wanted == value,
            }
        }
        accepts(&self.status, task.status.as_str()) && accepts(&self.priority, task.priority.as_str())
    }
}

/// Aggregate counters served by `GET /api/stats`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub high_priority: usize,
}

impl TaskStats {
    pub fn compute<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Other(_) => {}
            }
            if task.priority == TaskPriority::High {
                stats.high_priority += 1;
            }
            stats
        })
    }
}
