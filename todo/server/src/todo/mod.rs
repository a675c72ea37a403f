use chrono::{DateTime, Duration, SubsecRound, Utc};

pub mod api;
pub mod gateway;

pub use gateway::{SeaOrmTodoGateway, TodoGateway};

pub const DEFAULT_STATUS: &str = "todo";
pub const DEFAULT_PRIORITY: &str = "low";

/// A stored todo item.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct TodoItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub category_id: String,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied content of a todo item, without identity or bookkeeping timestamps.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub category_id: String,
    /// Falls back to the time the draft is applied.
    pub due_date: Option<DateTime<Utc>>,
}

impl Default for TodoDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: DEFAULT_STATUS.to_string(),
            priority: DEFAULT_PRIORITY.to_string(),
            category_id: String::new(),
            due_date: None,
        }
    }
}

/// A todo item ready to be inserted; the gateway assigns its ID.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub category_id: String,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Error type for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Source of the current time for timestamp bookkeeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        // timestamptz stores microseconds
        Utc::now().trunc_subsecs(6)
    }
}

pub struct TodoService<G, C = SystemClock> {
    gateway: G,
    clock: C,
}

impl<G: TodoGateway> TodoService<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_clock(gateway, SystemClock)
    }
}

impl<G: TodoGateway, C: Clock> TodoService<G, C> {
    pub fn with_clock(gateway: G, clock: C) -> Self {
        Self { gateway, clock }
    }

    /// Retrieves all todo items.
    ///
    /// # Returns
    ///
    /// A `Result` containing every stored `TodoItem`, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<TodoItem>, StorageError> {
        self.gateway.list_all().await
    }

    /// Retrieves a todo item by its ID.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no item has the given ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: i32) -> Result<Option<TodoItem>, StorageError> {
        self.gateway.find_by_id(id).await
    }

    /// Creates a new todo item, stamping both timestamps with the current time.
    ///
    /// # Arguments
    ///
    /// * `draft` - The content of the new item.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `TodoItem` with its assigned ID.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, draft: TodoDraft) -> Result<TodoItem, StorageError> {
        let now = self.clock.now();
        let new_todo = NewTodo {
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            category_id: draft.category_id,
            due_date: draft.due_date.unwrap_or(now),
            created_at: now,
            updated_at: now,
        };
        let created = self.gateway.insert(new_todo).await?;
        tracing::info!("Created todo item {}", created.id);
        Ok(created)
    }

    /// Overwrites the content of an existing todo item and refreshes its `updated_at`.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the item to update.
    /// * `draft` - The new content of the item.
    ///
    /// # Returns
    ///
    /// `Ok(None)` without writing anything when no item has the given ID,
    /// otherwise the updated `TodoItem`.
    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        draft: TodoDraft,
    ) -> Result<Option<TodoItem>, StorageError> {
        let Some(mut item) = self.gateway.find_by_id(id).await? else {
            tracing::debug!("Todo item {} not found, nothing to update", id);
            return Ok(None);
        };

        let now = self.clock.now();
        item.title = draft.title;
        item.description = draft.description;
        item.status = draft.status;
        item.priority = draft.priority;
        item.category_id = draft.category_id;
        item.due_date = draft.due_date.unwrap_or(now);
        // strictly after the previous value, even if the clock stepped back
        item.updated_at = now.max(item.updated_at + Duration::microseconds(1));

        let updated = self.gateway.persist(item).await?;
        tracing::info!("Updated todo item {}", updated.id);
        Ok(Some(updated))
    }

    /// Deletes a todo item by its ID. Deleting a missing item is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), StorageError> {
        match self.gateway.find_by_id(id).await? {
            Some(item) => {
                self.gateway.remove(item.id).await?;
                tracing::info!("Deleted todo item {}", id);
            }
            None => tracing::debug!("Todo item {} not found, nothing to delete", id),
        }
        Ok(())
    }
}
