use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, EntityTrait, QueryOrder};

use crate::entities::*;
use crate::todo::{NewTodo, StorageError, TodoItem};

/// Durable store of todo items addressed by integer ID.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoGateway: Send + Sync {
    /// Returns every stored item.
    async fn list_all(&self) -> Result<Vec<TodoItem>, StorageError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<TodoItem>, StorageError>;

    /// Inserts a new item and returns it with its assigned ID.
    async fn insert(&self, new_todo: NewTodo) -> Result<TodoItem, StorageError>;

    /// Writes every mutable field of an existing item.
    ///
    /// Fails with a storage error if the row no longer exists.
    async fn persist(&self, item: TodoItem) -> Result<TodoItem, StorageError>;

    async fn remove(&self, id: i32) -> Result<(), StorageError>;
}

impl From<todo_item::Model> for TodoItem {
    fn from(model: todo_item::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            priority: model.priority,
            category_id: model.category_id,
            due_date: model.due_date.with_timezone(&Utc),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// `TodoGateway` backed by a SeaORM connection borrowed for the duration of a request.
pub struct SeaOrmTodoGateway<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl SeaOrmTodoGateway<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> SeaOrmTodoGateway<'_> {
        SeaOrmTodoGateway { db }
    }
}

#[async_trait]
impl TodoGateway for SeaOrmTodoGateway<'_> {
    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<TodoItem>, StorageError> {
        let items = todo_item::Entity::find()
            .order_by_asc(todo_item::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(TodoItem::from)
            .collect();
        Ok(items)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Option<TodoItem>, StorageError> {
        let item = todo_item::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .map(TodoItem::from);
        Ok(item)
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, new_todo: NewTodo) -> Result<TodoItem, StorageError> {
        let active_model = todo_item::ActiveModel {
            title: ActiveValue::Set(new_todo.title),
            description: ActiveValue::Set(new_todo.description),
            status: ActiveValue::Set(new_todo.status),
            priority: ActiveValue::Set(new_todo.priority),
            category_id: ActiveValue::Set(new_todo.category_id),
            due_date: ActiveValue::Set(new_todo.due_date.into()),
            created_at: ActiveValue::Set(new_todo.created_at.into()),
            updated_at: ActiveValue::Set(new_todo.updated_at.into()),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(TodoItem::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    async fn persist(&self, item: TodoItem) -> Result<TodoItem, StorageError> {
        // created_at is left NotSet so an update can never rewrite it.
        let active_model = todo_item::ActiveModel {
            id: ActiveValue::Unchanged(item.id),
            title: ActiveValue::Set(item.title),
            description: ActiveValue::Set(item.description),
            status: ActiveValue::Set(item.status),
            priority: ActiveValue::Set(item.priority),
            category_id: ActiveValue::Set(item.category_id),
            due_date: ActiveValue::Set(item.due_date.into()),
            updated_at: ActiveValue::Set(item.updated_at.into()),
            ..Default::default()
        };
        let updated_model = active_model.update(self.db).await?;
        Ok(TodoItem::from(updated_model))
    }

    #[tracing::instrument(skip(self))]
    async fn remove(&self, id: i32) -> Result<(), StorageError> {
        todo_item::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(())
    }
}
