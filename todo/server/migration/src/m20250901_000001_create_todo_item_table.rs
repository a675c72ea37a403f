use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const DEFAULT_STATUS: &str = "todo";
const DEFAULT_PRIORITY: &str = "low";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TodoItem::Table)
                    .if_not_exists()
                    .col(pk_auto(TodoItem::Id))
                    .col(string(TodoItem::Title).default(""))
                    .col(text(TodoItem::Description).default(""))
                    .col(string(TodoItem::Status).default(DEFAULT_STATUS))
                    .col(string(TodoItem::Priority).default(DEFAULT_PRIORITY))
                    .col(string(TodoItem::CategoryId).default(""))
                    .col(
                        timestamp_with_time_zone(TodoItem::DueDate)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(TodoItem::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(TodoItem::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TodoItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TodoItem {
    Table,
    Id,
    Title,
    Description,
    Status,
    Priority,
    CategoryId,
    DueDate,
    CreatedAt,
    UpdatedAt,
}
