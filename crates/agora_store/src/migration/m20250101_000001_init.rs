use sea_orm_migration::prelude::*;

use crate::db::{
    AuthUsers, BASE_TABLES, Collections, Customers, Discounts, Images, Junction, JunctionKind,
    Notifications, Orders, Posts, Products, ShippingMethods, Storefronts, Tags, Templates,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                base_table(
                    Products::Table,
                    Products::Id,
                    Products::Handle,
                    Products::CreatedAt,
                    Products::UpdatedAt,
                    Products::Active,
                    Products::Attributes,
                )
                .col(ColumnDef::new(Products::Title).string())
                .col(ColumnDef::new(Products::Description).text())
                .col(ColumnDef::new(Products::Price).double().not_null().default(0.0))
                .col(ColumnDef::new(Products::CompareAtPrice).double())
                .col(ColumnDef::new(Products::Qty).big_integer().not_null().default(0))
                .col(ColumnDef::new(Products::Video).string())
                .col(ColumnDef::new(Products::VariantHint).text())
                .col(ColumnDef::new(Products::ParentHandle).string())
                .col(ColumnDef::new(Products::ParentId).string())
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    Collections::Table,
                    Collections::Id,
                    Collections::Handle,
                    Collections::CreatedAt,
                    Collections::UpdatedAt,
                    Collections::Active,
                    Collections::Attributes,
                )
                .col(ColumnDef::new(Collections::Title).string())
                .col(ColumnDef::new(Collections::Description).text())
                .col(ColumnDef::new(Collections::Published).string())
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    Discounts::Table,
                    Discounts::Id,
                    Discounts::Handle,
                    Discounts::CreatedAt,
                    Discounts::UpdatedAt,
                    Discounts::Active,
                    Discounts::Attributes,
                )
                .col(ColumnDef::new(Discounts::Title).string())
                .col(ColumnDef::new(Discounts::Description).text())
                .col(ColumnDef::new(Discounts::Published).string())
                .col(
                    ColumnDef::new(Discounts::Priority)
                        .big_integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Discounts::Application)
                        .small_integer()
                        .not_null()
                        .default(0),
                )
                .col(ColumnDef::new(Discounts::Info).text())
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    Orders::Table,
                    Orders::Id,
                    Orders::Handle,
                    Orders::CreatedAt,
                    Orders::UpdatedAt,
                    Orders::Active,
                    Orders::Attributes,
                )
                .col(ColumnDef::new(Orders::Contact).text())
                .col(ColumnDef::new(Orders::Status).text())
                .col(ColumnDef::new(Orders::Pricing).text())
                .col(ColumnDef::new(Orders::LineItems).text())
                .col(ColumnDef::new(Orders::Delivery).text())
                .col(ColumnDef::new(Orders::PaymentGateway).text())
                .col(ColumnDef::new(Orders::Notes).text())
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    Storefronts::Table,
                    Storefronts::Id,
                    Storefronts::Handle,
                    Storefronts::CreatedAt,
                    Storefronts::UpdatedAt,
                    Storefronts::Active,
                    Storefronts::Attributes,
                )
                .col(ColumnDef::new(Storefronts::Title).string())
                .col(ColumnDef::new(Storefronts::Description).text())
                .col(ColumnDef::new(Storefronts::Video).string())
                .col(ColumnDef::new(Storefronts::Published).string())
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    Customers::Table,
                    Customers::Id,
                    Customers::Handle,
                    Customers::CreatedAt,
                    Customers::UpdatedAt,
                    Customers::Active,
                    Customers::Attributes,
                )
                .col(ColumnDef::new(Customers::Email).string())
                .col(ColumnDef::new(Customers::AuthId).string())
                .col(ColumnDef::new(Customers::Firstname).string())
                .col(ColumnDef::new(Customers::Lastname).string())
                .col(ColumnDef::new(Customers::PhoneNumber).string())
                .col(ColumnDef::new(Customers::Picture).string())
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    Tags::Table,
                    Tags::Id,
                    Tags::Handle,
                    Tags::CreatedAt,
                    Tags::UpdatedAt,
                    Tags::Active,
                    Tags::Attributes,
                )
                .col(ColumnDef::new(Tags::Values).text())
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    Images::Table,
                    Images::Id,
                    Images::Handle,
                    Images::CreatedAt,
                    Images::UpdatedAt,
                    Images::Active,
                    Images::Attributes,
                )
                .col(ColumnDef::new(Images::Name).string())
                .col(ColumnDef::new(Images::Url).text())
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    Notifications::Table,
                    Notifications::Id,
                    Notifications::Handle,
                    Notifications::CreatedAt,
                    Notifications::UpdatedAt,
                    Notifications::Active,
                    Notifications::Attributes,
                )
                .col(ColumnDef::new(Notifications::Message).text())
                .col(ColumnDef::new(Notifications::Author).string())
                .col(ColumnDef::new(Notifications::Actions).text())
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    Posts::Table,
                    Posts::Id,
                    Posts::Handle,
                    Posts::CreatedAt,
                    Posts::UpdatedAt,
                    Posts::Active,
                    Posts::Attributes,
                )
                .col(ColumnDef::new(Posts::Title).string())
                .col(ColumnDef::new(Posts::Text).text())
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    ShippingMethods::Table,
                    ShippingMethods::Id,
                    ShippingMethods::Handle,
                    ShippingMethods::CreatedAt,
                    ShippingMethods::UpdatedAt,
                    ShippingMethods::Active,
                    ShippingMethods::Attributes,
                )
                .col(ColumnDef::new(ShippingMethods::Title).string())
                .col(
                    ColumnDef::new(ShippingMethods::Price)
                        .double()
                        .not_null()
                        .default(0.0),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    Templates::Table,
                    Templates::Id,
                    Templates::Handle,
                    Templates::CreatedAt,
                    Templates::UpdatedAt,
                    Templates::Active,
                    Templates::Attributes,
                )
                .col(ColumnDef::new(Templates::Title).string())
                .col(ColumnDef::new(Templates::TemplateHtml).text())
                .col(ColumnDef::new(Templates::TemplateText).text())
                .col(ColumnDef::new(Templates::ReferenceExampleInput).text())
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_table(
                    AuthUsers::Table,
                    AuthUsers::Id,
                    AuthUsers::Handle,
                    AuthUsers::CreatedAt,
                    AuthUsers::UpdatedAt,
                    AuthUsers::Active,
                    AuthUsers::Attributes,
                )
                .col(ColumnDef::new(AuthUsers::Email).string())
                .col(ColumnDef::new(AuthUsers::Password).string())
                .col(
                    ColumnDef::new(AuthUsers::ConfirmedMail)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(ColumnDef::new(AuthUsers::Roles).text())
                .to_owned(),
            )
            .await?;

        for kind in JunctionKind::ALL {
            manager.create_table(junction_table(kind)).await?;
        }

        create_indexes(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for kind in JunctionKind::ALL {
            manager
                .drop_table(Table::drop().table(kind.table()).if_exists().to_owned())
                .await?;
        }
        for name in BASE_TABLES.iter().rev() {
            manager
                .drop_table(Table::drop().table(Alias::new(*name)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

/// The column set every base table starts from.
fn base_table<T>(
    table: T,
    id: T,
    handle: T,
    created_at: T,
    updated_at: T,
    active: T,
    attributes: T,
) -> TableCreateStatement
where
    T: Iden + 'static,
{
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(id).string().not_null().primary_key())
        .col(ColumnDef::new(handle).string().not_null())
        .col(ColumnDef::new(created_at).string().not_null())
        .col(ColumnDef::new(updated_at).string().not_null())
        .col(ColumnDef::new(active).boolean().not_null().default(true))
        .col(ColumnDef::new(attributes).text())
        .to_owned()
}

/// Junction tables all share one shape; the autoincrement id preserves
/// insertion order.
fn junction_table(kind: JunctionKind) -> TableCreateStatement {
    Table::create()
        .table(kind.table())
        .if_not_exists()
        .col(
            ColumnDef::new(Junction::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Junction::EntityId).string())
        .col(ColumnDef::new(Junction::EntityHandle).string())
        .col(ColumnDef::new(Junction::Value).string())
        .col(ColumnDef::new(Junction::Reporter).string())
        .col(ColumnDef::new(Junction::Context).string())
        .to_owned()
}

async fn create_indexes(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    for name in BASE_TABLES {
        manager
            .create_index(
                Index::create()
                    .name(format!("{name}_handle_uidx"))
                    .table(Alias::new(name))
                    .col(Alias::new("handle"))
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name(format!("{name}_updated_idx"))
                    .table(Alias::new(name))
                    .col(Alias::new("updated_at"))
                    .col(Alias::new("id"))
                    .to_owned(),
            )
            .await?;
    }

    for kind in JunctionKind::ALL {
        let name = kind.table_name();
        manager
            .create_index(
                Index::create()
                    .name(format!("{name}_owner_idx"))
                    .table(kind.table())
                    .col(Junction::EntityId)
                    .col(Junction::EntityHandle)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name(format!("{name}_value_idx"))
                    .table(kind.table())
                    .col(Junction::Value)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name(format!("{name}_reporter_idx"))
                    .table(kind.table())
                    .col(Junction::Reporter)
                    .to_owned(),
            )
            .await?;
    }

    manager
        .create_index(
            Index::create()
                .name("customers_email_idx")
                .table(Customers::Table)
                .col(Customers::Email)
                .to_owned(),
        )
        .await?;
    manager
        .create_index(
            Index::create()
                .name("auth_users_email_idx")
                .table(AuthUsers::Table)
                .col(AuthUsers::Email)
                .to_owned(),
        )
        .await?;

    Ok(())
}
