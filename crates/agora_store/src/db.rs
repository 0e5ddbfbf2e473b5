use sea_orm::sea_query::{self, Alias};
use sea_orm_migration::prelude::Iden;

#[derive(Iden, Clone, Copy)]
pub enum Products {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Title,
    Description,
    Price,
    CompareAtPrice,
    Qty,
    Video,
    VariantHint,
    ParentHandle,
    ParentId,
}

#[derive(Iden, Clone, Copy)]
pub enum Collections {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Title,
    Description,
    Published,
}

#[derive(Iden, Clone, Copy)]
pub enum Discounts {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Title,
    Description,
    Published,
    Priority,
    Application,
    Info,
}

#[derive(Iden, Clone, Copy)]
pub enum Orders {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Contact,
    Status,
    Pricing,
    LineItems,
    Delivery,
    PaymentGateway,
    Notes,
}

#[derive(Iden, Clone, Copy)]
pub enum Storefronts {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Title,
    Description,
    Video,
    Published,
}

#[derive(Iden, Clone, Copy)]
pub enum Customers {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Email,
    AuthId,
    Firstname,
    Lastname,
    PhoneNumber,
    Picture,
}

#[derive(Iden, Clone, Copy)]
pub enum Tags {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Values,
}

#[derive(Iden, Clone, Copy)]
pub enum Images {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Name,
    Url,
}

#[derive(Iden, Clone, Copy)]
pub enum Notifications {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Message,
    Author,
    Actions,
}

#[derive(Iden, Clone, Copy)]
pub enum Posts {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Title,
    Text,
}

#[derive(Iden, Clone, Copy)]
pub enum ShippingMethods {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Title,
    Price,
}

#[derive(Iden, Clone, Copy)]
pub enum Templates {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Title,
    TemplateHtml,
    TemplateText,
    ReferenceExampleInput,
}

#[derive(Iden, Clone, Copy)]
pub enum AuthUsers {
    Table,
    Id,
    Handle,
    CreatedAt,
    UpdatedAt,
    Active,
    Attributes,
    Email,
    Password,
    ConfirmedMail,
    Roles,
}

/// Base table names, in creation order. Every one of these carries the shared
/// id/handle/created_at/updated_at/active/attributes columns.
pub const BASE_TABLES: [&str; 13] = [
    "products",
    "collections",
    "discounts",
    "orders",
    "storefronts",
    "customers",
    "tags",
    "images",
    "notifications",
    "posts",
    "shipping_methods",
    "templates",
    "auth_users",
];

/// Physical column families. Reads use them to convert row values into
/// document fields; projections use them to re-tag serialized JSON columns so
/// they nest as JSON instead of as escaped strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColKind {
    Text,
    Bool,
    Real,
    Int,
    Json,
}

/// Columns shared by every junction table. `Id` is the synthetic autoincrement
/// key that preserves insertion order for array reconstruction.
#[derive(Iden, Clone, Copy)]
pub enum Junction {
    Id,
    EntityId,
    EntityHandle,
    Value,
    Reporter,
    Context,
}

/// One physical table per relation kind, all with the [`Junction`] shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JunctionKind {
    /// Tag strings of any entity.
    Tags,
    /// Search tokens of any entity; written on upsert, matched by `search`.
    SearchTerms,
    /// Media URLs of any entity.
    Media,
    /// value/reporter = collection id/handle, owner = product.
    ProductsToCollections,
    /// value/reporter = discount id/handle, owner = product.
    ProductsToDiscounts,
    /// value/reporter = variant id/handle, owner = parent product.
    ProductsToVariants,
    /// value/reporter = related id/handle, owner = storefront, context =
    /// related table name.
    StorefrontsToOther,
}

impl JunctionKind {
    pub const ALL: [JunctionKind; 7] = [
        JunctionKind::Tags,
        JunctionKind::SearchTerms,
        JunctionKind::Media,
        JunctionKind::ProductsToCollections,
        JunctionKind::ProductsToDiscounts,
        JunctionKind::ProductsToVariants,
        JunctionKind::StorefrontsToOther,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            JunctionKind::Tags => "entity_to_tags_projections",
            JunctionKind::SearchTerms => "entity_to_search_terms",
            JunctionKind::Media => "entity_to_media",
            JunctionKind::ProductsToCollections => "products_to_collections",
            JunctionKind::ProductsToDiscounts => "products_to_discounts",
            JunctionKind::ProductsToVariants => "products_to_variants",
            JunctionKind::StorefrontsToOther => "storefronts_to_other",
        }
    }

    pub fn table(self) -> Alias {
        Alias::new(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::sea_query::{IntoIden, SqliteQueryBuilder};

    use super::*;

    #[test]
    fn idens_render_snake_case() {
        assert_eq!(Products::Table.into_iden().to_string(), "products");
        assert_eq!(
            Products::CompareAtPrice.into_iden().to_string(),
            "compare_at_price"
        );
        assert_eq!(Junction::EntityHandle.into_iden().to_string(), "entity_handle");
    }

    #[test]
    fn junction_kinds_map_to_tables() {
        assert_eq!(JunctionKind::Tags.table_name(), "entity_to_tags_projections");
        assert_eq!(
            JunctionKind::StorefrontsToOther.table_name(),
            "storefronts_to_other"
        );
        let sql = sea_orm::sea_query::Query::select()
            .column(Junction::Value)
            .from(JunctionKind::Media.table())
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains("entity_to_media"));
    }
}
