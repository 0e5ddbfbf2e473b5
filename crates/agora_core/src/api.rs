use async_trait::async_trait;

use crate::{
    AgoraResult, ApiQuery, AuthUser, Collection, Customer, Discount, Expand, Image, Notification,
    Order, Post, Product, ShippingMethod, Storefront, Tag, Template,
};

/// Every resource exposes the same contract: `get` by id-or-handle with
/// relation expansion, `list` driven by an [`ApiQuery`], transactional
/// `upsert` with caller-supplied extra search terms, cascading `remove`, and
/// `count`. `get` returns `Ok(None)` for unknown ids; `remove` returns
/// `Ok(false)` when nothing matched.
#[async_trait]
pub trait ProductsApi {
    async fn get_product(&self, id_or_handle: &str, expand: Expand)
        -> AgoraResult<Option<Product>>;
    async fn list_products(&self, query: ApiQuery) -> AgoraResult<Vec<Product>>;
    async fn upsert_product(&self, item: Product, search_terms: Vec<String>) -> AgoraResult<()>;
    async fn remove_product(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_products(&self, query: ApiQuery) -> AgoraResult<u64>;

    /// Distinct tag values across all products, for filter UIs.
    async fn list_used_tags(&self) -> AgoraResult<Vec<String>>;
    async fn add_product_to_collection(
        &self,
        product: &str,
        collection: &str,
    ) -> AgoraResult<()>;
    async fn remove_product_from_collection(
        &self,
        product: &str,
        collection: &str,
    ) -> AgoraResult<()>;
}

#[async_trait]
pub trait CollectionsApi {
    async fn get_collection(
        &self,
        id_or_handle: &str,
        expand: Expand,
    ) -> AgoraResult<Option<Collection>>;
    async fn list_collections(&self, query: ApiQuery) -> AgoraResult<Vec<Collection>>;
    async fn upsert_collection(
        &self,
        item: Collection,
        search_terms: Vec<String>,
    ) -> AgoraResult<()>;
    async fn remove_collection(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_collections(&self, query: ApiQuery) -> AgoraResult<u64>;

    /// Products whose collection set contains the given collection, paged by
    /// the same query machinery as a plain product list.
    async fn list_collection_products(
        &self,
        id_or_handle: &str,
        query: ApiQuery,
    ) -> AgoraResult<Vec<Product>>;
    async fn count_collection_products(&self, id_or_handle: &str) -> AgoraResult<u64>;
}

#[async_trait]
pub trait DiscountsApi {
    async fn get_discount(
        &self,
        id_or_handle: &str,
        expand: Expand,
    ) -> AgoraResult<Option<Discount>>;
    async fn list_discounts(&self, query: ApiQuery) -> AgoraResult<Vec<Discount>>;
    async fn upsert_discount(&self, item: Discount, search_terms: Vec<String>) -> AgoraResult<()>;
    async fn remove_discount(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_discounts(&self, query: ApiQuery) -> AgoraResult<u64>;

    async fn list_discount_products(
        &self,
        id_or_handle: &str,
        query: ApiQuery,
    ) -> AgoraResult<Vec<Product>>;
    async fn count_discount_products(&self, id_or_handle: &str) -> AgoraResult<u64>;
}

#[async_trait]
pub trait OrdersApi {
    async fn get_order(&self, id_or_handle: &str, expand: Expand) -> AgoraResult<Option<Order>>;
    async fn list_orders(&self, query: ApiQuery) -> AgoraResult<Vec<Order>>;
    async fn upsert_order(&self, item: Order, search_terms: Vec<String>) -> AgoraResult<()>;
    async fn remove_order(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_orders(&self, query: ApiQuery) -> AgoraResult<u64>;
}

#[async_trait]
pub trait StorefrontsApi {
    async fn get_storefront(
        &self,
        id_or_handle: &str,
        expand: Expand,
    ) -> AgoraResult<Option<Storefront>>;
    async fn list_storefronts(&self, query: ApiQuery) -> AgoraResult<Vec<Storefront>>;
    async fn upsert_storefront(
        &self,
        item: Storefront,
        search_terms: Vec<String>,
    ) -> AgoraResult<()>;
    async fn remove_storefront(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_storefronts(&self, query: ApiQuery) -> AgoraResult<u64>;

    async fn list_storefront_posts(&self, id_or_handle: &str) -> AgoraResult<Vec<Post>>;
}

#[async_trait]
pub trait CustomersApi {
    async fn get_customer(
        &self,
        id_or_handle: &str,
        expand: Expand,
    ) -> AgoraResult<Option<Customer>>;
    async fn list_customers(&self, query: ApiQuery) -> AgoraResult<Vec<Customer>>;
    async fn upsert_customer(&self, item: Customer, search_terms: Vec<String>) -> AgoraResult<()>;
    /// Also removes the auth_users row sharing the customer's email.
    async fn remove_customer(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_customers(&self, query: ApiQuery) -> AgoraResult<u64>;
}

#[async_trait]
pub trait TagsApi {
    async fn get_tag(&self, id_or_handle: &str, expand: Expand) -> AgoraResult<Option<Tag>>;
    async fn list_tags(&self, query: ApiQuery) -> AgoraResult<Vec<Tag>>;
    async fn upsert_tag(&self, item: Tag, search_terms: Vec<String>) -> AgoraResult<()>;
    async fn remove_tag(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_tags(&self, query: ApiQuery) -> AgoraResult<u64>;
}

#[async_trait]
pub trait ImagesApi {
    async fn get_image(&self, id_or_handle: &str, expand: Expand) -> AgoraResult<Option<Image>>;
    async fn list_images(&self, query: ApiQuery) -> AgoraResult<Vec<Image>>;
    async fn upsert_image(&self, item: Image, search_terms: Vec<String>) -> AgoraResult<()>;
    async fn remove_image(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_images(&self, query: ApiQuery) -> AgoraResult<u64>;
}

#[async_trait]
pub trait NotificationsApi {
    async fn get_notification(
        &self,
        id_or_handle: &str,
        expand: Expand,
    ) -> AgoraResult<Option<Notification>>;
    async fn list_notifications(&self, query: ApiQuery) -> AgoraResult<Vec<Notification>>;
    async fn upsert_notification(
        &self,
        item: Notification,
        search_terms: Vec<String>,
    ) -> AgoraResult<()>;
    /// Bulk insert for event producers that emit several notifications at
    /// once; one transaction per item.
    async fn upsert_notifications(&self, items: Vec<Notification>) -> AgoraResult<()>;
    async fn remove_notification(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_notifications(&self, query: ApiQuery) -> AgoraResult<u64>;
}

#[async_trait]
pub trait PostsApi {
    async fn get_post(&self, id_or_handle: &str, expand: Expand) -> AgoraResult<Option<Post>>;
    async fn list_posts(&self, query: ApiQuery) -> AgoraResult<Vec<Post>>;
    async fn upsert_post(&self, item: Post, search_terms: Vec<String>) -> AgoraResult<()>;
    async fn remove_post(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_posts(&self, query: ApiQuery) -> AgoraResult<u64>;
}

#[async_trait]
pub trait ShippingMethodsApi {
    async fn get_shipping_method(
        &self,
        id_or_handle: &str,
        expand: Expand,
    ) -> AgoraResult<Option<ShippingMethod>>;
    async fn list_shipping_methods(&self, query: ApiQuery) -> AgoraResult<Vec<ShippingMethod>>;
    async fn upsert_shipping_method(
        &self,
        item: ShippingMethod,
        search_terms: Vec<String>,
    ) -> AgoraResult<()>;
    async fn remove_shipping_method(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_shipping_methods(&self, query: ApiQuery) -> AgoraResult<u64>;
}

#[async_trait]
pub trait TemplatesApi {
    async fn get_template(
        &self,
        id_or_handle: &str,
        expand: Expand,
    ) -> AgoraResult<Option<Template>>;
    async fn list_templates(&self, query: ApiQuery) -> AgoraResult<Vec<Template>>;
    async fn upsert_template(&self, item: Template, search_terms: Vec<String>) -> AgoraResult<()>;
    async fn remove_template(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn count_templates(&self, query: ApiQuery) -> AgoraResult<u64>;
}

#[async_trait]
pub trait AuthUsersApi {
    async fn get_auth_user(
        &self,
        id_or_handle: &str,
        expand: Expand,
    ) -> AgoraResult<Option<AuthUser>>;
    async fn get_auth_user_by_email(&self, email: &str) -> AgoraResult<Option<AuthUser>>;
    async fn list_auth_users(&self, query: ApiQuery) -> AgoraResult<Vec<AuthUser>>;
    async fn upsert_auth_user(&self, item: AuthUser, search_terms: Vec<String>)
        -> AgoraResult<()>;
    async fn remove_auth_user(&self, id_or_handle: &str) -> AgoraResult<bool>;
    async fn remove_auth_user_by_email(&self, email: &str) -> AgoraResult<bool>;
    async fn count_auth_users(&self, query: ApiQuery) -> AgoraResult<u64>;
}
