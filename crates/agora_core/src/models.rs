use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ids::object_id;
use crate::time::now_iso;

/// Accepts `true`/`false`, 0/1 numerics, and "true"/"1" strings. Nested
/// projections built with SQL `json_object` render booleans as 0/1 on some
/// backends, so every stored boolean deserializes through this.
pub fn bool_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct AnyBool;

    impl serde::de::Visitor<'_> for AnyBool {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a boolean, a 0/1 number, or a boolean string")
        }

        fn visit_bool<E>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<bool, E> {
            Ok(value != 0)
        }

        fn visit_u64<E>(self, value: u64) -> Result<bool, E> {
            Ok(value != 0)
        }

        fn visit_f64<E>(self, value: f64) -> Result<bool, E> {
            Ok(value != 0.0)
        }

        fn visit_str<E>(self, value: &str) -> Result<bool, E>
        where
            E: serde::de::Error,
        {
            match value {
                "true" | "1" => Ok(true),
                "false" | "0" | "" => Ok(false),
                other => Err(E::custom(format!("invalid boolean: {other}"))),
            }
        }
    }

    deserializer.deserialize_any(AnyBool)
}

/// A document kept in one base table. Provides the identity plumbing shared by
/// every resource: prefixed id generation, handle fallback, and timestamps.
pub trait Document {
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;
    fn handle(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn set_handle(&mut self, handle: String);
    fn created_at(&self) -> &str;
    fn set_created_at(&mut self, at: String);
    fn set_updated_at(&mut self, at: String);

    /// Fill missing `id` (generated) and `handle` (defaults to the id) so that
    /// every persisted row is addressable both ways.
    fn ensure_identity(&mut self) {
        if self.id().is_empty() {
            self.set_id(object_id(Self::ID_PREFIX));
        }
        if self.handle().is_empty() {
            let id = self.id().to_string();
            self.set_handle(id);
        }
    }

    /// Stamp `updated_at` with the current instant, and `created_at` too when
    /// the document has never been written.
    fn apply_dates(&mut self) {
        let now = now_iso();
        if self.created_at().is_empty() {
            self.set_created_at(now.clone());
        }
        self.set_updated_at(now);
    }
}

macro_rules! impl_document {
    ($ty:ty, $prefix:literal) => {
        impl Document for $ty {
            const ID_PREFIX: &'static str = $prefix;

            fn id(&self) -> &str {
                &self.id
            }

            fn handle(&self) -> &str {
                &self.handle
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn set_handle(&mut self, handle: String) {
                self.handle = handle;
            }

            fn created_at(&self) -> &str {
                &self.created_at
            }

            fn set_created_at(&mut self, at: String) {
                self.created_at = at;
            }

            fn set_updated_at(&mut self, at: String) {
                self.updated_at = at;
            }
        }
    };
}

/// Minimal pointer to a related entity, as carried inside other documents and
/// discount filters. Either field may be empty but not both.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRef {
    pub id: String,
    pub handle: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            handle: handle.into(),
        }
    }

    pub fn of<T: Document>(doc: &T) -> Self {
        Self::new(doc.id(), doc.handle())
    }

    /// True when `other` names the same entity by id or by handle.
    pub fn points_at(&self, id: &str, handle: &str) -> bool {
        (!self.id.is_empty() && self.id == id)
            || (!self.handle.is_empty() && self.handle == handle)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub compare_at_price: Option<f64>,
    pub qty: i64,
    pub video: Option<String>,
    /// For variants: which attribute choices this variant represents.
    pub variant_hint: Value,
    pub parent_handle: Option<String>,
    pub parent_id: Option<String>,
    pub tags: Vec<String>,
    pub media: Vec<String>,
    pub collections: Vec<Collection>,
    pub discounts: Vec<Discount>,
    pub variants: Vec<Product>,
}

impl_document!(Product, "prod");

impl Product {
    /// True when this product is a variant row attached to a parent.
    pub fn is_variant(&self) -> bool {
        self.parent_id.as_deref().is_some_and(|id| !id.is_empty())
            || self.parent_handle.as_deref().is_some_and(|h| !h.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collection {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub title: String,
    pub description: String,
    /// Link to the collection's exported snapshot, when one was published.
    pub published: Option<String>,
    pub tags: Vec<String>,
    pub media: Vec<String>,
}

impl_document!(Collection, "col");

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountApplication {
    #[default]
    Auto,
    Manual,
}

impl DiscountApplication {
    pub fn as_i16(self) -> i16 {
        match self {
            DiscountApplication::Auto => 0,
            DiscountApplication::Manual => 1,
        }
    }

    pub fn from_i16(value: i16) -> Self {
        if value == 0 {
            DiscountApplication::Auto
        } else {
            DiscountApplication::Manual
        }
    }
}

// Stored as its numeric code, serialized as "auto"/"manual"; rows and nested
// projections surface either shape.
impl<'de> Deserialize<'de> for DiscountApplication {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AnyApplication;

        impl serde::de::Visitor<'_> for AnyApplication {
            type Value = DiscountApplication;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("\"auto\", \"manual\", or their numeric codes")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                match value {
                    "auto" => Ok(DiscountApplication::Auto),
                    "manual" => Ok(DiscountApplication::Manual),
                    other => Err(E::custom(format!("invalid application: {other}"))),
                }
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(DiscountApplication::from_i16(value as i16))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(DiscountApplication::from_i16(value as i16))
            }
        }

        deserializer.deserialize_any(AnyApplication)
    }
}

/// One eligibility predicate of a discount. `p-*` filters constrain products,
/// `o-*` filters constrain orders at checkout; only the product side is
/// evaluated by this layer (order filters are stored and passed through).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value")]
pub enum DiscountFilter {
    #[serde(rename = "p-in-collections")]
    ProductInCollections(Vec<EntityRef>),
    #[serde(rename = "p-not-in-collections")]
    ProductNotInCollections(Vec<EntityRef>),
    #[serde(rename = "p-in-tags")]
    ProductInTags(Vec<String>),
    #[serde(rename = "p-not-in-tags")]
    ProductNotInTags(Vec<String>),
    #[serde(rename = "p-in-products")]
    ProductInProducts(Vec<EntityRef>),
    #[serde(rename = "p-not-in-products")]
    ProductNotInProducts(Vec<EntityRef>),
    #[serde(rename = "p-in-price-range")]
    ProductInPriceRange {
        #[serde(default)]
        from: Option<f64>,
        #[serde(default)]
        to: Option<f64>,
    },
    #[serde(rename = "p-all")]
    ProductAll,
    #[serde(rename = "o-subtotal-in-range")]
    OrderSubtotalInRange {
        #[serde(default)]
        from: Option<f64>,
        #[serde(default)]
        to: Option<f64>,
    },
    #[serde(rename = "o-items-count-in-range")]
    OrderItemsCountInRange {
        #[serde(default)]
        from: Option<i64>,
        #[serde(default)]
        to: Option<i64>,
    },
    #[serde(rename = "o-date-in-range")]
    OrderDateInRange {
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        to: Option<String>,
    },
    #[serde(rename = "o-has-customer")]
    OrderHasCustomer(Vec<EntityRef>),
}

impl DiscountFilter {
    pub fn is_product_filter(&self) -> bool {
        matches!(
            self,
            DiscountFilter::ProductInCollections(_)
                | DiscountFilter::ProductNotInCollections(_)
                | DiscountFilter::ProductInTags(_)
                | DiscountFilter::ProductNotInTags(_)
                | DiscountFilter::ProductInProducts(_)
                | DiscountFilter::ProductNotInProducts(_)
                | DiscountFilter::ProductInPriceRange { .. }
                | DiscountFilter::ProductAll
        )
    }

    /// Product-side evaluation. Order-side filters never match a product.
    pub fn matches_product(&self, product: &Product) -> bool {
        match self {
            DiscountFilter::ProductAll => true,
            DiscountFilter::ProductInCollections(refs) => product
                .collections
                .iter()
                .any(|c| refs.iter().any(|r| r.points_at(&c.id, &c.handle))),
            DiscountFilter::ProductNotInCollections(refs) => !product
                .collections
                .iter()
                .any(|c| refs.iter().any(|r| r.points_at(&c.id, &c.handle))),
            DiscountFilter::ProductInTags(tags) => {
                product.tags.iter().any(|t| tags.contains(t))
            }
            DiscountFilter::ProductNotInTags(tags) => {
                !product.tags.iter().any(|t| tags.contains(t))
            }
            DiscountFilter::ProductInProducts(refs) => refs
                .iter()
                .any(|r| r.points_at(&product.id, &product.handle)),
            DiscountFilter::ProductNotInProducts(refs) => !refs
                .iter()
                .any(|r| r.points_at(&product.id, &product.handle)),
            DiscountFilter::ProductInPriceRange { from, to } => {
                from.map_or(true, |f| product.price >= f)
                    && to.map_or(true, |t| product.price <= t)
            }
            _ => false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountInfo {
    pub filters: Vec<DiscountFilter>,
    /// Gateway-facing details (percentage, fixed amount, bundle rules). Opaque
    /// to the persistence layer.
    pub details: Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Discount {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub title: String,
    pub description: String,
    pub published: Option<String>,
    /// Lower runs first when stacking discounts at checkout.
    pub priority: i64,
    pub application: DiscountApplication,
    pub info: DiscountInfo,
    pub tags: Vec<String>,
    pub media: Vec<String>,
}

impl_document!(Discount, "dis");

impl Discount {
    /// A product qualifies when the discount is live, automatic, and every
    /// product-side filter passes. A discount with no product-side filter at
    /// all matches nothing.
    pub fn applies_to(&self, product: &Product) -> bool {
        if !self.active || self.application != DiscountApplication::Auto {
            return false;
        }
        let mut product_filters = self
            .info
            .filters
            .iter()
            .filter(|f| f.is_product_filter())
            .peekable();
        if product_filters.peek().is_none() {
            return false;
        }
        product_filters.all(|f| f.matches_product(product))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusEntry {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderStatus {
    pub checkout: StatusEntry,
    pub payment: StatusEntry,
    pub fulfillment: StatusEntry,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderContact {
    pub email: String,
    pub phone_number: String,
    pub customer_id: String,
    pub firstname: String,
    pub lastname: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderPricing {
    pub subtotal: f64,
    pub total: f64,
    pub quantity_total: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub id: String,
    pub qty: i64,
    pub price: Option<f64>,
    /// Product snapshot frozen at checkout time.
    pub data: Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub contact: OrderContact,
    pub status: OrderStatus,
    pub pricing: OrderPricing,
    pub line_items: Vec<LineItem>,
    pub delivery: Value,
    pub payment_gateway: Value,
    pub notes: String,
}

impl_document!(Order, "order");

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Storefront {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub title: String,
    pub description: String,
    pub video: Option<String>,
    pub published: Option<String>,
    pub tags: Vec<String>,
    pub media: Vec<String>,
    pub collections: Vec<Collection>,
    pub products: Vec<Product>,
    pub discounts: Vec<Discount>,
    pub posts: Vec<Post>,
    pub shipping_methods: Vec<ShippingMethod>,
}

impl_document!(Storefront, "sf");

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub email: String,
    /// Id of the auth_users row this customer signs in through.
    pub auth_id: String,
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
    pub picture: Option<String>,
    pub tags: Vec<String>,
}

impl_document!(Customer, "cus");

/// A reusable tag definition: a name (`handle`) and its allowed values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub values: Vec<String>,
}

impl_document!(Tag, "tag");

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub name: String,
    pub url: String,
}

impl_document!(Image, "img");

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub message: String,
    pub author: String,
    pub actions: Value,
}

impl_document!(Notification, "not");

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub media: Vec<String>,
}

impl_document!(Post, "post");

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingMethod {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub title: String,
    pub price: f64,
    pub tags: Vec<String>,
    pub media: Vec<String>,
}

impl_document!(ShippingMethod, "ship");

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub title: String,
    pub template_html: String,
    pub template_text: String,
    pub reference_example_input: Value,
}

impl_document!(Template, "template");

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthUser {
    pub id: String,
    pub handle: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub active: bool,
    pub attributes: Value,
    pub email: String,
    /// Password hash, opaque to this layer.
    pub password: String,
    #[serde(deserialize_with = "bool_from_any")]
    pub confirmed_mail: bool,
    pub roles: Vec<String>,
}

impl_document!(AuthUser, "au");

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with(tags: &[&str], price: f64) -> Product {
        Product {
            id: "prod_a".into(),
            handle: "p-a".into(),
            active: true,
            price,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn auto_discount(filters: Vec<DiscountFilter>) -> Discount {
        Discount {
            id: "dis_a".into(),
            handle: "d-a".into(),
            active: true,
            application: DiscountApplication::Auto,
            info: DiscountInfo {
                filters,
                details: Value::Null,
            },
            ..Default::default()
        }
    }

    #[test]
    fn identity_defaults_are_filled() {
        let mut p = Product::default();
        p.ensure_identity();
        assert!(p.id.starts_with("prod_"));
        assert_eq!(p.handle, p.id);
        p.apply_dates();
        assert!(!p.created_at.is_empty());
        assert_eq!(p.created_at, p.updated_at);
    }

    #[test]
    fn ensure_identity_keeps_explicit_values() {
        let mut p = Product {
            id: "prod_x".into(),
            handle: "my-shirt".into(),
            ..Default::default()
        };
        p.ensure_identity();
        assert_eq!(p.id, "prod_x");
        assert_eq!(p.handle, "my-shirt");
    }

    #[test]
    fn discount_filter_serde_uses_op_names() {
        let filter = DiscountFilter::ProductInTags(vec!["summer".into()]);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["op"], "p-in-tags");
        let all = serde_json::to_value(DiscountFilter::ProductAll).unwrap();
        assert_eq!(all["op"], "p-all");
        let back: DiscountFilter =
            serde_json::from_value(serde_json::json!({"op": "p-all"})).unwrap();
        assert_eq!(back, DiscountFilter::ProductAll);
    }

    #[test]
    fn tag_filters_match_products() {
        let d = auto_discount(vec![DiscountFilter::ProductInTags(vec!["sale".into()])]);
        assert!(d.applies_to(&product_with(&["sale", "new"], 10.0)));
        assert!(!d.applies_to(&product_with(&["new"], 10.0)));

        let not = auto_discount(vec![DiscountFilter::ProductNotInTags(vec!["sale".into()])]);
        assert!(not.applies_to(&product_with(&["new"], 10.0)));
        assert!(!not.applies_to(&product_with(&["sale"], 10.0)));
    }

    #[test]
    fn price_range_bounds_are_inclusive() {
        let d = auto_discount(vec![DiscountFilter::ProductInPriceRange {
            from: Some(10.0),
            to: Some(20.0),
        }]);
        assert!(d.applies_to(&product_with(&[], 10.0)));
        assert!(d.applies_to(&product_with(&[], 20.0)));
        assert!(!d.applies_to(&product_with(&[], 9.99)));
        assert!(!d.applies_to(&product_with(&[], 20.01)));
    }

    #[test]
    fn collection_filters_match_by_id_or_handle() {
        let mut p = product_with(&[], 10.0);
        p.collections = vec![Collection {
            id: "col_9".into(),
            handle: "shoes".into(),
            ..Default::default()
        }];
        let by_id = auto_discount(vec![DiscountFilter::ProductInCollections(vec![
            EntityRef::new("col_9", ""),
        ])]);
        let by_handle = auto_discount(vec![DiscountFilter::ProductInCollections(vec![
            EntityRef::new("", "shoes"),
        ])]);
        assert!(by_id.applies_to(&p));
        assert!(by_handle.applies_to(&p));
    }

    #[test]
    fn inactive_manual_or_empty_discounts_never_apply() {
        let p = product_with(&["sale"], 10.0);

        let mut d = auto_discount(vec![DiscountFilter::ProductAll]);
        d.active = false;
        assert!(!d.applies_to(&p));

        let mut manual = auto_discount(vec![DiscountFilter::ProductAll]);
        manual.application = DiscountApplication::Manual;
        assert!(!manual.applies_to(&p));

        let empty = auto_discount(vec![]);
        assert!(!empty.applies_to(&p));

        let order_only = auto_discount(vec![DiscountFilter::OrderHasCustomer(vec![])]);
        assert!(!order_only.applies_to(&p));
    }

    #[test]
    fn every_product_filter_must_pass() {
        let d = auto_discount(vec![
            DiscountFilter::ProductInTags(vec!["sale".into()]),
            DiscountFilter::ProductInPriceRange {
                from: None,
                to: Some(50.0),
            },
        ]);
        assert!(d.applies_to(&product_with(&["sale"], 30.0)));
        assert!(!d.applies_to(&product_with(&["sale"], 60.0)));
    }

    #[test]
    fn booleans_deserialize_from_sql_json_shapes() {
        let p: Product = serde_json::from_value(serde_json::json!({
            "id": "prod_a", "handle": "a", "active": 1
        }))
        .unwrap();
        assert!(p.active);
        let p: Product = serde_json::from_value(serde_json::json!({
            "id": "prod_a", "handle": "a", "active": false
        }))
        .unwrap();
        assert!(!p.active);
    }

    #[test]
    fn application_maps_to_storage_and_back() {
        assert_eq!(DiscountApplication::Auto.as_i16(), 0);
        assert_eq!(DiscountApplication::from_i16(1), DiscountApplication::Manual);
        assert_eq!(
            serde_json::to_value(DiscountApplication::Auto).unwrap(),
            serde_json::json!("auto")
        );
        let from_code: DiscountApplication = serde_json::from_value(serde_json::json!(1)).unwrap();
        assert_eq!(from_code, DiscountApplication::Manual);
        let from_name: DiscountApplication =
            serde_json::from_value(serde_json::json!("manual")).unwrap();
        assert_eq!(from_name, DiscountApplication::Manual);
    }
}
