use agora_store::{
    AgoraConfig, AgoraResult, AgoraStore, ApiQuery, Collection, CollectionsApi, Discount,
    DiscountApplication, DiscountFilter, DiscountInfo, DiscountsApi, EntityRef, Expand, Product,
    ProductsApi,
};
use serde_json::json;
use tempfile::tempdir;

fn auto_discount(id: &str, handle: &str, filters: Vec<DiscountFilter>) -> Discount {
    Discount {
        id: id.into(),
        handle: handle.into(),
        active: true,
        title: "Ten Percent".into(),
        application: DiscountApplication::Auto,
        info: DiscountInfo {
            filters,
            details: json!({ "percent": 10 }),
        },
        ..Default::default()
    }
}

fn tagged(id: &str, handle: &str, tags: &[&str], price: f64) -> Product {
    Product {
        id: id.into(),
        handle: handle.into(),
        active: true,
        price,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn product_upserts_pick_up_live_discounts() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = AgoraConfig::default_sqlite(base.join("eligibility.sqlite").to_string_lossy());
    let store = AgoraStore::connect(&config, base).await?;

    store
        .upsert_discount(
            auto_discount(
                "dis_10",
                "ten-off",
                vec![DiscountFilter::ProductInTags(vec!["summer".into()])],
            ),
            Vec::new(),
        )
        .await?;
    store
        .upsert_product(tagged("prod_1", "boots", &["summer"], 80.0), Vec::new())
        .await?;
    store
        .upsert_product(tagged("prod_2", "plain", &["winter"], 80.0), Vec::new())
        .await?;

    let boots = store.get_product("prod_1", Expand::All).await?.expect("boots");
    assert_eq!(boots.discounts.len(), 1);
    assert_eq!(boots.discounts[0].id, "dis_10");
    assert_eq!(boots.discounts[0].application, DiscountApplication::Auto);
    assert_eq!(boots.discounts[0].info.details, json!({ "percent": 10 }));

    let plain = store.get_product("prod_2", Expand::All).await?.expect("plain");
    assert!(plain.discounts.is_empty());

    assert_eq!(store.count_discount_products("ten-off").await?, 1);
    let members = store
        .list_discount_products("dis_10", ApiQuery::default())
        .await?;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, "prod_1");
    Ok(())
}

#[tokio::test]
async fn discount_rewrites_rebuild_membership_set_wide() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = AgoraConfig::default_sqlite(base.join("rebuild.sqlite").to_string_lossy());
    let store = AgoraStore::connect(&config, base).await?;

    store
        .upsert_product(tagged("prod_1", "p-one", &[], 80.0), Vec::new())
        .await?;
    store
        .upsert_product(tagged("prod_2", "p-two", &[], 20.0), Vec::new())
        .await?;
    store
        .upsert_product(tagged("prod_3", "p-three", &[], 50.0), Vec::new())
        .await?;

    // The lower bound is inclusive, so the 50.0 product is in.
    let discount = auto_discount(
        "dis_50",
        "over-fifty",
        vec![DiscountFilter::ProductInPriceRange {
            from: Some(50.0),
            to: None,
        }],
    );
    store.upsert_discount(discount.clone(), Vec::new()).await?;
    assert_eq!(store.count_discount_products("dis_50").await?, 2);
    let mut member_ids: Vec<String> = store
        .list_discount_products("over-fifty", ApiQuery::default())
        .await?
        .iter()
        .map(|p| p.id.clone())
        .collect();
    member_ids.sort();
    assert_eq!(member_ids, ["prod_1", "prod_3"]);

    let mut paused = discount.clone();
    paused.active = false;
    store.upsert_discount(paused, Vec::new()).await?;
    assert_eq!(store.count_discount_products("dis_50").await?, 0);

    store.upsert_discount(discount, Vec::new()).await?;
    assert_eq!(store.count_discount_products("dis_50").await?, 2);
    Ok(())
}

#[tokio::test]
async fn manual_and_order_scoped_discounts_never_link() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = AgoraConfig::default_sqlite(base.join("manual.sqlite").to_string_lossy());
    let store = AgoraStore::connect(&config, base).await?;

    store
        .upsert_product(tagged("prod_1", "p-one", &["summer"], 10.0), Vec::new())
        .await?;

    let mut manual = auto_discount("dis_m", "manual-code", vec![DiscountFilter::ProductAll]);
    manual.application = DiscountApplication::Manual;
    store.upsert_discount(manual, Vec::new()).await?;
    assert_eq!(store.count_discount_products("dis_m").await?, 0);

    store
        .upsert_discount(
            auto_discount(
                "dis_o",
                "order-only",
                vec![DiscountFilter::OrderSubtotalInRange {
                    from: Some(10.0),
                    to: None,
                }],
            ),
            Vec::new(),
        )
        .await?;
    assert_eq!(store.count_discount_products("dis_o").await?, 0);

    // The product side applies the same rules on its own upserts.
    store
        .upsert_product(tagged("prod_2", "p-two", &["summer"], 10.0), Vec::new())
        .await?;
    let product = store.get_product("prod_2", Expand::All).await?.expect("product");
    assert!(product.discounts.is_empty());
    Ok(())
}

#[tokio::test]
async fn collection_filters_link_from_both_sides() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = AgoraConfig::default_sqlite(base.join("collections.sqlite").to_string_lossy());
    let store = AgoraStore::connect(&config, base).await?;

    store
        .upsert_collection(
            Collection {
                id: "col_f".into(),
                handle: "featured".into(),
                active: true,
                title: "Featured".into(),
                ..Default::default()
            },
            Vec::new(),
        )
        .await?;
    let discount = auto_discount(
        "dis_f",
        "featured-deal",
        vec![DiscountFilter::ProductInCollections(vec![EntityRef::new(
            "col_f", "",
        )])],
    );
    store.upsert_discount(discount.clone(), Vec::new()).await?;

    // Product side: membership embedded in the upsert payload.
    store
        .upsert_product(
            Product {
                collections: vec![Collection {
                    id: "col_f".into(),
                    handle: "featured".into(),
                    ..Default::default()
                }],
                ..tagged("prod_1", "p-one", &[], 10.0)
            },
            Vec::new(),
        )
        .await?;
    let linked = store.get_product("prod_1", Expand::All).await?.expect("product");
    assert_eq!(linked.discounts.len(), 1);
    assert_eq!(linked.discounts[0].id, "dis_f");

    // Discount side: a later attach is only seen once the discount rewrites.
    store
        .upsert_product(tagged("prod_2", "p-two", &[], 10.0), Vec::new())
        .await?;
    store.add_product_to_collection("prod_2", "featured").await?;
    let attached = store.get_product("prod_2", Expand::All).await?.expect("product");
    assert!(attached.discounts.is_empty());

    store.upsert_discount(discount, Vec::new()).await?;
    assert_eq!(store.count_discount_products("dis_f").await?, 2);
    let attached = store.get_product("prod_2", Expand::All).await?.expect("product");
    assert_eq!(attached.discounts.len(), 1);
    Ok(())
}
