use agora_store::{
    AgoraConfig, AgoraResult, AgoraStore, Collection, CollectionsApi, Expand, JunctionKind,
    Product, ProductsApi,
};
use serde_json::json;
use tempfile::tempdir;

fn tee() -> Product {
    Product {
        id: "prod_p".into(),
        handle: "tee".into(),
        active: true,
        title: "Folk Tee".into(),
        price: 25.0,
        ..Default::default()
    }
}

fn variant_of_tee(id: &str, handle: &str, color: &str) -> Product {
    Product {
        id: id.into(),
        handle: handle.into(),
        active: true,
        title: "Folk Tee".into(),
        price: 25.0,
        parent_id: Some("prod_p".into()),
        variant_hint: json!({ "color": color }),
        ..Default::default()
    }
}

#[tokio::test]
async fn removing_a_collection_detaches_its_products() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = AgoraConfig::default_sqlite(base.join("detach.sqlite").to_string_lossy());
    let store = AgoraStore::connect(&config, base).await?;

    store
        .upsert_collection(
            Collection {
                id: "col_9".into(),
                handle: "summer-line".into(),
                active: true,
                title: "Summer Line".into(),
                ..Default::default()
            },
            Vec::new(),
        )
        .await?;
    for (id, handle) in [("prod_1", "p-one"), ("prod_2", "p-two"), ("prod_3", "p-three")] {
        store
            .upsert_product(
                Product {
                    id: id.into(),
                    handle: handle.into(),
                    active: true,
                    collections: vec![Collection {
                        id: "col_9".into(),
                        handle: "summer-line".into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                Vec::new(),
            )
            .await?;
    }
    assert_eq!(store.count_collection_products("col_9").await?, 3);

    assert!(store.remove_collection("summer-line").await?);
    assert_eq!(store.count_collection_products("col_9").await?, 0);
    for id in ["prod_1", "prod_2", "prod_3"] {
        assert_eq!(
            store
                .count_junction_rows(JunctionKind::ProductsToCollections, id)
                .await?,
            0
        );
        let product = store.get_product(id, Expand::All).await?.expect("product");
        assert!(product.collections.is_empty());
    }
    Ok(())
}

#[tokio::test]
async fn variant_registrations_follow_the_parent() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = AgoraConfig::default_sqlite(base.join("variants.sqlite").to_string_lossy());
    let store = AgoraStore::connect(&config, base).await?;

    store.upsert_product(tee(), Vec::new()).await?;
    store
        .upsert_product(variant_of_tee("prod_v1", "tee-red", "red"), Vec::new())
        .await?;

    let parent = store.get_product("prod_p", Expand::All).await?.expect("parent");
    assert_eq!(parent.variants.len(), 1);
    assert_eq!(parent.variants[0].id, "prod_v1");
    assert_eq!(parent.variants[0].variant_hint, json!({ "color": "red" }));
    assert!(parent.variants[0].is_variant());

    // The variant row is addressable like any product.
    let red = store.get_product("tee-red", Expand::none()).await?.expect("variant");
    assert_eq!(red.parent_id.as_deref(), Some("prod_p"));

    // Rewriting a variant replaces its registration instead of stacking one.
    store
        .upsert_product(variant_of_tee("prod_v1", "tee-red", "crimson"), Vec::new())
        .await?;
    assert_eq!(
        store
            .count_junction_rows(JunctionKind::ProductsToVariants, "prod_p")
            .await?,
        1
    );

    store
        .upsert_product(variant_of_tee("prod_v2", "tee-blue", "blue"), Vec::new())
        .await?;
    let parent = store.get_product("prod_p", Expand::All).await?.expect("parent");
    assert_eq!(parent.variants.len(), 2);

    assert!(store.remove_product("prod_v2").await?);
    let parent = store.get_product("prod_p", Expand::All).await?.expect("parent");
    assert_eq!(parent.variants.len(), 1);

    // A variant may name its parent by handle alone.
    store
        .upsert_product(
            Product {
                parent_id: None,
                parent_handle: Some("tee".into()),
                ..variant_of_tee("prod_v3", "tee-green", "green")
            },
            Vec::new(),
        )
        .await?;
    let parent = store.get_product("prod_p", Expand::All).await?.expect("parent");
    let variant_ids: Vec<&str> = parent.variants.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(variant_ids, vec!["prod_v1", "prod_v3"]);
    assert_eq!(
        store
            .count_junction_rows(JunctionKind::ProductsToVariants, "tee")
            .await?,
        1
    );

    // Rewriting the parent leaves the registrations alone.
    let mut renamed = tee();
    renamed.title = "Festival Tee".into();
    store.upsert_product(renamed, Vec::new()).await?;
    let parent = store.get_product("prod_p", Expand::All).await?.expect("parent");
    assert_eq!(parent.variants.len(), 2);

    // Removing the parent takes the whole tree with it, handle-registered
    // variants included.
    assert!(store.remove_product("tee").await?);
    for needle in ["prod_p", "prod_v1", "prod_v3", "tee-red", "tee-green"] {
        assert!(store.get_product(needle, Expand::none()).await?.is_none());
    }
    for needle in ["prod_p", "tee"] {
        assert_eq!(
            store
                .count_junction_rows(JunctionKind::ProductsToVariants, needle)
                .await?,
            0
        );
    }
    assert_eq!(
        store
            .count_junction_rows(JunctionKind::SearchTerms, "prod_v1")
            .await?,
        0
    );
    Ok(())
}

#[tokio::test]
async fn promoting_a_variant_clears_its_registration() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = AgoraConfig::default_sqlite(base.join("promote.sqlite").to_string_lossy());
    let store = AgoraStore::connect(&config, base).await?;

    store.upsert_product(tee(), Vec::new()).await?;
    store
        .upsert_product(variant_of_tee("prod_v1", "tee-red", "red"), Vec::new())
        .await?;
    assert_eq!(
        store
            .count_junction_rows(JunctionKind::ProductsToVariants, "prod_p")
            .await?,
        1
    );

    let standalone = Product {
        parent_id: None,
        ..variant_of_tee("prod_v1", "tee-red", "red")
    };
    store.upsert_product(standalone, Vec::new()).await?;
    assert_eq!(
        store
            .count_junction_rows(JunctionKind::ProductsToVariants, "prod_p")
            .await?,
        0
    );
    let parent = store.get_product("prod_p", Expand::All).await?.expect("parent");
    assert!(parent.variants.is_empty());
    Ok(())
}
