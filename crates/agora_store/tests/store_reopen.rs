use agora_store::{
    AgoraResult, ApiQuery, Expand, Notification, NotificationsApi, Product, ProductsApi,
    default_sqlite_path, open_store,
};
use tempfile::tempdir;

#[tokio::test]
async fn reopen_reuses_config_and_keeps_rows() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();

    let store = open_store(base).await?;
    assert!(base.join("agora.json").exists());
    assert!(default_sqlite_path(base).exists());
    store
        .upsert_product(
            Product {
                id: "prod_1".into(),
                handle: "boots".into(),
                active: true,
                title: "Winter Boots".into(),
                price: 99.9,
                ..Default::default()
            },
            Vec::new(),
        )
        .await?;
    drop(store);

    // The second open re-runs migrations against the populated file.
    let store = open_store(base).await?;
    let kept = store.get_product("boots", Expand::none()).await?.expect("kept row");
    assert_eq!(kept.id, "prod_1");
    assert_eq!(store.count_products(ApiQuery::default()).await?, 1);
    Ok(())
}

#[tokio::test]
async fn default_query_pages_at_the_configured_size() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let store = open_store(base).await?;

    let query = store.default_query();
    assert_eq!(query.limit, Some(10));
    assert_eq!(query.effective_sort(), vec!["updated_at", "id"]);

    let items: Vec<Notification> = (0..12)
        .map(|i| Notification {
            id: format!("not_{i:02}"),
            handle: format!("evt-{i:02}"),
            active: true,
            message: "inventory low".into(),
            author: "system".into(),
            ..Default::default()
        })
        .collect();
    store.upsert_notifications(items).await?;

    let page = store.list_notifications(store.default_query()).await?;
    assert_eq!(page.len(), 10);
    assert_eq!(store.count_notifications(store.default_query()).await?, 12);
    Ok(())
}
