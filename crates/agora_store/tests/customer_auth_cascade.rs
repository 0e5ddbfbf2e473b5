use agora_store::{
    AgoraConfig, AgoraResult, AgoraStore, AuthUser, AuthUsersApi, Customer, CustomersApi, Expand,
    JunctionKind,
};
use tempfile::tempdir;

fn ada_auth() -> AuthUser {
    AuthUser {
        id: "au_1".into(),
        handle: "ada".into(),
        active: true,
        email: "ada@example.com".into(),
        password: "$argon2id$stored-hash".into(),
        confirmed_mail: true,
        roles: vec!["admin".into()],
        ..Default::default()
    }
}

fn ada_customer() -> Customer {
    Customer {
        id: "cus_1".into(),
        handle: "ada-lovelace".into(),
        active: true,
        email: "ada@example.com".into(),
        auth_id: "au_1".into(),
        firstname: "Ada".into(),
        lastname: "Lovelace".into(),
        tags: vec!["vip".into()],
        ..Default::default()
    }
}

#[tokio::test]
async fn auth_users_resolve_by_email() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = AgoraConfig::default_sqlite(base.join("auth.sqlite").to_string_lossy());
    let store = AgoraStore::connect(&config, base).await?;

    store.upsert_auth_user(ada_auth(), Vec::new()).await?;

    let by_handle = store.get_auth_user("ada", Expand::none()).await?.expect("by handle");
    assert_eq!(by_handle.id, "au_1");

    let by_email = store
        .get_auth_user_by_email("ada@example.com")
        .await?
        .expect("by email");
    assert_eq!(by_email.id, "au_1");
    assert_eq!(by_email.password, "$argon2id$stored-hash");
    assert!(by_email.confirmed_mail);
    assert_eq!(by_email.roles, vec!["admin"]);

    assert!(store.get_auth_user_by_email("missing@example.com").await?.is_none());

    assert!(store.remove_auth_user_by_email("ada@example.com").await?);
    assert!(!store.remove_auth_user_by_email("ada@example.com").await?);
    assert!(store.get_auth_user("au_1", Expand::none()).await?.is_none());
    assert_eq!(
        store
            .count_junction_rows(JunctionKind::SearchTerms, "au_1")
            .await?,
        0
    );
    Ok(())
}

#[tokio::test]
async fn removing_a_customer_cascades_into_auth() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = AgoraConfig::default_sqlite(base.join("cascade.sqlite").to_string_lossy());
    let store = AgoraStore::connect(&config, base).await?;

    store.upsert_auth_user(ada_auth(), Vec::new()).await?;
    store.upsert_customer(ada_customer(), Vec::new()).await?;

    let customer = store
        .get_customer("ada-lovelace", Expand::All)
        .await?
        .expect("customer");
    assert_eq!(customer.tags, vec!["vip"]);
    assert_eq!(customer.auth_id, "au_1");

    assert!(store.remove_customer("cus_1").await?);
    assert!(store.get_customer("cus_1", Expand::none()).await?.is_none());
    assert!(store.get_auth_user_by_email("ada@example.com").await?.is_none());
    assert!(store.get_auth_user("au_1", Expand::none()).await?.is_none());
    assert_eq!(
        store
            .count_junction_rows(JunctionKind::SearchTerms, "au_1")
            .await?,
        0
    );
    assert_eq!(store.count_junction_rows(JunctionKind::Tags, "cus_1").await?, 0);

    assert!(!store.remove_customer("cus_1").await?);
    Ok(())
}

#[tokio::test]
async fn customer_removal_without_an_auth_row_still_succeeds() -> AgoraResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = AgoraConfig::default_sqlite(base.join("noauth.sqlite").to_string_lossy());
    let store = AgoraStore::connect(&config, base).await?;

    store
        .upsert_customer(
            Customer {
                id: "cus_2".into(),
                handle: "nobody".into(),
                email: "nobody@example.com".into(),
                ..ada_customer()
            },
            Vec::new(),
        )
        .await?;
    assert!(store.remove_customer("nobody").await?);
    assert!(store.get_customer("cus_2", Expand::none()).await?.is_none());
    Ok(())
}
