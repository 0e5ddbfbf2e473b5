//! Storefronts: one junction table carries all five curated relation lists,
//! told apart by the `context` column, so a rewrite clears every list at once
//! and reinserts each under its own context.

use async_trait::async_trait;
use sea_orm::sea_query::{Condition, Expr, ExprTrait, Order, SelectStatement};

use agora_core::{AgoraResult, ApiQuery, Document, Expand, Post, Storefront, StorefrontsApi};

use crate::db::{JunctionKind, Posts, Storefronts};
use crate::junction::{self, RelationWrite};
use crate::projection::AggStrategy;
use crate::resources::posts::post_select;
use crate::resources::{
    self, DocumentWrite, POST_COLUMNS, RELATED_COLLECTIONS, RELATED_DISCOUNTS, RELATED_POSTS,
    RELATED_PRODUCTS, RELATED_SHIPPING, RemovePlan, STOREFRONT_COLUMNS, base_search_terms,
    base_select, count_rows, doc_map, get_doc, list_docs, push_objects, push_scalar,
    read_docs, relation_pairs,
};
use crate::store::AgoraStore;

const CONTEXT: &str = "storefronts";

fn storefront_select(
    strategy: AggStrategy,
    expand: &Expand,
) -> (SelectStatement, Vec<&'static str>) {
    let mut select = base_select(Storefronts::Table, STOREFRONT_COLUMNS);
    let mut nested = Vec::new();
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Tags,
        Storefronts::Table,
        CONTEXT,
        "tags",
    );
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Media,
        Storefronts::Table,
        CONTEXT,
        "media",
    );
    for (name, related) in [
        ("collections", &RELATED_COLLECTIONS),
        ("products", &RELATED_PRODUCTS),
        ("discounts", &RELATED_DISCOUNTS),
        ("posts", &RELATED_POSTS),
        ("shipping_methods", &RELATED_SHIPPING),
    ] {
        if expand.includes(name) {
            push_objects(
                &mut select,
                &mut nested,
                strategy,
                JunctionKind::StorefrontsToOther,
                Storefronts::Table,
                Some(name),
                related,
                name,
            );
        }
    }
    (select, nested)
}

fn storefront_search_terms(item: &Storefront, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    terms.push_words(&item.title);
    for tag in &item.tags {
        terms.push_tag(tag);
    }
    terms.extend_raw(extra);
    terms.into_vec()
}

#[async_trait]
impl StorefrontsApi for AgoraStore {
    async fn get_storefront(
        &self,
        id_or_handle: &str,
        expand: Expand,
    ) -> AgoraResult<Option<Storefront>> {
        let (select, nested) = storefront_select(AggStrategy::from_backend(self.backend), &expand);
        get_doc(
            &self.conn,
            select,
            Storefronts::Id,
            Storefronts::Handle,
            id_or_handle,
            STOREFRONT_COLUMNS,
            &nested,
        )
        .await
    }

    async fn list_storefronts(&self, query: ApiQuery) -> AgoraResult<Vec<Storefront>> {
        let expand = Expand::Only(query.expand.clone());
        let (select, nested) = storefront_select(AggStrategy::from_backend(self.backend), &expand);
        list_docs(
            &self.conn,
            select,
            Storefronts::Table,
            STOREFRONT_COLUMNS,
            &nested,
            &query,
        )
        .await
    }

    async fn upsert_storefront(
        &self,
        mut item: Storefront,
        search_terms: Vec<String>,
    ) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = storefront_search_terms(&item, &search_terms);
        let tx = self.begin().await?;
        resources::write_document_tx(
            &tx,
            &DocumentWrite {
                table: Storefronts::Table,
                id_col: Storefronts::Id,
                handle_col: Storefronts::Handle,
                columns: STOREFRONT_COLUMNS,
                context: CONTEXT,
                tags: &item.tags,
                media: &item.media,
                search: &search,
            },
            &doc,
        )
        .await?;
        junction::delete_by_owner(
            &tx,
            JunctionKind::StorefrontsToOther,
            &item.id,
            Some(&item.handle),
            None,
        )
        .await?;
        let collections = relation_pairs(&item.collections);
        let products = relation_pairs(&item.products);
        let discounts = relation_pairs(&item.discounts);
        let posts = relation_pairs(&item.posts);
        let shipping = relation_pairs(&item.shipping_methods);
        for (context, pairs) in [
            ("collections", &collections),
            ("products", &products),
            ("discounts", &discounts),
            ("posts", &posts),
            ("shipping_methods", &shipping),
        ] {
            junction::insert_relation_values(
                &tx,
                RelationWrite {
                    kind: JunctionKind::StorefrontsToOther,
                    pairs,
                    owner_id: &item.id,
                    owner_handle: &item.handle,
                    context: Some(context),
                },
            )
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn remove_storefront(&self, id_or_handle: &str) -> AgoraResult<bool> {
        resources::remove_document(
            self,
            RemovePlan {
                table: Storefronts::Table,
                id_col: Storefronts::Id,
                handle_col: Storefronts::Handle,
                context: CONTEXT,
                owned: &[JunctionKind::StorefrontsToOther],
                referenced: &[],
            },
            id_or_handle,
        )
        .await
    }

    async fn count_storefronts(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(
            &self.conn,
            Storefronts::Table,
            Storefronts::Id,
            STOREFRONT_COLUMNS,
            &query,
        )
        .await
    }

    async fn list_storefront_posts(&self, id_or_handle: &str) -> AgoraResult<Vec<Post>> {
        let (mut select, nested) = post_select(AggStrategy::from_backend(self.backend));
        let values =
            junction::select_values(JunctionKind::StorefrontsToOther, id_or_handle, Some("posts"));
        let reporters = junction::select_reporters(
            JunctionKind::StorefrontsToOther,
            id_or_handle,
            Some("posts"),
        );
        select.cond_where(
            Condition::any()
                .add(Expr::col((Posts::Table, Posts::Id)).in_subquery(values))
                .add(Expr::col((Posts::Table, Posts::Handle)).in_subquery(reporters)),
        );
        select.order_by((Posts::Table, Posts::UpdatedAt), Order::Desc);
        read_docs(&self.conn, &select, POST_COLUMNS, &nested, false).await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::sea_query::SqliteQueryBuilder;

    use super::*;

    #[test]
    fn expanded_lists_project_under_their_context() {
        let expand = Expand::Only(vec!["posts".into(), "products".into()]);
        let (select, nested) = storefront_select(AggStrategy::Sqlite, &expand);
        let sql = select.to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#"AS "posts""#));
        assert!(sql.contains(r#""context" = 'posts'"#));
        assert!(sql.contains(r#"AS "products""#));
        assert!(!sql.contains(r#"AS "shipping_methods""#));
        assert!(nested.contains(&"posts"));
        assert!(nested.contains(&"products"));
    }

    #[test]
    fn default_expand_projects_every_list() {
        let (_, nested) = storefront_select(AggStrategy::Sqlite, &Expand::All);
        assert_eq!(
            nested,
            vec![
                "tags",
                "media",
                "collections",
                "products",
                "discounts",
                "posts",
                "shipping_methods"
            ]
        );
    }
}
