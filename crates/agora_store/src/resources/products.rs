//! Products: the resource with the most relation machinery. Upserts evaluate
//! discount eligibility, rewrite collection membership, and register variant
//! rows under the parent; removal walks the variant tree depth-first.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use sea_orm::sea_query::{Expr, ExprTrait, Order, Query, SelectStatement};

use agora_core::{AgoraError, AgoraResult, ApiQuery, Document, Expand, Product, ProductsApi};

use crate::db::{Collections, Junction, JunctionKind, Products};
use crate::junction::{self, ArrayWrite, RelationPair, RelationWrite};
use crate::projection::AggStrategy;
use crate::resources::discounts::active_discounts;
use crate::resources::{
    self, DocumentWrite, PRODUCT_COLUMNS, RELATED_COLLECTIONS, RELATED_DISCOUNTS, RELATED_PRODUCTS,
    base_search_terms, base_select, count_rows, doc_map, get_doc, list_docs, push_objects,
    push_scalar, relation_pairs,
};
use crate::store::{AgoraStore, delete_base_row, fetch_identity, query_all, read_string};

const CONTEXT: &str = "products";

pub(crate) fn product_select(
    strategy: AggStrategy,
    expand: &Expand,
) -> (SelectStatement, Vec<&'static str>) {
    let mut select = base_select(Products::Table, PRODUCT_COLUMNS);
    let mut nested = Vec::new();
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Tags,
        Products::Table,
        CONTEXT,
        "tags",
    );
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Media,
        Products::Table,
        CONTEXT,
        "media",
    );
    if expand.includes("collections") {
        push_objects(
            &mut select,
            &mut nested,
            strategy,
            JunctionKind::ProductsToCollections,
            Products::Table,
            None,
            &RELATED_COLLECTIONS,
            "collections",
        );
    }
    if expand.includes("discounts") {
        push_objects(
            &mut select,
            &mut nested,
            strategy,
            JunctionKind::ProductsToDiscounts,
            Products::Table,
            None,
            &RELATED_DISCOUNTS,
            "discounts",
        );
    }
    if expand.includes("variants") {
        push_objects(
            &mut select,
            &mut nested,
            strategy,
            JunctionKind::ProductsToVariants,
            Products::Table,
            None,
            &RELATED_PRODUCTS,
            "variants",
        );
    }
    (select, nested)
}

fn product_search_terms(item: &Product, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    terms.push_words(&item.title);
    for tag in &item.tags {
        terms.push_tag(tag);
    }
    terms.extend_raw(extra);
    terms.into_vec()
}

/// Depth-first removal. Variants registered under this product go first, then
/// every junction row naming it from either side, then the base row.
fn remove_product_tree<C>(
    conn: &C,
    needle: String,
) -> Pin<Box<dyn Future<Output = AgoraResult<bool>> + Send + '_>>
where
    C: ConnectionTrait,
{
    Box::pin(async move {
        let Some((id, handle)) = fetch_identity(
            conn,
            Products::Table,
            Products::Id,
            Products::Handle,
            &needle,
        )
        .await?
        else {
            return Ok(false);
        };
        // Variants may be registered under the parent's id or its handle.
        let mut children: Vec<String> = Vec::new();
        for needle in [id.as_str(), handle.as_str()] {
            let rows = query_all(
                conn,
                &junction::select_values(JunctionKind::ProductsToVariants, needle, None),
            )
            .await?;
            for row in &rows {
                if let Some(child) = read_string(row, "value") {
                    if !child.is_empty() && !children.contains(&child) {
                        children.push(child);
                    }
                }
            }
        }
        for child in children {
            remove_product_tree(conn, child).await?;
        }
        resources::delete_common_relations(conn, &id, &handle, CONTEXT).await?;
        for kind in [
            JunctionKind::ProductsToCollections,
            JunctionKind::ProductsToDiscounts,
            JunctionKind::ProductsToVariants,
        ] {
            junction::delete_by_owner(conn, kind, &id, Some(&handle), None).await?;
        }
        junction::delete_by_value_or_reporter(
            conn,
            JunctionKind::ProductsToVariants,
            Some(&id),
            Some(&handle),
        )
        .await?;
        junction::delete_by_value_or_reporter(
            conn,
            JunctionKind::StorefrontsToOther,
            Some(&id),
            Some(&handle),
        )
        .await?;
        delete_base_row(
            conn,
            Products::Table,
            Products::Id,
            Products::Handle,
            &id,
            &handle,
        )
        .await?;
        Ok(true)
    })
}

#[async_trait]
impl ProductsApi for AgoraStore {
    async fn get_product(
        &self,
        id_or_handle: &str,
        expand: Expand,
    ) -> AgoraResult<Option<Product>> {
        let (select, nested) = product_select(AggStrategy::from_backend(self.backend), &expand);
        get_doc(
            &self.conn,
            select,
            Products::Id,
            Products::Handle,
            id_or_handle,
            PRODUCT_COLUMNS,
            &nested,
        )
        .await
    }

    async fn list_products(&self, query: ApiQuery) -> AgoraResult<Vec<Product>> {
        let expand = Expand::Only(query.expand.clone());
        let (select, nested) = product_select(AggStrategy::from_backend(self.backend), &expand);
        list_docs(
            &self.conn,
            select,
            Products::Table,
            PRODUCT_COLUMNS,
            &nested,
            &query,
        )
        .await
    }

    async fn upsert_product(&self, mut item: Product, search_terms: Vec<String>) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = product_search_terms(&item, &search_terms);
        let tx = self.begin().await?;
        // Eligibility is decided against the discounts stored right now, in
        // the same transaction that records the result.
        let eligible: Vec<RelationPair> = active_discounts(&tx)
            .await?
            .iter()
            .filter(|discount| discount.applies_to(&item))
            .map(|discount| RelationPair::new(discount.id.as_str(), discount.handle.as_str()))
            .collect();
        resources::write_document_tx(
            &tx,
            &DocumentWrite {
                table: Products::Table,
                id_col: Products::Id,
                handle_col: Products::Handle,
                columns: PRODUCT_COLUMNS,
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
            JunctionKind::ProductsToCollections,
            &item.id,
            Some(&item.handle),
            None,
        )
        .await?;
        let collection_pairs = relation_pairs(&item.collections);
        junction::insert_relation_values(
            &tx,
            RelationWrite {
                kind: JunctionKind::ProductsToCollections,
                pairs: &collection_pairs,
                owner_id: &item.id,
                owner_handle: &item.handle,
                context: None,
            },
        )
        .await?;
        junction::delete_by_owner(
            &tx,
            JunctionKind::ProductsToDiscounts,
            &item.id,
            Some(&item.handle),
            None,
        )
        .await?;
        junction::insert_relation_values(
            &tx,
            RelationWrite {
                kind: JunctionKind::ProductsToDiscounts,
                pairs: &eligible,
                owner_id: &item.id,
                owner_handle: &item.handle,
                context: None,
            },
        )
        .await?;
        if item.is_variant() {
            // The variant asserts its own row under the parent; the reporter
            // keys the delete so siblings stay untouched.
            let values = [item.id.clone()];
            junction::insert_array_values(
                &tx,
                ArrayWrite {
                    kind: JunctionKind::ProductsToVariants,
                    values: &values,
                    owner_id: item.parent_id.as_deref().unwrap_or_default(),
                    owner_handle: item.parent_handle.as_deref().unwrap_or_default(),
                    delete_previous: true,
                    reporter: Some(&item.handle),
                    context: None,
                },
            )
            .await?;
        } else {
            junction::delete_by_value_or_reporter(
                &tx,
                JunctionKind::ProductsToVariants,
                Some(&item.id),
                Some(&item.handle),
            )
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn remove_product(&self, id_or_handle: &str) -> AgoraResult<bool> {
        let tx = self.begin().await?;
        let removed = remove_product_tree(&tx, id_or_handle.to_string()).await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn count_products(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(
            &self.conn,
            Products::Table,
            Products::Id,
            PRODUCT_COLUMNS,
            &query,
        )
        .await
    }

    async fn list_used_tags(&self) -> AgoraResult<Vec<String>> {
        let select = Query::select()
            .column(Junction::Value)
            .distinct()
            .from(JunctionKind::Tags.table())
            .cond_where(Expr::col(Junction::Context).eq(CONTEXT))
            .order_by(Junction::Value, Order::Asc)
            .to_owned();
        let rows = query_all(&self.conn, &select).await?;
        Ok(rows
            .iter()
            .filter_map(|row| read_string(row, "value"))
            .collect())
    }

    async fn add_product_to_collection(&self, product: &str, collection: &str) -> AgoraResult<()> {
        let Some((product_id, product_handle)) = fetch_identity(
            &self.conn,
            Products::Table,
            Products::Id,
            Products::Handle,
            product,
        )
        .await?
        else {
            return Err(AgoraError::not_found(format!("product {product}")));
        };
        let Some((collection_id, collection_handle)) = fetch_identity(
            &self.conn,
            Collections::Table,
            Collections::Id,
            Collections::Handle,
            collection,
        )
        .await?
        else {
            return Err(AgoraError::not_found(format!("collection {collection}")));
        };
        let tx = self.begin().await?;
        // Delete-then-insert keeps repeated attaches idempotent.
        junction::delete_pair(
            &tx,
            JunctionKind::ProductsToCollections,
            &product_id,
            &product_handle,
            &collection_id,
            &collection_handle,
        )
        .await?;
        let pairs = [RelationPair::new(
            collection_id.as_str(),
            collection_handle.as_str(),
        )];
        junction::insert_relation_values(
            &tx,
            RelationWrite {
                kind: JunctionKind::ProductsToCollections,
                pairs: &pairs,
                owner_id: &product_id,
                owner_handle: &product_handle,
                context: None,
            },
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove_product_from_collection(
        &self,
        product: &str,
        collection: &str,
    ) -> AgoraResult<()> {
        let Some((product_id, product_handle)) = fetch_identity(
            &self.conn,
            Products::Table,
            Products::Id,
            Products::Handle,
            product,
        )
        .await?
        else {
            return Ok(());
        };
        let Some((collection_id, collection_handle)) = fetch_identity(
            &self.conn,
            Collections::Table,
            Collections::Id,
            Collections::Handle,
            collection,
        )
        .await?
        else {
            return Ok(());
        };
        junction::delete_pair(
            &self.conn,
            JunctionKind::ProductsToCollections,
            &product_id,
            &product_handle,
            &collection_id,
            &collection_handle,
        )
        .await
    }
}
