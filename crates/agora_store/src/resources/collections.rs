//! Collections: membership rows live in `products_to_collections` and are
//! owned by the product side, so the collection driver reads them through the
//! inverse lookup and scrubs them on removal.

use async_trait::async_trait;
use sea_orm::sea_query::SelectStatement;

use agora_core::{AgoraResult, ApiQuery, Collection, CollectionsApi, Document, Expand, Product};

use crate::db::{Collections, JunctionKind, Products};
use crate::projection::AggStrategy;
use crate::resources::products::product_select;
use crate::resources::{
    self, COLLECTION_COLUMNS, DocumentWrite, PRODUCT_COLUMNS, RemovePlan, base_search_terms,
    base_select, count_members, count_rows, doc_map, get_doc, list_docs, member_of, push_scalar,
};
use crate::store::AgoraStore;

const CONTEXT: &str = "collections";

fn collection_select(strategy: AggStrategy) -> (SelectStatement, Vec<&'static str>) {
    let mut select = base_select(Collections::Table, COLLECTION_COLUMNS);
    let mut nested = Vec::new();
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Tags,
        Collections::Table,
        CONTEXT,
        "tags",
    );
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Media,
        Collections::Table,
        CONTEXT,
        "media",
    );
    (select, nested)
}

fn collection_search_terms(item: &Collection, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    terms.push_words(&item.title);
    for tag in &item.tags {
        terms.push_tag(tag);
    }
    terms.extend_raw(extra);
    terms.into_vec()
}

#[async_trait]
impl CollectionsApi for AgoraStore {
    async fn get_collection(
        &self,
        id_or_handle: &str,
        _expand: Expand,
    ) -> AgoraResult<Option<Collection>> {
        let (select, nested) = collection_select(AggStrategy::from_backend(self.backend));
        get_doc(
            &self.conn,
            select,
            Collections::Id,
            Collections::Handle,
            id_or_handle,
            COLLECTION_COLUMNS,
            &nested,
        )
        .await
    }

    async fn list_collections(&self, query: ApiQuery) -> AgoraResult<Vec<Collection>> {
        let (select, nested) = collection_select(AggStrategy::from_backend(self.backend));
        list_docs(
            &self.conn,
            select,
            Collections::Table,
            COLLECTION_COLUMNS,
            &nested,
            &query,
        )
        .await
    }

    async fn upsert_collection(
        &self,
        mut item: Collection,
        search_terms: Vec<String>,
    ) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = collection_search_terms(&item, &search_terms);
        resources::write_document(
            self,
            DocumentWrite {
                table: Collections::Table,
                id_col: Collections::Id,
                handle_col: Collections::Handle,
                columns: COLLECTION_COLUMNS,
                context: CONTEXT,
                tags: &item.tags,
                media: &item.media,
                search: &search,
            },
            &doc,
        )
        .await
    }

    async fn remove_collection(&self, id_or_handle: &str) -> AgoraResult<bool> {
        resources::remove_document(
            self,
            RemovePlan {
                table: Collections::Table,
                id_col: Collections::Id,
                handle_col: Collections::Handle,
                context: CONTEXT,
                owned: &[],
                referenced: &[
                    JunctionKind::ProductsToCollections,
                    JunctionKind::StorefrontsToOther,
                ],
            },
            id_or_handle,
        )
        .await
    }

    async fn count_collections(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(
            &self.conn,
            Collections::Table,
            Collections::Id,
            COLLECTION_COLUMNS,
            &query,
        )
        .await
    }

    async fn list_collection_products(
        &self,
        id_or_handle: &str,
        query: ApiQuery,
    ) -> AgoraResult<Vec<Product>> {
        let expand = Expand::Only(query.expand.clone());
        let (mut select, nested) =
            product_select(AggStrategy::from_backend(self.backend), &expand);
        select.cond_where(member_of(
            Products::Table,
            Products::Id,
            JunctionKind::ProductsToCollections,
            id_or_handle,
        ));
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

    async fn count_collection_products(&self, id_or_handle: &str) -> AgoraResult<u64> {
        count_members(
            &self.conn,
            Products::Table,
            Products::Id,
            JunctionKind::ProductsToCollections,
            id_or_handle,
        )
        .await
    }
}
