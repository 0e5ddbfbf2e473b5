use async_trait::async_trait;
use sea_orm::sea_query::SelectStatement;

use agora_core::{AgoraResult, ApiQuery, Document, Expand, ShippingMethod, ShippingMethodsApi};

use crate::db::{JunctionKind, ShippingMethods};
use crate::projection::AggStrategy;
use crate::resources::{
    self, DocumentWrite, RemovePlan, SHIPPING_COLUMNS, base_search_terms, base_select, count_rows,
    doc_map, get_doc, list_docs, push_scalar,
};
use crate::store::AgoraStore;

const CONTEXT: &str = "shipping_methods";

fn shipping_select(strategy: AggStrategy) -> (SelectStatement, Vec<&'static str>) {
    let mut select = base_select(ShippingMethods::Table, SHIPPING_COLUMNS);
    let mut nested = Vec::new();
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Tags,
        ShippingMethods::Table,
        CONTEXT,
        "tags",
    );
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Media,
        ShippingMethods::Table,
        CONTEXT,
        "media",
    );
    (select, nested)
}

fn shipping_search_terms(item: &ShippingMethod, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    terms.push_words(&item.title);
    for tag in &item.tags {
        terms.push_tag(tag);
    }
    terms.extend_raw(extra);
    terms.into_vec()
}

#[async_trait]
impl ShippingMethodsApi for AgoraStore {
    async fn get_shipping_method(
        &self,
        id_or_handle: &str,
        _expand: Expand,
    ) -> AgoraResult<Option<ShippingMethod>> {
        let (select, nested) = shipping_select(AggStrategy::from_backend(self.backend));
        get_doc(
            &self.conn,
            select,
            ShippingMethods::Id,
            ShippingMethods::Handle,
            id_or_handle,
            SHIPPING_COLUMNS,
            &nested,
        )
        .await
    }

    async fn list_shipping_methods(&self, query: ApiQuery) -> AgoraResult<Vec<ShippingMethod>> {
        let (select, nested) = shipping_select(AggStrategy::from_backend(self.backend));
        list_docs(
            &self.conn,
            select,
            ShippingMethods::Table,
            SHIPPING_COLUMNS,
            &nested,
            &query,
        )
        .await
    }

    async fn upsert_shipping_method(
        &self,
        mut item: ShippingMethod,
        search_terms: Vec<String>,
    ) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = shipping_search_terms(&item, &search_terms);
        resources::write_document(
            self,
            DocumentWrite {
                table: ShippingMethods::Table,
                id_col: ShippingMethods::Id,
                handle_col: ShippingMethods::Handle,
                columns: SHIPPING_COLUMNS,
                context: CONTEXT,
                tags: &item.tags,
                media: &item.media,
                search: &search,
            },
            &doc,
        )
        .await
    }

    async fn remove_shipping_method(&self, id_or_handle: &str) -> AgoraResult<bool> {
        resources::remove_document(
            self,
            RemovePlan {
                table: ShippingMethods::Table,
                id_col: ShippingMethods::Id,
                handle_col: ShippingMethods::Handle,
                context: CONTEXT,
                owned: &[],
                referenced: &[JunctionKind::StorefrontsToOther],
            },
            id_or_handle,
        )
        .await
    }

    async fn count_shipping_methods(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(
            &self.conn,
            ShippingMethods::Table,
            ShippingMethods::Id,
            SHIPPING_COLUMNS,
            &query,
        )
        .await
    }
}
