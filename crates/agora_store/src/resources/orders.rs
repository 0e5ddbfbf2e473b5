//! Orders carry no tag or media relations; only search terms are maintained
//! alongside the base row. Contact fields drive the default search surface so
//! an order is findable by the customer who placed it.

use async_trait::async_trait;

use agora_core::{AgoraResult, ApiQuery, Document, Expand, Order, OrdersApi};

use crate::db::Orders;
use crate::resources::{
    self, DocumentWrite, ORDER_COLUMNS, RemovePlan, base_search_terms, base_select, count_rows,
    doc_map, get_doc, list_docs,
};
use crate::store::AgoraStore;

const CONTEXT: &str = "orders";

fn order_search_terms(item: &Order, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    // The bare suffix lets dashboards paste an id without its prefix.
    if let Some((_, bare)) = item.id.split_once('_') {
        terms.push(bare);
    }
    terms.push(&item.contact.email);
    terms.push(&item.contact.customer_id);
    terms.push_words(&item.contact.firstname);
    terms.push_words(&item.contact.lastname);
    terms.extend_raw(extra);
    terms.into_vec()
}

#[async_trait]
impl OrdersApi for AgoraStore {
    async fn get_order(&self, id_or_handle: &str, _expand: Expand) -> AgoraResult<Option<Order>> {
        get_doc(
            &self.conn,
            base_select(Orders::Table, ORDER_COLUMNS),
            Orders::Id,
            Orders::Handle,
            id_or_handle,
            ORDER_COLUMNS,
            &[],
        )
        .await
    }

    async fn list_orders(&self, query: ApiQuery) -> AgoraResult<Vec<Order>> {
        list_docs(
            &self.conn,
            base_select(Orders::Table, ORDER_COLUMNS),
            Orders::Table,
            ORDER_COLUMNS,
            &[],
            &query,
        )
        .await
    }

    async fn upsert_order(&self, mut item: Order, search_terms: Vec<String>) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = order_search_terms(&item, &search_terms);
        resources::write_document(
            self,
            DocumentWrite {
                table: Orders::Table,
                id_col: Orders::Id,
                handle_col: Orders::Handle,
                columns: ORDER_COLUMNS,
                context: CONTEXT,
                tags: &[],
                media: &[],
                search: &search,
            },
            &doc,
        )
        .await
    }

    async fn remove_order(&self, id_or_handle: &str) -> AgoraResult<bool> {
        resources::remove_document(
            self,
            RemovePlan {
                table: Orders::Table,
                id_col: Orders::Id,
                handle_col: Orders::Handle,
                context: CONTEXT,
                owned: &[],
                referenced: &[],
            },
            id_or_handle,
        )
        .await
    }

    async fn count_orders(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(&self.conn, Orders::Table, Orders::Id, ORDER_COLUMNS, &query).await
    }
}

#[cfg(test)]
mod tests {
    use agora_core::OrderContact;

    use super::*;

    #[test]
    fn search_terms_cover_contact_and_bare_id() {
        let order = Order {
            id: "order_01J5".into(),
            handle: "order_01J5".into(),
            contact: OrderContact {
                email: "ada@example.com".into(),
                firstname: "Ada".into(),
                lastname: "Lovelace".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let terms = order_search_terms(&order, &[]);
        assert!(terms.contains(&"order_01j5".to_string()));
        assert!(terms.contains(&"01j5".to_string()));
        assert!(terms.contains(&"ada@example.com".to_string()));
        assert!(terms.contains(&"lovelace".to_string()));
    }
}
