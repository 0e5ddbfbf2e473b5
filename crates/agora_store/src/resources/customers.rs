//! Customers carry tags but no media list. Removing a customer also removes
//! the auth_users row sharing their email, in the same transaction.

use async_trait::async_trait;
use sea_orm::sea_query::SelectStatement;

use agora_core::{AgoraResult, ApiQuery, Customer, CustomersApi, Document, Expand};

use crate::db::{Customers, JunctionKind};
use crate::projection::AggStrategy;
use crate::resources::{
    self, CUSTOMER_COLUMNS, DocumentWrite, RemovePlan, base_search_terms, base_select, count_rows,
    doc_map, get_doc, list_docs, push_scalar,
};
use crate::store::AgoraStore;

use super::auth_users;

const CONTEXT: &str = "customers";

fn customer_select(strategy: AggStrategy) -> (SelectStatement, Vec<&'static str>) {
    let mut select = base_select(Customers::Table, CUSTOMER_COLUMNS);
    let mut nested = Vec::new();
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Tags,
        Customers::Table,
        CONTEXT,
        "tags",
    );
    (select, nested)
}

fn customer_search_terms(item: &Customer, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    terms.push(&item.email);
    terms.push_words(&item.firstname);
    terms.push_words(&item.lastname);
    for tag in &item.tags {
        terms.push_tag(tag);
    }
    terms.extend_raw(extra);
    terms.into_vec()
}

#[async_trait]
impl CustomersApi for AgoraStore {
    async fn get_customer(
        &self,
        id_or_handle: &str,
        _expand: Expand,
    ) -> AgoraResult<Option<Customer>> {
        let (select, nested) = customer_select(AggStrategy::from_backend(self.backend));
        get_doc(
            &self.conn,
            select,
            Customers::Id,
            Customers::Handle,
            id_or_handle,
            CUSTOMER_COLUMNS,
            &nested,
        )
        .await
    }

    async fn list_customers(&self, query: ApiQuery) -> AgoraResult<Vec<Customer>> {
        let (select, nested) = customer_select(AggStrategy::from_backend(self.backend));
        list_docs(
            &self.conn,
            select,
            Customers::Table,
            CUSTOMER_COLUMNS,
            &nested,
            &query,
        )
        .await
    }

    async fn upsert_customer(
        &self,
        mut item: Customer,
        search_terms: Vec<String>,
    ) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = customer_search_terms(&item, &search_terms);
        resources::write_document(
            self,
            DocumentWrite {
                table: Customers::Table,
                id_col: Customers::Id,
                handle_col: Customers::Handle,
                columns: CUSTOMER_COLUMNS,
                context: CONTEXT,
                tags: &item.tags,
                media: &[],
                search: &search,
            },
            &doc,
        )
        .await
    }

    async fn remove_customer(&self, id_or_handle: &str) -> AgoraResult<bool> {
        let Some(customer) = self.get_customer(id_or_handle, Expand::none()).await? else {
            return Ok(false);
        };
        let tx = self.begin().await?;
        resources::remove_document_tx(
            &tx,
            &RemovePlan {
                table: Customers::Table,
                id_col: Customers::Id,
                handle_col: Customers::Handle,
                context: CONTEXT,
                owned: &[],
                referenced: &[],
            },
            &customer.id,
            &customer.handle,
        )
        .await?;
        if let Some((auth_id, auth_handle)) =
            auth_users::find_identity_by_email(&tx, &customer.email).await?
        {
            auth_users::remove_auth_rows(&tx, &auth_id, &auth_handle).await?;
        }
        tx.commit().await?;
        Ok(true)
    }

    async fn count_customers(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(
            &self.conn,
            Customers::Table,
            Customers::Id,
            CUSTOMER_COLUMNS,
            &query,
        )
        .await
    }
}
