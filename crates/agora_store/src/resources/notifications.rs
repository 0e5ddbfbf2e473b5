use async_trait::async_trait;

use agora_core::{AgoraResult, ApiQuery, Document, Expand, Notification, NotificationsApi};

use crate::db::Notifications;
use crate::resources::{
    self, DocumentWrite, NOTIFICATION_COLUMNS, RemovePlan, base_search_terms, base_select,
    count_rows, doc_map, get_doc, list_docs,
};
use crate::store::AgoraStore;

const CONTEXT: &str = "notifications";

fn notification_search_terms(item: &Notification, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    terms.push(&item.author);
    terms.extend_raw(extra);
    terms.into_vec()
}

#[async_trait]
impl NotificationsApi for AgoraStore {
    async fn get_notification(
        &self,
        id_or_handle: &str,
        _expand: Expand,
    ) -> AgoraResult<Option<Notification>> {
        get_doc(
            &self.conn,
            base_select(Notifications::Table, NOTIFICATION_COLUMNS),
            Notifications::Id,
            Notifications::Handle,
            id_or_handle,
            NOTIFICATION_COLUMNS,
            &[],
        )
        .await
    }

    async fn list_notifications(&self, query: ApiQuery) -> AgoraResult<Vec<Notification>> {
        list_docs(
            &self.conn,
            base_select(Notifications::Table, NOTIFICATION_COLUMNS),
            Notifications::Table,
            NOTIFICATION_COLUMNS,
            &[],
            &query,
        )
        .await
    }

    async fn upsert_notification(
        &self,
        mut item: Notification,
        search_terms: Vec<String>,
    ) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = notification_search_terms(&item, &search_terms);
        resources::write_document(
            self,
            DocumentWrite {
                table: Notifications::Table,
                id_col: Notifications::Id,
                handle_col: Notifications::Handle,
                columns: NOTIFICATION_COLUMNS,
                context: CONTEXT,
                tags: &[],
                media: &[],
                search: &search,
            },
            &doc,
        )
        .await
    }

    async fn upsert_notifications(&self, items: Vec<Notification>) -> AgoraResult<()> {
        // One transaction per item; a failure leaves earlier items committed.
        for item in items {
            self.upsert_notification(item, Vec::new()).await?;
        }
        Ok(())
    }

    async fn remove_notification(&self, id_or_handle: &str) -> AgoraResult<bool> {
        resources::remove_document(
            self,
            RemovePlan {
                table: Notifications::Table,
                id_col: Notifications::Id,
                handle_col: Notifications::Handle,
                context: CONTEXT,
                owned: &[],
                referenced: &[],
            },
            id_or_handle,
        )
        .await
    }

    async fn count_notifications(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(
            &self.conn,
            Notifications::Table,
            Notifications::Id,
            NOTIFICATION_COLUMNS,
            &query,
        )
        .await
    }
}
