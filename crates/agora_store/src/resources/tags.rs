//! Tag documents describe the vocabulary itself; the strings attached to
//! other entities live in the shared tag junction and are managed by the
//! owning resources.

use async_trait::async_trait;

use agora_core::{AgoraResult, ApiQuery, Document, Expand, Tag, TagsApi};

use crate::db::Tags;
use crate::resources::{
    self, DocumentWrite, RemovePlan, TAG_COLUMNS, base_search_terms, base_select, count_rows,
    doc_map, get_doc, list_docs,
};
use crate::store::AgoraStore;

const CONTEXT: &str = "tags";

fn tag_search_terms(item: &Tag, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    for value in &item.values {
        terms.push(value);
    }
    terms.extend_raw(extra);
    terms.into_vec()
}

#[async_trait]
impl TagsApi for AgoraStore {
    async fn get_tag(&self, id_or_handle: &str, _expand: Expand) -> AgoraResult<Option<Tag>> {
        get_doc(
            &self.conn,
            base_select(Tags::Table, TAG_COLUMNS),
            Tags::Id,
            Tags::Handle,
            id_or_handle,
            TAG_COLUMNS,
            &[],
        )
        .await
    }

    async fn list_tags(&self, query: ApiQuery) -> AgoraResult<Vec<Tag>> {
        list_docs(
            &self.conn,
            base_select(Tags::Table, TAG_COLUMNS),
            Tags::Table,
            TAG_COLUMNS,
            &[],
            &query,
        )
        .await
    }

    async fn upsert_tag(&self, mut item: Tag, search_terms: Vec<String>) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = tag_search_terms(&item, &search_terms);
        resources::write_document(
            self,
            DocumentWrite {
                table: Tags::Table,
                id_col: Tags::Id,
                handle_col: Tags::Handle,
                columns: TAG_COLUMNS,
                context: CONTEXT,
                tags: &[],
                media: &[],
                search: &search,
            },
            &doc,
        )
        .await
    }

    async fn remove_tag(&self, id_or_handle: &str) -> AgoraResult<bool> {
        resources::remove_document(
            self,
            RemovePlan {
                table: Tags::Table,
                id_col: Tags::Id,
                handle_col: Tags::Handle,
                context: CONTEXT,
                owned: &[],
                referenced: &[],
            },
            id_or_handle,
        )
        .await
    }

    async fn count_tags(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(&self.conn, Tags::Table, Tags::Id, TAG_COLUMNS, &query).await
    }
}
