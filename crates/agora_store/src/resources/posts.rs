use async_trait::async_trait;
use sea_orm::sea_query::SelectStatement;

use agora_core::{AgoraResult, ApiQuery, Document, Expand, Post, PostsApi};

use crate::db::{JunctionKind, Posts};
use crate::projection::AggStrategy;
use crate::resources::{
    self, DocumentWrite, POST_COLUMNS, RemovePlan, base_search_terms, base_select, count_rows,
    doc_map, get_doc, list_docs, push_scalar,
};
use crate::store::AgoraStore;

const CONTEXT: &str = "posts";

pub(crate) fn post_select(strategy: AggStrategy) -> (SelectStatement, Vec<&'static str>) {
    let mut select = base_select(Posts::Table, POST_COLUMNS);
    let mut nested = Vec::new();
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Tags,
        Posts::Table,
        CONTEXT,
        "tags",
    );
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Media,
        Posts::Table,
        CONTEXT,
        "media",
    );
    (select, nested)
}

fn post_search_terms(item: &Post, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    terms.push_words(&item.title);
    for tag in &item.tags {
        terms.push_tag(tag);
    }
    terms.extend_raw(extra);
    terms.into_vec()
}

#[async_trait]
impl PostsApi for AgoraStore {
    async fn get_post(&self, id_or_handle: &str, _expand: Expand) -> AgoraResult<Option<Post>> {
        let (select, nested) = post_select(AggStrategy::from_backend(self.backend));
        get_doc(
            &self.conn,
            select,
            Posts::Id,
            Posts::Handle,
            id_or_handle,
            POST_COLUMNS,
            &nested,
        )
        .await
    }

    async fn list_posts(&self, query: ApiQuery) -> AgoraResult<Vec<Post>> {
        let (select, nested) = post_select(AggStrategy::from_backend(self.backend));
        list_docs(&self.conn, select, Posts::Table, POST_COLUMNS, &nested, &query).await
    }

    async fn upsert_post(&self, mut item: Post, search_terms: Vec<String>) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = post_search_terms(&item, &search_terms);
        resources::write_document(
            self,
            DocumentWrite {
                table: Posts::Table,
                id_col: Posts::Id,
                handle_col: Posts::Handle,
                columns: POST_COLUMNS,
                context: CONTEXT,
                tags: &item.tags,
                media: &item.media,
                search: &search,
            },
            &doc,
        )
        .await
    }

    async fn remove_post(&self, id_or_handle: &str) -> AgoraResult<bool> {
        resources::remove_document(
            self,
            RemovePlan {
                table: Posts::Table,
                id_col: Posts::Id,
                handle_col: Posts::Handle,
                context: CONTEXT,
                owned: &[],
                referenced: &[JunctionKind::StorefrontsToOther],
            },
            id_or_handle,
        )
        .await
    }

    async fn count_posts(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(&self.conn, Posts::Table, Posts::Id, POST_COLUMNS, &query).await
    }
}
