use async_trait::async_trait;

use agora_core::{AgoraResult, ApiQuery, Document, Expand, Template, TemplatesApi};

use crate::db::Templates;
use crate::resources::{
    self, DocumentWrite, RemovePlan, TEMPLATE_COLUMNS, base_search_terms, base_select, count_rows,
    doc_map, get_doc, list_docs,
};
use crate::store::AgoraStore;

const CONTEXT: &str = "templates";

fn template_search_terms(item: &Template, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    terms.push_words(&item.title);
    terms.extend_raw(extra);
    terms.into_vec()
}

#[async_trait]
impl TemplatesApi for AgoraStore {
    async fn get_template(
        &self,
        id_or_handle: &str,
        _expand: Expand,
    ) -> AgoraResult<Option<Template>> {
        get_doc(
            &self.conn,
            base_select(Templates::Table, TEMPLATE_COLUMNS),
            Templates::Id,
            Templates::Handle,
            id_or_handle,
            TEMPLATE_COLUMNS,
            &[],
        )
        .await
    }

    async fn list_templates(&self, query: ApiQuery) -> AgoraResult<Vec<Template>> {
        list_docs(
            &self.conn,
            base_select(Templates::Table, TEMPLATE_COLUMNS),
            Templates::Table,
            TEMPLATE_COLUMNS,
            &[],
            &query,
        )
        .await
    }

    async fn upsert_template(
        &self,
        mut item: Template,
        search_terms: Vec<String>,
    ) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = template_search_terms(&item, &search_terms);
        resources::write_document(
            self,
            DocumentWrite {
                table: Templates::Table,
                id_col: Templates::Id,
                handle_col: Templates::Handle,
                columns: TEMPLATE_COLUMNS,
                context: CONTEXT,
                tags: &[],
                media: &[],
                search: &search,
            },
            &doc,
        )
        .await
    }

    async fn remove_template(&self, id_or_handle: &str) -> AgoraResult<bool> {
        resources::remove_document(
            self,
            RemovePlan {
                table: Templates::Table,
                id_col: Templates::Id,
                handle_col: Templates::Handle,
                context: CONTEXT,
                owned: &[],
                referenced: &[],
            },
            id_or_handle,
        )
        .await
    }

    async fn count_templates(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(
            &self.conn,
            Templates::Table,
            Templates::Id,
            TEMPLATE_COLUMNS,
            &query,
        )
        .await
    }
}
