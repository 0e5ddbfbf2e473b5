use async_trait::async_trait;

use agora_core::{AgoraResult, ApiQuery, Document, Expand, Image, ImagesApi};

use crate::db::Images;
use crate::resources::{
    self, DocumentWrite, IMAGE_COLUMNS, RemovePlan, base_search_terms, base_select, count_rows,
    doc_map, get_doc, list_docs,
};
use crate::store::AgoraStore;

const CONTEXT: &str = "images";

fn image_search_terms(item: &Image, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    terms.push(&item.name);
    terms.extend_raw(extra);
    terms.into_vec()
}

#[async_trait]
impl ImagesApi for AgoraStore {
    async fn get_image(&self, id_or_handle: &str, _expand: Expand) -> AgoraResult<Option<Image>> {
        get_doc(
            &self.conn,
            base_select(Images::Table, IMAGE_COLUMNS),
            Images::Id,
            Images::Handle,
            id_or_handle,
            IMAGE_COLUMNS,
            &[],
        )
        .await
    }

    async fn list_images(&self, query: ApiQuery) -> AgoraResult<Vec<Image>> {
        list_docs(
            &self.conn,
            base_select(Images::Table, IMAGE_COLUMNS),
            Images::Table,
            IMAGE_COLUMNS,
            &[],
            &query,
        )
        .await
    }

    async fn upsert_image(&self, mut item: Image, search_terms: Vec<String>) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = image_search_terms(&item, &search_terms);
        resources::write_document(
            self,
            DocumentWrite {
                table: Images::Table,
                id_col: Images::Id,
                handle_col: Images::Handle,
                columns: IMAGE_COLUMNS,
                context: CONTEXT,
                tags: &[],
                media: &[],
                search: &search,
            },
            &doc,
        )
        .await
    }

    async fn remove_image(&self, id_or_handle: &str) -> AgoraResult<bool> {
        resources::remove_document(
            self,
            RemovePlan {
                table: Images::Table,
                id_col: Images::Id,
                handle_col: Images::Handle,
                context: CONTEXT,
                owned: &[],
                referenced: &[],
            },
            id_or_handle,
        )
        .await
    }

    async fn count_images(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(&self.conn, Images::Table, Images::Id, IMAGE_COLUMNS, &query).await
    }
}
