//! Auth users: addressable by id or handle like any resource, and also by
//! email for the login path. Customer removal cascades into this table, so
//! the row cleanup is shared as free functions.

use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use sea_orm::sea_query::{Expr, ExprTrait, Query};

use agora_core::{AgoraResult, ApiQuery, AuthUser, AuthUsersApi, Document, Expand};

use crate::db::AuthUsers;
use crate::resources::{
    self, AUTH_USER_COLUMNS, DocumentWrite, RemovePlan, base_search_terms, base_select, count_rows,
    doc_from_row, doc_map, get_doc, list_docs,
};
use crate::store::{AgoraStore, query_one, read_string};

const CONTEXT: &str = "auth_users";

fn auth_search_terms(item: &AuthUser, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    terms.push(&item.email);
    terms.extend_raw(extra);
    terms.into_vec()
}

/// `(id, handle)` of the auth row holding the given email, if any.
pub(crate) async fn find_identity_by_email<C>(
    conn: &C,
    email: &str,
) -> AgoraResult<Option<(String, String)>>
where
    C: ConnectionTrait,
{
    if email.is_empty() {
        return Ok(None);
    }
    let select = Query::select()
        .column(AuthUsers::Id)
        .column(AuthUsers::Handle)
        .from(AuthUsers::Table)
        .cond_where(Expr::col(AuthUsers::Email).eq(email))
        .limit(1)
        .to_owned();
    let Some(row) = query_one(conn, &select).await? else {
        return Ok(None);
    };
    let id = read_string(&row, "id").unwrap_or_default();
    let handle = read_string(&row, "handle").unwrap_or_default();
    Ok(Some((id, handle)))
}

/// Full cleanup of one auth row inside the caller's transaction.
pub(crate) async fn remove_auth_rows<C>(conn: &C, id: &str, handle: &str) -> AgoraResult<()>
where
    C: ConnectionTrait,
{
    resources::remove_document_tx(
        conn,
        &RemovePlan {
            table: AuthUsers::Table,
            id_col: AuthUsers::Id,
            handle_col: AuthUsers::Handle,
            context: CONTEXT,
            owned: &[],
            referenced: &[],
        },
        id,
        handle,
    )
    .await
}

#[async_trait]
impl AuthUsersApi for AgoraStore {
    async fn get_auth_user(
        &self,
        id_or_handle: &str,
        _expand: Expand,
    ) -> AgoraResult<Option<AuthUser>> {
        get_doc(
            &self.conn,
            base_select(AuthUsers::Table, AUTH_USER_COLUMNS),
            AuthUsers::Id,
            AuthUsers::Handle,
            id_or_handle,
            AUTH_USER_COLUMNS,
            &[],
        )
        .await
    }

    async fn get_auth_user_by_email(&self, email: &str) -> AgoraResult<Option<AuthUser>> {
        let mut select = base_select(AuthUsers::Table, AUTH_USER_COLUMNS);
        select
            .cond_where(Expr::col((AuthUsers::Table, AuthUsers::Email)).eq(email))
            .limit(1);
        let Some(row) = query_one(&self.conn, &select).await? else {
            return Ok(None);
        };
        Ok(Some(doc_from_row(&row, AUTH_USER_COLUMNS, &[])?))
    }

    async fn list_auth_users(&self, query: ApiQuery) -> AgoraResult<Vec<AuthUser>> {
        list_docs(
            &self.conn,
            base_select(AuthUsers::Table, AUTH_USER_COLUMNS),
            AuthUsers::Table,
            AUTH_USER_COLUMNS,
            &[],
            &query,
        )
        .await
    }

    async fn upsert_auth_user(
        &self,
        mut item: AuthUser,
        search_terms: Vec<String>,
    ) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let doc = doc_map(&item)?;
        let search = auth_search_terms(&item, &search_terms);
        resources::write_document(
            self,
            DocumentWrite {
                table: AuthUsers::Table,
                id_col: AuthUsers::Id,
                handle_col: AuthUsers::Handle,
                columns: AUTH_USER_COLUMNS,
                context: CONTEXT,
                tags: &[],
                media: &[],
                search: &search,
            },
            &doc,
        )
        .await
    }

    async fn remove_auth_user(&self, id_or_handle: &str) -> AgoraResult<bool> {
        resources::remove_document(
            self,
            RemovePlan {
                table: AuthUsers::Table,
                id_col: AuthUsers::Id,
                handle_col: AuthUsers::Handle,
                context: CONTEXT,
                owned: &[],
                referenced: &[],
            },
            id_or_handle,
        )
        .await
    }

    async fn remove_auth_user_by_email(&self, email: &str) -> AgoraResult<bool> {
        let Some((id, handle)) = find_identity_by_email(&self.conn, email).await? else {
            return Ok(false);
        };
        let tx = self.begin().await?;
        remove_auth_rows(&tx, &id, &handle).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn count_auth_users(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(
            &self.conn,
            AuthUsers::Table,
            AuthUsers::Id,
            AUTH_USER_COLUMNS,
            &query,
        )
        .await
    }
}
