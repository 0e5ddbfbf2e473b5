//! Per-resource drivers over the shared schema. Each submodule implements one
//! API trait from `agora_core` on [`AgoraStore`]; this module holds the
//! row/document plumbing and the physical column registry they all share.
//!
//! Documents travel as JSON maps between the typed models and the flat rows:
//! writes serialize the document and bind each registered column by kind,
//! reads rebuild the map from row values plus any projected relation arrays
//! and deserialize back into the model. Fields absent from a row are simply
//! omitted so `serde(default)` fills them.

mod auth_users;
mod collections;
mod customers;
mod discounts;
mod images;
mod notifications;
mod orders;
mod posts;
mod products;
mod shipping;
mod storefronts;
mod tags;
mod templates;

use sea_orm::sea_query::{
    Alias, Expr, ExprTrait, Func, Iden, Query, SelectStatement, SimpleExpr, Value as SeaValue,
};
use sea_orm::{ConnectionTrait, QueryResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use agora_core::{AgoraError, AgoraResult, ApiQuery, Document};

use crate::db::{ColKind, JunctionKind};
use crate::junction::{self, ArrayWrite};
use crate::projection::{AggStrategy, RelatedTable, object_array, scalar_array};
use crate::query::{apply_count_query, apply_query};
use crate::search::SearchTerms;
use crate::store::{
    AgoraStore, delete_base_row, exec, fetch_identity, id_or_handle_cond, query_all, query_one,
    read_bool, read_f64, read_i64, read_json, read_string,
};

pub(crate) type ColumnSpec = (&'static str, ColKind);

pub(crate) const PRODUCT_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("title", ColKind::Text),
    ("description", ColKind::Text),
    ("price", ColKind::Real),
    ("compare_at_price", ColKind::Real),
    ("qty", ColKind::Int),
    ("video", ColKind::Text),
    ("variant_hint", ColKind::Json),
    ("parent_handle", ColKind::Text),
    ("parent_id", ColKind::Text),
];

pub(crate) const COLLECTION_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("title", ColKind::Text),
    ("description", ColKind::Text),
    ("published", ColKind::Text),
];

pub(crate) const DISCOUNT_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("title", ColKind::Text),
    ("description", ColKind::Text),
    ("published", ColKind::Text),
    ("priority", ColKind::Int),
    ("application", ColKind::Int),
    ("info", ColKind::Json),
];

pub(crate) const ORDER_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("contact", ColKind::Json),
    ("status", ColKind::Json),
    ("pricing", ColKind::Json),
    ("line_items", ColKind::Json),
    ("delivery", ColKind::Json),
    ("payment_gateway", ColKind::Json),
    ("notes", ColKind::Text),
];

pub(crate) const STOREFRONT_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("title", ColKind::Text),
    ("description", ColKind::Text),
    ("video", ColKind::Text),
    ("published", ColKind::Text),
];

pub(crate) const CUSTOMER_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("email", ColKind::Text),
    ("auth_id", ColKind::Text),
    ("firstname", ColKind::Text),
    ("lastname", ColKind::Text),
    ("phone_number", ColKind::Text),
    ("picture", ColKind::Text),
];

pub(crate) const TAG_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("values", ColKind::Json),
];

pub(crate) const IMAGE_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("name", ColKind::Text),
    ("url", ColKind::Text),
];

pub(crate) const NOTIFICATION_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("message", ColKind::Text),
    ("author", ColKind::Text),
    ("actions", ColKind::Json),
];

pub(crate) const POST_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("title", ColKind::Text),
    ("text", ColKind::Text),
];

pub(crate) const SHIPPING_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("title", ColKind::Text),
    ("price", ColKind::Real),
];

pub(crate) const TEMPLATE_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("title", ColKind::Text),
    ("template_html", ColKind::Text),
    ("template_text", ColKind::Text),
    ("reference_example_input", ColKind::Json),
];

pub(crate) const AUTH_USER_COLUMNS: &[ColumnSpec] = &[
    ("id", ColKind::Text),
    ("handle", ColKind::Text),
    ("created_at", ColKind::Text),
    ("updated_at", ColKind::Text),
    ("active", ColKind::Bool),
    ("attributes", ColKind::Json),
    ("email", ColKind::Text),
    ("password", ColKind::Text),
    ("confirmed_mail", ColKind::Bool),
    ("roles", ColKind::Json),
];

// Nested relation projections only carry the physical columns of the related
// row; list-valued fields of the related document stay at their defaults.
pub(crate) const RELATED_PRODUCTS: RelatedTable = RelatedTable {
    table: "products",
    columns: PRODUCT_COLUMNS,
};

pub(crate) const RELATED_COLLECTIONS: RelatedTable = RelatedTable {
    table: "collections",
    columns: COLLECTION_COLUMNS,
};

pub(crate) const RELATED_DISCOUNTS: RelatedTable = RelatedTable {
    table: "discounts",
    columns: DISCOUNT_COLUMNS,
};

pub(crate) const RELATED_POSTS: RelatedTable = RelatedTable {
    table: "posts",
    columns: POST_COLUMNS,
};

pub(crate) const RELATED_SHIPPING: RelatedTable = RelatedTable {
    table: "shipping_methods",
    columns: SHIPPING_COLUMNS,
};

pub(crate) fn field_names(columns: &[ColumnSpec]) -> Vec<&str> {
    columns.iter().map(|(name, _)| *name).collect()
}

/// Junction pairs for a list of embedded related documents. Entries carrying
/// neither id nor handle are unaddressable and dropped.
pub(crate) fn relation_pairs<D>(docs: &[D]) -> Vec<junction::RelationPair>
where
    D: Document,
{
    docs.iter()
        .filter(|doc| !doc.id().is_empty() || !doc.handle().is_empty())
        .map(|doc| junction::RelationPair::new(doc.id(), doc.handle()))
        .collect()
}

/// Terms every resource is searchable by; resource drivers add their own.
pub(crate) fn base_search_terms(id: &str, handle: &str) -> SearchTerms {
    let mut terms = SearchTerms::new();
    terms.push(id);
    terms.push(handle);
    terms
}

pub(crate) fn base_select<T>(table: T, columns: &[ColumnSpec]) -> SelectStatement
where
    T: Iden + Copy + 'static,
{
    let mut select = Query::select();
    select.from(table);
    for (name, _) in columns {
        select.column((table, Alias::new(*name)));
    }
    select
}

pub(crate) fn push_scalar<T>(
    select: &mut SelectStatement,
    nested: &mut Vec<&'static str>,
    strategy: AggStrategy,
    kind: JunctionKind,
    table: T,
    context: &'static str,
    name: &'static str,
) where
    T: Iden + Copy + 'static,
{
    select.expr_as(
        scalar_array(strategy, kind, table, Some(context)),
        Alias::new(name),
    );
    nested.push(name);
}

pub(crate) fn push_objects<T>(
    select: &mut SelectStatement,
    nested: &mut Vec<&'static str>,
    strategy: AggStrategy,
    kind: JunctionKind,
    table: T,
    context: Option<&str>,
    related: &RelatedTable,
    name: &'static str,
) where
    T: Iden + Copy + 'static,
{
    select.expr_as(
        object_array(strategy, kind, table, context, related),
        Alias::new(name),
    );
    nested.push(name);
}

pub(crate) fn row_to_map(
    row: &QueryResult,
    columns: &[ColumnSpec],
    nested: &[&str],
) -> serde_json::Map<String, JsonValue> {
    let mut map = serde_json::Map::new();
    for (name, kind) in columns {
        let value = match kind {
            ColKind::Text => read_string(row, name).map(JsonValue::String),
            ColKind::Bool => read_bool(row, name).map(JsonValue::Bool),
            ColKind::Real => read_f64(row, name)
                .and_then(serde_json::Number::from_f64)
                .map(JsonValue::Number),
            ColKind::Int => read_i64(row, name).map(|value| JsonValue::Number(value.into())),
            ColKind::Json => read_json(row, name),
        };
        if let Some(value) = value {
            map.insert((*name).to_string(), value);
        }
    }
    for name in nested {
        if let Some(value) = read_json(row, name) {
            map.insert((*name).to_string(), value);
        }
    }
    map
}

pub(crate) fn doc_from_row<D>(
    row: &QueryResult,
    columns: &[ColumnSpec],
    nested: &[&str],
) -> AgoraResult<D>
where
    D: DeserializeOwned,
{
    let map = row_to_map(row, columns, nested);
    serde_json::from_value(JsonValue::Object(map))
        .map_err(|err| AgoraError::storage(format!("row decode failed: {err}")))
}

pub(crate) fn doc_map<D>(doc: &D) -> AgoraResult<serde_json::Map<String, JsonValue>>
where
    D: Serialize,
{
    match serde_json::to_value(doc) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(_) => Err(AgoraError::storage("document did not serialize to an object")),
        Err(err) => Err(AgoraError::storage(format!("document encode failed: {err}"))),
    }
}

pub(crate) fn text_field<'a>(doc: &'a serde_json::Map<String, JsonValue>, name: &str) -> &'a str {
    doc.get(name).and_then(JsonValue::as_str).unwrap_or_default()
}

/// Bind a document field as the column's kind. Missing and null fields bind
/// typed NULLs; JSON columns store the serialized form.
pub(crate) fn column_value(kind: ColKind, value: Option<&JsonValue>) -> SeaValue {
    match kind {
        ColKind::Text => SeaValue::String(value.and_then(json_text)),
        ColKind::Bool => SeaValue::Bool(value.and_then(json_bool)),
        ColKind::Real => SeaValue::Double(value.and_then(JsonValue::as_f64)),
        ColKind::Int => SeaValue::BigInt(value.and_then(JsonValue::as_i64)),
        ColKind::Json => SeaValue::String(
            value
                .filter(|value| !value.is_null())
                .map(|value| value.to_string()),
        ),
    }
}

fn json_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) => Some(text.clone()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

fn json_bool(value: &JsonValue) -> Option<bool> {
    match value {
        JsonValue::Bool(flag) => Some(*flag),
        JsonValue::Number(number) => Some(number.as_i64().unwrap_or(0) != 0),
        _ => None,
    }
}

pub(crate) fn build_insert<T>(
    table: T,
    columns: &[ColumnSpec],
    doc: &serde_json::Map<String, JsonValue>,
) -> sea_orm::sea_query::InsertStatement
where
    T: Iden + Copy + 'static,
{
    let mut insert = Query::insert();
    insert.into_table(table);
    insert.columns(columns.iter().map(|(name, _)| Alias::new(*name)));
    insert.values_panic(
        columns
            .iter()
            .map(|(name, kind)| column_value(*kind, doc.get(*name)).into()),
    );
    insert
}

/// Upserts are modeled as delete-then-insert keyed by id or handle, so a
/// handle takeover replaces the old row instead of raising a conflict.
pub(crate) async fn replace_base_row<C, T>(
    conn: &C,
    table: T,
    id_col: T,
    handle_col: T,
    columns: &[ColumnSpec],
    doc: &serde_json::Map<String, JsonValue>,
) -> AgoraResult<()>
where
    C: ConnectionTrait,
    T: Iden + Copy + 'static,
{
    let id = text_field(doc, "id");
    let handle = text_field(doc, "handle");
    delete_base_row(conn, table, id_col, handle_col, id, handle).await?;
    exec(conn, &build_insert(table, columns, doc)).await
}

pub(crate) async fn read_docs<C, D>(
    conn: &C,
    select: &SelectStatement,
    columns: &[ColumnSpec],
    nested: &[&str],
    reverse: bool,
) -> AgoraResult<Vec<D>>
where
    C: ConnectionTrait,
    D: DeserializeOwned,
{
    let rows = query_all(conn, select).await?;
    let mut docs = Vec::with_capacity(rows.len());
    for row in &rows {
        docs.push(doc_from_row(row, columns, nested)?);
    }
    if reverse {
        docs.reverse();
    }
    Ok(docs)
}

pub(crate) async fn get_doc<C, T, D>(
    conn: &C,
    mut select: SelectStatement,
    id_col: T,
    handle_col: T,
    needle: &str,
    columns: &[ColumnSpec],
    nested: &[&str],
) -> AgoraResult<Option<D>>
where
    C: ConnectionTrait,
    T: Iden + 'static,
    D: DeserializeOwned,
{
    select
        .cond_where(id_or_handle_cond(id_col, handle_col, needle))
        .limit(1);
    let Some(row) = query_one(conn, &select).await? else {
        return Ok(None);
    };
    Ok(Some(doc_from_row(&row, columns, nested)?))
}

pub(crate) async fn list_docs<C, T, D>(
    conn: &C,
    mut select: SelectStatement,
    table: T,
    columns: &[ColumnSpec],
    nested: &[&str],
    query: &ApiQuery,
) -> AgoraResult<Vec<D>>
where
    C: ConnectionTrait,
    T: Iden + Copy + 'static,
    D: DeserializeOwned,
{
    let allowed = field_names(columns);
    let reverse = apply_query(&mut select, table, &allowed, query)?;
    read_docs(conn, &select, columns, nested, reverse).await
}

pub(crate) async fn count_rows<C, T>(
    conn: &C,
    table: T,
    id_col: T,
    columns: &[ColumnSpec],
    query: &ApiQuery,
) -> AgoraResult<u64>
where
    C: ConnectionTrait,
    T: Iden + Copy + 'static,
{
    let mut select = Query::select();
    select
        .expr_as(Func::count(Expr::col((table, id_col))), Alias::new("cnt"))
        .from(table);
    apply_count_query(&mut select, table, &field_names(columns), query);
    read_count(query_one(conn, &select).await?)
}

fn read_count(row: Option<QueryResult>) -> AgoraResult<u64> {
    let Some(row) = row else {
        return Ok(0);
    };
    let count: i64 = row.try_get("", "cnt")?;
    Ok(Ord::max(count, 0) as u64)
}

/// Membership filter: rows of `table` that some junction row of `kind` points
/// at the given entity from.
pub(crate) fn member_of<T>(table: T, id_col: T, kind: JunctionKind, needle: &str) -> SimpleExpr
where
    T: Iden + Copy + 'static,
{
    Expr::col((table, id_col)).in_subquery(junction::select_owner_ids_by_value_or_reporter(
        kind,
        needle,
        Some(needle),
    ))
}

pub(crate) async fn count_members<C, T>(
    conn: &C,
    table: T,
    id_col: T,
    kind: JunctionKind,
    needle: &str,
) -> AgoraResult<u64>
where
    C: ConnectionTrait,
    T: Iden + Copy + 'static,
{
    let select = Query::select()
        .expr_as(Func::count(Expr::col((table, id_col))), Alias::new("cnt"))
        .from(table)
        .cond_where(member_of(table, id_col, kind, needle))
        .to_owned();
    read_count(query_one(conn, &select).await?)
}

/// Shared junction writes of a document upsert: tags, search terms, and media
/// are wholesale rewrites scoped to the owner's base table.
pub(crate) struct CommonRelations<'a> {
    pub owner_id: &'a str,
    pub owner_handle: &'a str,
    pub context: &'a str,
    pub tags: &'a [String],
    pub media: &'a [String],
    pub search: &'a [String],
}

pub(crate) async fn rewrite_common_relations<C>(
    conn: &C,
    relations: CommonRelations<'_>,
) -> AgoraResult<()>
where
    C: ConnectionTrait,
{
    for (kind, values) in [
        (JunctionKind::Tags, relations.tags),
        (JunctionKind::SearchTerms, relations.search),
        (JunctionKind::Media, relations.media),
    ] {
        junction::insert_array_values(
            conn,
            ArrayWrite {
                kind,
                values,
                owner_id: relations.owner_id,
                owner_handle: relations.owner_handle,
                delete_previous: true,
                reporter: None,
                context: Some(relations.context),
            },
        )
        .await?;
    }
    Ok(())
}

pub(crate) async fn delete_common_relations<C>(
    conn: &C,
    owner_id: &str,
    owner_handle: &str,
    context: &str,
) -> AgoraResult<()>
where
    C: ConnectionTrait,
{
    for kind in [
        JunctionKind::Tags,
        JunctionKind::SearchTerms,
        JunctionKind::Media,
    ] {
        junction::delete_by_owner(conn, kind, owner_id, Some(owner_handle), Some(context)).await?;
    }
    Ok(())
}

/// One standard upsert: shared junction rewrites plus the base row, inside
/// the caller's transaction.
pub(crate) struct DocumentWrite<'a, T> {
    pub table: T,
    pub id_col: T,
    pub handle_col: T,
    pub columns: &'static [ColumnSpec],
    pub context: &'static str,
    pub tags: &'a [String],
    pub media: &'a [String],
    pub search: &'a [String],
}

pub(crate) async fn write_document_tx<C, T>(
    conn: &C,
    write: &DocumentWrite<'_, T>,
    doc: &serde_json::Map<String, JsonValue>,
) -> AgoraResult<()>
where
    C: ConnectionTrait,
    T: Iden + Copy + 'static,
{
    rewrite_common_relations(
        conn,
        CommonRelations {
            owner_id: text_field(doc, "id"),
            owner_handle: text_field(doc, "handle"),
            context: write.context,
            tags: write.tags,
            media: write.media,
            search: write.search,
        },
    )
    .await?;
    replace_base_row(
        conn,
        write.table,
        write.id_col,
        write.handle_col,
        write.columns,
        doc,
    )
    .await
}

pub(crate) async fn write_document<T>(
    store: &AgoraStore,
    write: DocumentWrite<'_, T>,
    doc: &serde_json::Map<String, JsonValue>,
) -> AgoraResult<()>
where
    T: Iden + Copy + 'static,
{
    let tx = store.begin().await?;
    write_document_tx(&tx, &write, doc).await?;
    tx.commit().await?;
    Ok(())
}

/// One standard cascade: shared junction rows, junctions the entity owns,
/// junctions pointing at it from elsewhere, then the base row.
pub(crate) struct RemovePlan<T> {
    pub table: T,
    pub id_col: T,
    pub handle_col: T,
    pub context: &'static str,
    pub owned: &'static [JunctionKind],
    pub referenced: &'static [JunctionKind],
}

pub(crate) async fn remove_document_tx<C, T>(
    conn: &C,
    plan: &RemovePlan<T>,
    id: &str,
    handle: &str,
) -> AgoraResult<()>
where
    C: ConnectionTrait,
    T: Iden + Copy + 'static,
{
    delete_common_relations(conn, id, handle, plan.context).await?;
    for kind in plan.owned {
        junction::delete_by_owner(conn, *kind, id, Some(handle), None).await?;
    }
    for kind in plan.referenced {
        junction::delete_by_value_or_reporter(conn, *kind, Some(id), Some(handle)).await?;
    }
    delete_base_row(conn, plan.table, plan.id_col, plan.handle_col, id, handle).await
}

pub(crate) async fn remove_document<T>(
    store: &AgoraStore,
    plan: RemovePlan<T>,
    needle: &str,
) -> AgoraResult<bool>
where
    T: Iden + Copy + 'static,
{
    let Some((id, handle)) =
        fetch_identity(&store.conn, plan.table, plan.id_col, plan.handle_col, needle).await?
    else {
        return Ok(false);
    };
    let tx = store.begin().await?;
    remove_document_tx(&tx, &plan, &id, &handle).await?;
    tx.commit().await?;
    Ok(true)
}
