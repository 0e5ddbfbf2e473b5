//! Discounts: upserting one recomputes its product linkage set-wide. The
//! product-side filter DSL compiles to a WHERE clause over `products`, and a
//! single INSERT..SELECT rebuilds `products_to_discounts` from it, so the
//! linkage never goes through Rust row by row.

use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use sea_orm::sea_query::{Condition, Expr, ExprTrait, InsertStatement, Query, SelectStatement};
use serde_json::json;

use agora_core::{
    AgoraError, AgoraResult, ApiQuery, Discount, DiscountApplication, DiscountFilter, DiscountsApi,
    Document, EntityRef, Expand, Product,
};

use crate::db::{Discounts, Junction, JunctionKind, Products};
use crate::junction;
use crate::projection::AggStrategy;
use crate::resources::products::product_select;
use crate::resources::{
    self, DISCOUNT_COLUMNS, DocumentWrite, PRODUCT_COLUMNS, RemovePlan, base_search_terms,
    base_select, count_members, count_rows, doc_from_row, doc_map, get_doc, list_docs, member_of,
    push_scalar,
};
use crate::store::{AgoraStore, exec, query_all};

const CONTEXT: &str = "discounts";

fn discount_select(strategy: AggStrategy) -> (SelectStatement, Vec<&'static str>) {
    let mut select = base_select(Discounts::Table, DISCOUNT_COLUMNS);
    let mut nested = Vec::new();
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Tags,
        Discounts::Table,
        CONTEXT,
        "tags",
    );
    push_scalar(
        &mut select,
        &mut nested,
        strategy,
        JunctionKind::Media,
        Discounts::Table,
        CONTEXT,
        "media",
    );
    (select, nested)
}

fn discount_search_terms(item: &Discount, extra: &[String]) -> Vec<String> {
    let mut terms = base_search_terms(&item.id, &item.handle);
    terms.push_words(&item.title);
    for tag in &item.tags {
        terms.push_tag(tag);
    }
    terms.extend_raw(extra);
    terms.into_vec()
}

/// All active discounts, decoded. Product upserts evaluate these in Rust to
/// decide eligibility for the incoming document.
pub(crate) async fn active_discounts<C>(conn: &C) -> AgoraResult<Vec<Discount>>
where
    C: ConnectionTrait,
{
    let mut select = base_select(Discounts::Table, DISCOUNT_COLUMNS);
    select.cond_where(Expr::col((Discounts::Table, Discounts::Active)).eq(true));
    let rows = query_all(conn, &select).await?;
    let mut discounts = Vec::with_capacity(rows.len());
    for row in &rows {
        discounts.push(doc_from_row(row, DISCOUNT_COLUMNS, &[])?);
    }
    Ok(discounts)
}

fn ref_ids(refs: &[EntityRef]) -> Vec<&str> {
    refs.iter()
        .map(|entity| entity.id.as_str())
        .filter(|id| !id.is_empty())
        .collect()
}

fn ref_handles(refs: &[EntityRef]) -> Vec<&str> {
    refs.iter()
        .map(|entity| entity.handle.as_str())
        .filter(|handle| !handle.is_empty())
        .collect()
}

/// Junction owners whose rows point at any of the given entities.
fn owners_referencing(kind: JunctionKind, refs: &[EntityRef]) -> SelectStatement {
    Query::select()
        .column(Junction::EntityId)
        .from(kind.table())
        .cond_where(
            Condition::any()
                .add(Expr::col(Junction::Value).is_in(ref_ids(refs)))
                .add(Expr::col(Junction::Reporter).is_in(ref_handles(refs))),
        )
        .to_owned()
}

fn owners_with_tags(tags: &[String]) -> SelectStatement {
    Query::select()
        .column(Junction::EntityId)
        .from(JunctionKind::Tags.table())
        .cond_where(
            Condition::all()
                .add(Expr::col(Junction::Context).eq("products"))
                .add(Expr::col(Junction::Value).is_in(tags.iter().map(String::as_str))),
        )
        .to_owned()
}

/// One filter as a condition over `products`. Order-side filters have no
/// product translation and yield `None`.
fn filter_condition(filter: &DiscountFilter) -> Option<Condition> {
    let product_id = Expr::col((Products::Table, Products::Id));
    let cond = match filter {
        DiscountFilter::ProductAll => Condition::all().add(Expr::val(1).eq(1)),
        DiscountFilter::ProductInCollections(refs) => Condition::all().add(
            product_id.in_subquery(owners_referencing(JunctionKind::ProductsToCollections, refs)),
        ),
        DiscountFilter::ProductNotInCollections(refs) => Condition::all().add(
            product_id
                .not_in_subquery(owners_referencing(JunctionKind::ProductsToCollections, refs)),
        ),
        DiscountFilter::ProductInTags(tags) => {
            Condition::all().add(product_id.in_subquery(owners_with_tags(tags)))
        }
        DiscountFilter::ProductNotInTags(tags) => {
            Condition::all().add(product_id.not_in_subquery(owners_with_tags(tags)))
        }
        DiscountFilter::ProductInProducts(refs) => Condition::any()
            .add(product_id.is_in(ref_ids(refs)))
            .add(Expr::col((Products::Table, Products::Handle)).is_in(ref_handles(refs))),
        DiscountFilter::ProductNotInProducts(refs) => Condition::all()
            .add(product_id.is_not_in(ref_ids(refs)))
            .add(Expr::col((Products::Table, Products::Handle)).is_not_in(ref_handles(refs))),
        DiscountFilter::ProductInPriceRange { from, to } => {
            let mut range = Condition::all();
            if let Some(from) = from {
                range = range.add(Expr::col((Products::Table, Products::Price)).gte(*from));
            }
            if let Some(to) = to {
                range = range.add(Expr::col((Products::Table, Products::Price)).lte(*to));
            }
            if range.is_empty() {
                range.add(Expr::val(1).eq(1))
            } else {
                range
            }
        }
        _ => return None,
    };
    Some(cond)
}

/// AND of every product-side filter. `None` when the discount carries no
/// product filters at all; such a discount matches no product.
fn product_filters_condition(discount: &Discount) -> Option<Condition> {
    let mut cond = Condition::all();
    let mut any = false;
    for filter in &discount.info.filters {
        if let Some(filter_cond) = filter_condition(filter) {
            cond = cond.add(filter_cond);
            any = true;
        }
    }
    any.then_some(cond)
}

/// INSERT..SELECT repopulating the discount's junction rows from the current
/// products table.
fn rebuild_products_insert(discount: &Discount, cond: Condition) -> AgoraResult<InsertStatement> {
    let mut source = Query::select();
    source
        .column((Products::Table, Products::Id))
        .column((Products::Table, Products::Handle))
        .expr(Expr::val(discount.id.as_str()))
        .expr(Expr::val(discount.handle.as_str()))
        .from(Products::Table)
        .cond_where(cond);
    let mut insert = Query::insert();
    insert
        .into_table(JunctionKind::ProductsToDiscounts.table())
        .columns([
            Junction::EntityId,
            Junction::EntityHandle,
            Junction::Value,
            Junction::Reporter,
        ]);
    insert
        .select_from(source)
        .map_err(|err| AgoraError::storage(format!("discount rebuild: {err}")))?;
    Ok(insert)
}

#[async_trait]
impl DiscountsApi for AgoraStore {
    async fn get_discount(
        &self,
        id_or_handle: &str,
        _expand: Expand,
    ) -> AgoraResult<Option<Discount>> {
        let (select, nested) = discount_select(AggStrategy::from_backend(self.backend));
        get_doc(
            &self.conn,
            select,
            Discounts::Id,
            Discounts::Handle,
            id_or_handle,
            DISCOUNT_COLUMNS,
            &nested,
        )
        .await
    }

    async fn list_discounts(&self, query: ApiQuery) -> AgoraResult<Vec<Discount>> {
        let (select, nested) = discount_select(AggStrategy::from_backend(self.backend));
        list_docs(
            &self.conn,
            select,
            Discounts::Table,
            DISCOUNT_COLUMNS,
            &nested,
            &query,
        )
        .await
    }

    async fn upsert_discount(&self, mut item: Discount, search_terms: Vec<String>) -> AgoraResult<()> {
        item.ensure_identity();
        item.apply_dates();
        let mut doc = doc_map(&item)?;
        // The column stores the numeric application code, not the JSON name.
        doc.insert("application".into(), json!(item.application.as_i16()));
        let search = discount_search_terms(&item, &search_terms);
        let tx = self.begin().await?;
        resources::write_document_tx(
            &tx,
            &DocumentWrite {
                table: Discounts::Table,
                id_col: Discounts::Id,
                handle_col: Discounts::Handle,
                columns: DISCOUNT_COLUMNS,
                context: CONTEXT,
                tags: &item.tags,
                media: &item.media,
                search: &search,
            },
            &doc,
        )
        .await?;
        junction::delete_by_value_or_reporter(
            &tx,
            JunctionKind::ProductsToDiscounts,
            Some(&item.id),
            Some(&item.handle),
        )
        .await?;
        if item.active && item.application == DiscountApplication::Auto {
            if let Some(cond) = product_filters_condition(&item) {
                exec(&tx, &rebuild_products_insert(&item, cond)?).await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn remove_discount(&self, id_or_handle: &str) -> AgoraResult<bool> {
        resources::remove_document(
            self,
            RemovePlan {
                table: Discounts::Table,
                id_col: Discounts::Id,
                handle_col: Discounts::Handle,
                context: CONTEXT,
                owned: &[],
                referenced: &[
                    JunctionKind::ProductsToDiscounts,
                    JunctionKind::StorefrontsToOther,
                ],
            },
            id_or_handle,
        )
        .await
    }

    async fn count_discounts(&self, query: ApiQuery) -> AgoraResult<u64> {
        count_rows(
            &self.conn,
            Discounts::Table,
            Discounts::Id,
            DISCOUNT_COLUMNS,
            &query,
        )
        .await
    }

    async fn list_discount_products(
        &self,
        id_or_handle: &str,
        query: ApiQuery,
    ) -> AgoraResult<Vec<Product>> {
        let expand = Expand::Only(query.expand.clone());
        let (mut select, nested) =
            product_select(AggStrategy::from_backend(self.backend), &expand);
        select.cond_where(member_of(
            Products::Table,
            Products::Id,
            JunctionKind::ProductsToDiscounts,
            id_or_handle,
        ));
        list_docs(
            &self.conn,
            select,
            Products::Table,
            PRODUCT_COLUMNS,
            &nested,
            &query,
        )
        .await
    }

    async fn count_discount_products(&self, id_or_handle: &str) -> AgoraResult<u64> {
        count_members(
            &self.conn,
            Products::Table,
            Products::Id,
            JunctionKind::ProductsToDiscounts,
            id_or_handle,
        )
        .await
    }
}
