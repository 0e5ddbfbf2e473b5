//! Builds the aggregated relation projections attached to base-row reads:
//! scalar arrays (tags, media) and related-entity arrays, each produced by a
//! correlated sub-select so that `get` and `list` stay single round trips.
//! Every projection aggregates over a derived table ordered by the junction
//! insertion key, then coalesces the empty case to `'[]'`.

use sea_orm::DatabaseBackend;
use sea_orm::sea_query::{
    Alias, Condition, Expr, ExprTrait, Func, Iden, Order, Query, SelectStatement, SimpleExpr,
    SubQueryStatement,
};

use crate::db::{ColKind, Junction, JunctionKind};

/// How the configured dialect turns grouped rows into one JSON array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AggStrategy {
    Sqlite,
    Postgres,
    Mysql,
}

impl AggStrategy {
    pub(crate) fn from_backend(backend: DatabaseBackend) -> Self {
        match backend {
            DatabaseBackend::Postgres => AggStrategy::Postgres,
            DatabaseBackend::MySql => AggStrategy::Mysql,
            DatabaseBackend::Sqlite => AggStrategy::Sqlite,
            _ => AggStrategy::Sqlite,
        }
    }

    fn array_fn(self) -> &'static str {
        match self {
            AggStrategy::Sqlite => "json_group_array",
            AggStrategy::Postgres => "json_agg",
            AggStrategy::Mysql => "json_arrayagg",
        }
    }

    fn object_fn(self) -> &'static str {
        match self {
            AggStrategy::Sqlite => "json_object",
            AggStrategy::Postgres => "json_build_object",
            AggStrategy::Mysql => "json_object",
        }
    }

    /// Re-tags a TEXT column holding serialized JSON so it nests as JSON
    /// rather than as one escaped string.
    fn json_typed(self, col: SimpleExpr) -> SimpleExpr {
        match self {
            AggStrategy::Sqlite => Func::cust(Alias::new("json")).arg(col).into(),
            AggStrategy::Postgres | AggStrategy::Mysql => col.cast_as(Alias::new("json")),
        }
    }
}

/// Column allowlist of a related base table for nested projections. Keeps
/// `attributes` and other internal columns out of nested objects.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RelatedTable {
    pub table: &'static str,
    pub columns: &'static [(&'static str, ColKind)],
}

/// Rows of `junction` owned by the outer row: `entity_id` matches the outer
/// id or `entity_handle` matches the outer handle.
fn owner_match<T>(junction: &Alias, owner_table: T) -> Condition
where
    T: Iden + Copy + 'static,
{
    Condition::any()
        .add(
            Expr::col((junction.clone(), Junction::EntityId)).equals((owner_table, Alias::new("id"))),
        )
        .add(
            Expr::col((junction.clone(), Junction::EntityHandle))
                .equals((owner_table, Alias::new("handle"))),
        )
}

fn coalesce_empty_array(sub: SelectStatement) -> SimpleExpr {
    let scalar = SimpleExpr::SubQuery(None, Box::new(SubQueryStatement::SelectStatement(sub)));
    Func::coalesce([scalar, Expr::cust("'[]'").into()]).into()
}

/// JSON array of one junction kind's `value` strings for the outer row, in
/// insertion order. Must be embedded in a query selecting from `owner_table`.
pub(crate) fn scalar_array<T>(
    strategy: AggStrategy,
    kind: JunctionKind,
    owner_table: T,
    context: Option<&str>,
) -> SimpleExpr
where
    T: Iden + Copy + 'static,
{
    let junction = kind.table();
    let mut cond = Condition::all().add(owner_match(&junction, owner_table));
    if let Some(context) = context {
        cond = cond.add(Expr::col((junction.clone(), Junction::Context)).eq(context));
    }
    let inner = Query::select()
        .column((junction.clone(), Junction::Value))
        .from(junction.clone())
        .cond_where(cond)
        .order_by((junction, Junction::Id), Order::Asc)
        .to_owned();
    let agg = Alias::new("agg");
    let outer = Query::select()
        .expr(
            Func::cust(Alias::new(strategy.array_fn()))
                .arg(Expr::col((agg.clone(), Junction::Value))),
        )
        .from_subquery(inner, agg)
        .to_owned();
    coalesce_empty_array(outer)
}

/// JSON array of related-table objects for the outer row, joined through the
/// junction rows it owns and ordered by junction insertion key. The join
/// resolves the related row by id (`value`) or by handle (`reporter`), so
/// relations asserted by handle only still project.
pub(crate) fn object_array<T>(
    strategy: AggStrategy,
    kind: JunctionKind,
    owner_table: T,
    context: Option<&str>,
    related: &RelatedTable,
) -> SimpleExpr
where
    T: Iden + Copy + 'static,
{
    let junction = kind.table();
    let rel = Alias::new(related.table);
    let mut cond = Condition::all().add(owner_match(&junction, owner_table));
    if let Some(context) = context {
        cond = cond.add(Expr::col((junction.clone(), Junction::Context)).eq(context));
    }
    let mut inner = Query::select();
    for (name, _) in related.columns {
        inner.column((rel.clone(), Alias::new(*name)));
    }
    inner
        .from(junction.clone())
        .inner_join(
            rel.clone(),
            Expr::col((rel.clone(), Alias::new("id")))
                .equals((junction.clone(), Junction::Value))
                .or(Expr::col((rel.clone(), Alias::new("handle")))
                    .equals((junction.clone(), Junction::Reporter))),
        )
        .cond_where(cond)
        .order_by((junction, Junction::Id), Order::Asc);
    let agg = Alias::new("agg");
    let mut object = Func::cust(Alias::new(strategy.object_fn()));
    for (name, kind) in related.columns {
        let value: SimpleExpr = Expr::col((agg.clone(), Alias::new(*name))).into();
        let value = match kind {
            ColKind::Json => strategy.json_typed(value),
            _ => value,
        };
        object = object.arg(Expr::val(*name)).arg(value);
    }
    let outer = Query::select()
        .expr(Func::cust(Alias::new(strategy.array_fn())).arg(object))
        .from_subquery(inner, agg)
        .to_owned();
    coalesce_empty_array(outer)
}

#[cfg(test)]
mod tests {
    use sea_orm::sea_query::{PostgresQueryBuilder, SqliteQueryBuilder};

    use super::*;
    use crate::db::{Products, Storefronts};

    #[test]
    fn scalar_array_aggregates_in_insertion_order() {
        let expr = scalar_array(AggStrategy::Sqlite, JunctionKind::Tags, Products::Table, None);
        let sql = Query::select()
            .expr_as(expr, Alias::new("tags"))
            .from(Products::Table)
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains("json_group_array"));
        assert!(sql.contains("COALESCE"));
        assert!(sql.contains("'[]'"));
        assert!(sql.contains("entity_to_tags_projections"));
        assert!(sql.contains(r#""entity_id" = "products"."id""#));
        assert!(sql.contains(r#""entity_handle" = "products"."handle""#));
        assert!(sql.contains(r#"ORDER BY"#));
        assert!(sql.contains(r#"AS "tags""#));
    }

    #[test]
    fn postgres_uses_its_own_aggregate_functions() {
        let expr = scalar_array(
            AggStrategy::Postgres,
            JunctionKind::Media,
            Products::Table,
            None,
        );
        let sql = Query::select()
            .expr_as(expr, Alias::new("media"))
            .from(Products::Table)
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains("json_agg"));
        assert!(!sql.contains("json_group_array"));
    }

    #[test]
    fn object_array_joins_related_rows_by_id_or_handle() {
        let related = RelatedTable {
            table: "collections",
            columns: &[
                ("id", ColKind::Text),
                ("handle", ColKind::Text),
                ("title", ColKind::Text),
                ("active", ColKind::Bool),
            ],
        };
        let expr = object_array(
            AggStrategy::Sqlite,
            JunctionKind::ProductsToCollections,
            Products::Table,
            None,
            &related,
        );
        let sql = Query::select()
            .expr_as(expr, Alias::new("collections"))
            .from(Products::Table)
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains("json_object"));
        assert!(sql.contains(r#"'id', "agg"."id""#));
        assert!(sql.contains(r#""collections"."id" = "products_to_collections"."value""#));
        assert!(sql.contains(r#""collections"."handle" = "products_to_collections"."reporter""#));
        assert!(sql.contains(r#""products_to_collections"."entity_id" = "products"."id""#));
    }

    #[test]
    fn context_narrows_storefront_relations() {
        let related = RelatedTable {
            table: "posts",
            columns: &[("id", ColKind::Text), ("handle", ColKind::Text)],
        };
        let expr = object_array(
            AggStrategy::Sqlite,
            JunctionKind::StorefrontsToOther,
            Storefronts::Table,
            Some("posts"),
            &related,
        );
        let sql = Query::select()
            .expr_as(expr, Alias::new("posts"))
            .from(Storefronts::Table)
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#""storefronts_to_other"."context" = 'posts'"#));
    }

    #[test]
    fn json_columns_nest_untouched_by_escaping() {
        let related = RelatedTable {
            table: "products",
            columns: &[("id", ColKind::Text), ("variant_hint", ColKind::Json)],
        };
        let expr = object_array(
            AggStrategy::Sqlite,
            JunctionKind::ProductsToVariants,
            Products::Table,
            None,
            &related,
        );
        let sql = Query::select()
            .expr_as(expr, Alias::new("variants"))
            .from(Products::Table)
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#"json("agg"."variant_hint")"#));
    }
}
