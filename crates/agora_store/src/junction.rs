//! Generic maintenance of entity-to-value association rows: tags, search
//! tokens, media, and cross-entity relations all share one row shape, one
//! table per [`JunctionKind`]. Owners rewrite their rows wholesale on every
//! upsert; there is no incremental diffing. Every operation runs on the
//! caller's connection, so inside a transaction when one is open, and lets
//! SQL errors abort that transaction.

use sea_orm::ConnectionTrait;
use sea_orm::sea_query::{Condition, Expr, ExprTrait, Order, Query, SelectStatement};

use agora_core::AgoraResult;

use crate::db::{Junction, JunctionKind};
use crate::store::{exec, opt_text};

/// One id-bearing relation row: the related entity's id plus the handle that
/// asserted it, so the relation can be resolved (and deleted) from either
/// direction.
#[derive(Clone, Debug)]
pub struct RelationPair {
    pub value: String,
    pub reporter: Option<String>,
}

impl RelationPair {
    pub fn new(value: impl Into<String>, reporter: impl Into<String>) -> Self {
        let reporter = reporter.into();
        Self {
            value: value.into(),
            reporter: if reporter.is_empty() {
                None
            } else {
                Some(reporter)
            },
        }
    }
}

pub(crate) struct ArrayWrite<'a> {
    pub kind: JunctionKind,
    pub values: &'a [String],
    pub owner_id: &'a str,
    pub owner_handle: &'a str,
    pub delete_previous: bool,
    pub reporter: Option<&'a str>,
    pub context: Option<&'a str>,
}

/// Delete-then-insert of plain string values (tags, tokens, media URLs). An
/// empty `values` with `delete_previous` is the "clear" form and performs no
/// insert. When `reporter` is set the delete targets rows asserted by that
/// reporter instead of rows owned by id/handle.
pub(crate) async fn insert_array_values<C>(conn: &C, write: ArrayWrite<'_>) -> AgoraResult<()>
where
    C: ConnectionTrait,
{
    if write.delete_previous {
        match write.reporter {
            Some(reporter) => {
                delete_by_value_or_reporter(conn, write.kind, None, Some(reporter)).await?;
            }
            None => {
                delete_by_owner(
                    conn,
                    write.kind,
                    write.owner_id,
                    Some(write.owner_handle),
                    write.context,
                )
                .await?;
            }
        }
    }
    if write.values.is_empty() {
        return Ok(());
    }
    let mut insert = Query::insert()
        .into_table(write.kind.table())
        .columns([
            Junction::EntityId,
            Junction::EntityHandle,
            Junction::Value,
            Junction::Reporter,
            Junction::Context,
        ])
        .to_owned();
    for value in write.values {
        insert.values_panic([
            Expr::val(write.owner_id),
            Expr::val(write.owner_handle),
            Expr::val(value.as_str()),
            Expr::val(opt_text(write.reporter)),
            Expr::val(opt_text(write.context)),
        ]);
    }
    exec(conn, &insert).await
}

pub(crate) struct RelationWrite<'a> {
    pub kind: JunctionKind,
    pub pairs: &'a [RelationPair],
    pub owner_id: &'a str,
    pub owner_handle: &'a str,
    pub context: Option<&'a str>,
}

/// Insert id-bearing relation rows without an implicit delete; callers clear
/// stale rows first (usually via [`delete_by_owner`]).
pub(crate) async fn insert_relation_values<C>(conn: &C, write: RelationWrite<'_>) -> AgoraResult<()>
where
    C: ConnectionTrait,
{
    if write.pairs.is_empty() {
        return Ok(());
    }
    let mut insert = Query::insert()
        .into_table(write.kind.table())
        .columns([
            Junction::EntityId,
            Junction::EntityHandle,
            Junction::Value,
            Junction::Reporter,
            Junction::Context,
        ])
        .to_owned();
    for pair in write.pairs {
        insert.values_panic([
            Expr::val(write.owner_id),
            Expr::val(write.owner_handle),
            Expr::val(pair.value.as_str()),
            Expr::val(opt_text(pair.reporter.as_deref())),
            Expr::val(opt_text(write.context)),
        ]);
    }
    exec(conn, &insert).await
}

/// Delete all rows owned by an entity: `entity_id = ? OR entity_handle = ?`,
/// optionally narrowed to one context.
pub(crate) async fn delete_by_owner<C>(
    conn: &C,
    kind: JunctionKind,
    owner_id: &str,
    owner_handle: Option<&str>,
    context: Option<&str>,
) -> AgoraResult<()>
where
    C: ConnectionTrait,
{
    let mut owner = Condition::any();
    if !owner_id.is_empty() {
        owner = owner.add(Expr::col(Junction::EntityId).eq(owner_id));
    }
    if let Some(handle) = owner_handle {
        if !handle.is_empty() {
            owner = owner.add(Expr::col(Junction::EntityHandle).eq(handle));
        }
    }
    if owner.is_empty() {
        return Ok(());
    }
    let mut cond = Condition::all().add(owner);
    if let Some(context) = context {
        cond = cond.add(Expr::col(Junction::Context).eq(context));
    }
    let delete = Query::delete()
        .from_table(kind.table())
        .cond_where(cond)
        .to_owned();
    exec(conn, &delete).await
}

/// Scrub an entity out of rows held by *other* owners: rows whose `value` is
/// the entity's id or whose `reporter` is its handle. Both arguments absent
/// is a no-op rather than an unbounded delete.
pub(crate) async fn delete_by_value_or_reporter<C>(
    conn: &C,
    kind: JunctionKind,
    value: Option<&str>,
    reporter: Option<&str>,
) -> AgoraResult<()>
where
    C: ConnectionTrait,
{
    let mut cond = Condition::any();
    if let Some(value) = value {
        if !value.is_empty() {
            cond = cond.add(Expr::col(Junction::Value).eq(value));
        }
    }
    if let Some(reporter) = reporter {
        if !reporter.is_empty() {
            cond = cond.add(Expr::col(Junction::Reporter).eq(reporter));
        }
    }
    if cond.is_empty() {
        return Ok(());
    }
    let delete = Query::delete()
        .from_table(kind.table())
        .cond_where(cond)
        .to_owned();
    exec(conn, &delete).await
}

/// Delete the rows linking one owner to one target entity, leaving the rest
/// of the owner's rows alone. Used by the targeted attach/detach operations.
pub(crate) async fn delete_pair<C>(
    conn: &C,
    kind: JunctionKind,
    owner_id: &str,
    owner_handle: &str,
    value: &str,
    reporter: &str,
) -> AgoraResult<()>
where
    C: ConnectionTrait,
{
    let mut owner = Condition::any();
    if !owner_id.is_empty() {
        owner = owner.add(Expr::col(Junction::EntityId).eq(owner_id));
    }
    if !owner_handle.is_empty() {
        owner = owner.add(Expr::col(Junction::EntityHandle).eq(owner_handle));
    }
    let mut target = Condition::any();
    if !value.is_empty() {
        target = target.add(Expr::col(Junction::Value).eq(value));
    }
    if !reporter.is_empty() {
        target = target.add(Expr::col(Junction::Reporter).eq(reporter));
    }
    if owner.is_empty() || target.is_empty() {
        return Ok(());
    }
    let delete = Query::delete()
        .from_table(kind.table())
        .cond_where(Condition::all().add(owner).add(target))
        .to_owned();
    exec(conn, &delete).await
}

/// Sub-select of `value` for one owner in insertion order, for embedding in
/// an outer query or an `IN (...)`.
pub(crate) fn select_values(
    kind: JunctionKind,
    owner_id_or_handle: &str,
    context: Option<&str>,
) -> SelectStatement {
    let mut cond = Condition::all().add(
        Condition::any()
            .add(Expr::col(Junction::EntityId).eq(owner_id_or_handle))
            .add(Expr::col(Junction::EntityHandle).eq(owner_id_or_handle)),
    );
    if let Some(context) = context {
        cond = cond.add(Expr::col(Junction::Context).eq(context));
    }
    Query::select()
        .column(Junction::Value)
        .from(kind.table())
        .cond_where(cond)
        .order_by(Junction::Id, Order::Asc)
        .to_owned()
}

/// Same shape as [`select_values`] but over the `reporter` column, for
/// relations recorded by handle only.
pub(crate) fn select_reporters(
    kind: JunctionKind,
    owner_id_or_handle: &str,
    context: Option<&str>,
) -> SelectStatement {
    let mut cond = Condition::all().add(
        Condition::any()
            .add(Expr::col(Junction::EntityId).eq(owner_id_or_handle))
            .add(Expr::col(Junction::EntityHandle).eq(owner_id_or_handle)),
    );
    if let Some(context) = context {
        cond = cond.add(Expr::col(Junction::Context).eq(context));
    }
    Query::select()
        .column(Junction::Reporter)
        .from(kind.table())
        .cond_where(cond)
        .order_by(Junction::Id, Order::Asc)
        .to_owned()
}

/// Inverse lookup: owners whose rows reference the given value (or were
/// asserted by the given reporter). Answers "which products sit in this
/// collection".
pub(crate) fn select_owner_ids_by_value_or_reporter(
    kind: JunctionKind,
    value: &str,
    reporter: Option<&str>,
) -> SelectStatement {
    let mut cond = Condition::any().add(Expr::col(Junction::Value).eq(value));
    if let Some(reporter) = reporter {
        if !reporter.is_empty() {
            cond = cond.add(Expr::col(Junction::Reporter).eq(reporter));
        }
    }
    Query::select()
        .column(Junction::EntityId)
        .from(kind.table())
        .cond_where(cond)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use sea_orm::sea_query::SqliteQueryBuilder;

    use super::*;

    #[test]
    fn select_values_orders_by_insertion_key() {
        let sql =
            select_values(JunctionKind::Tags, "prod_1", None).to_string(SqliteQueryBuilder);
        assert!(sql.contains("entity_to_tags_projections"));
        assert!(sql.contains(r#""entity_id" = 'prod_1'"#));
        assert!(sql.contains(r#""entity_handle" = 'prod_1'"#));
        assert!(sql.contains(r#"ORDER BY "id" ASC"#));
    }

    #[test]
    fn select_values_narrows_by_context() {
        let sql = select_values(JunctionKind::StorefrontsToOther, "sf_1", Some("posts"))
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#""context" = 'posts'"#));
    }

    #[test]
    fn owner_lookup_matches_value_or_reporter() {
        let sql = select_owner_ids_by_value_or_reporter(
            JunctionKind::ProductsToCollections,
            "col_9",
            Some("shoes"),
        )
        .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#""value" = 'col_9'"#));
        assert!(sql.contains(r#""reporter" = 'shoes'"#));
        assert!(sql.contains("OR"));
    }

    #[test]
    fn reporter_lookup_mirrors_value_lookup() {
        let sql = select_reporters(JunctionKind::StorefrontsToOther, "sf_1", Some("posts"))
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#"SELECT "reporter""#));
        assert!(sql.contains(r#""context" = 'posts'"#));
        assert!(sql.contains(r#"ORDER BY "id" ASC"#));
    }

    #[test]
    fn relation_pair_drops_empty_reporter() {
        let pair = RelationPair::new("col_1", "");
        assert!(pair.reporter.is_none());
        let pair = RelationPair::new("col_1", "shoes");
        assert_eq!(pair.reporter.as_deref(), Some("shoes"));
    }
}
